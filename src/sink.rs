use std::{
    collections::VecDeque,
    io::{
        self,
        BufWriter,
        Cursor,
        Write,
    },
};

/// Default capacity used when wrapping an external destination in a
/// [`BufWriter`]. Matches the default of [`BufWriter::new`].
pub const DEFAULT_BUFFER_SIZE: usize = 8 * 1024;

/// Destination a [`PrefixWriter`](crate::PrefixWriter) writes into.
///
/// A sink accepts bytes and pushes them towards the final destination on
/// [`Sink::flush`]. Implementations differ only in how much they batch.
pub trait Sink {
    /// Write some bytes, returning how many were accepted.
    ///
    /// # Errors
    ///
    /// Returns the error of the underlying destination unchanged.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Force batched bytes out to the destination.
    ///
    /// # Errors
    ///
    /// Returns the error of the underlying destination unchanged.
    fn flush(&mut self) -> io::Result<()>;
}

impl<W: Write> Sink for BufWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Write::write(self, buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Write::flush(self)
    }
}

/// Marker for writers that already accumulate in memory, so an extra
/// buffering layer in front of them would only add copies.
pub trait InMemory: Write {}

impl InMemory for Vec<u8> {}
impl InMemory for &mut Vec<u8> {}
impl InMemory for VecDeque<u8> {}
impl InMemory for &mut VecDeque<u8> {}
impl InMemory for Cursor<Vec<u8>> {}
impl InMemory for Cursor<&mut Vec<u8>> {}
impl InMemory for Cursor<&mut [u8]> {}
impl InMemory for io::Sink {}

/// Sink that hands writes straight to an in-memory writer. Flushing is a
/// no-op.
#[derive(Debug, Default)]
pub struct Unbuffered<W> {
    inner: W,
}

impl<W: InMemory> Unbuffered<W> {
    /// Wrap an in-memory writer.
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Borrow the wrapped writer.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Mutably borrow the wrapped writer.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Unwrap the writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: InMemory> Sink for Unbuffered<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub(crate) fn capacity_or_default(capacity: usize) -> usize {
    if capacity == 0 {
        DEFAULT_BUFFER_SIZE
    } else {
        capacity
    }
}

/// Make sure `writer` buffers at least `capacity` bytes. A writer that
/// already does is returned as is, a smaller one is flushed and its inner
/// writer re-wrapped so buffering layers never stack.
pub(crate) fn rebuffer<W: Write>(
    writer: BufWriter<W>,
    capacity: usize,
) -> Result<BufWriter<W>, io::IntoInnerError<BufWriter<W>>> {
    let capacity = capacity_or_default(capacity);

    if writer.capacity() >= capacity {
        tracing::trace!(
            current = writer.capacity(),
            requested = capacity,
            "reusing buffered writer"
        );
        return Ok(writer);
    }

    tracing::trace!(
        current = writer.capacity(),
        requested = capacity,
        "growing buffered writer"
    );
    let inner = writer.into_inner()?;

    Ok(BufWriter::with_capacity(capacity, inner))
}
