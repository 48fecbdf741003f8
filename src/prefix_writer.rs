use std::{
    fmt::{
        self,
        Debug,
        Formatter,
    },
    io::{
        self,
        BufWriter,
        IntoInnerError,
        Write,
    },
};

use tracing::{
    debug,
    trace,
};

use crate::{
    error::WriteError,
    sink::{
        self,
        InMemory,
        Sink,
        Unbuffered,
        DEFAULT_BUFFER_SIZE,
    },
};

const NEWLINE: u8 = b'\n';

/// Writes every line with a given prefix in front of it, including empty
/// lines. Lines may span multiple writes and a single write may contain
/// multiple lines, the output is the same either way.
///
/// A write that ends in the middle of a line is written out right away, the
/// prefix for the line after it is only emitted once that line gets its
/// first byte. After every successful write the sink is flushed.
pub struct PrefixWriter<S: Sink> {
    prefix: Box<[u8]>,
    sink: S,

    head: bool,
    prefix_offset: usize,
    written: u64,

    pending: Option<io::Error>,
}

impl<S: Sink> Debug for PrefixWriter<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrefixWriter")
            .field("prefix", &String::from_utf8_lossy(&self.prefix))
            .field("head", &self.head)
            .field("written", &self.written)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

impl<W: Write> PrefixWriter<BufWriter<W>> {
    /// Create a new [`PrefixWriter`] that buffers writes to `writer` with a
    /// buffer of [`DEFAULT_BUFFER_SIZE`] bytes.
    pub fn new(writer: W, prefix: impl AsRef<[u8]>) -> Self {
        Self::with_capacity(writer, prefix, DEFAULT_BUFFER_SIZE)
    }

    /// Create a new [`PrefixWriter`] that buffers writes to `writer` with a
    /// buffer of at least `capacity` bytes. A `capacity` of `0` selects
    /// [`DEFAULT_BUFFER_SIZE`].
    pub fn with_capacity(writer: W, prefix: impl AsRef<[u8]>, capacity: usize) -> Self {
        let capacity = sink::capacity_or_default(capacity);

        Self::with_sink(BufWriter::with_capacity(capacity, writer), prefix)
    }

    /// Create a new [`PrefixWriter`] on top of an existing [`BufWriter`].
    ///
    /// The writer is used as is when it already buffers at least `capacity`
    /// bytes (`0` meaning [`DEFAULT_BUFFER_SIZE`]). Otherwise it is flushed
    /// and its inner writer is wrapped again with the larger buffer.
    ///
    /// # Errors
    ///
    /// Returns the [`BufWriter`] back if flushing it before re-wrapping fails.
    pub fn from_buf_writer(
        writer: BufWriter<W>,
        prefix: impl AsRef<[u8]>,
        capacity: usize,
    ) -> Result<Self, IntoInnerError<BufWriter<W>>> {
        let writer = sink::rebuffer(writer, capacity)?;

        Ok(Self::with_sink(writer, prefix))
    }
}

impl<W: InMemory> PrefixWriter<Unbuffered<W>> {
    /// Create a new [`PrefixWriter`] that writes straight into an in-memory
    /// writer like a `Vec<u8>`, without an extra buffer in between.
    pub fn in_memory(writer: W, prefix: impl AsRef<[u8]>) -> Self {
        Self::with_sink(Unbuffered::new(writer), prefix)
    }
}

impl<S: Sink> PrefixWriter<S> {
    /// Create a new [`PrefixWriter`] on top of any [`Sink`]. The prefix is
    /// copied, later changes to the caller's buffer have no effect.
    pub fn with_sink(sink: S, prefix: impl AsRef<[u8]>) -> Self {
        Self {
            prefix: prefix.as_ref().into(),
            sink,

            head: true,
            prefix_offset: 0,
            written: 0,

            pending: None,
        }
    }

    /// Total number of bytes the sink accepted, prefixes included.
    #[must_use]
    pub fn written(&self) -> u64 {
        self.written
    }

    /// The prefix written in front of every line.
    #[must_use]
    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    /// Whether the next byte written starts a new line and so gets the
    /// prefix in front of it.
    #[must_use]
    pub fn is_at_line_start(&self) -> bool {
        self.head
    }

    /// Borrow the sink.
    pub fn get_ref(&self) -> &S {
        &self.sink
    }

    /// Mutably borrow the sink. Writing to it directly bypasses the line
    /// tracking and the byte count.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Unwrap the sink. Everything written so far has already been flushed
    /// unless the last write failed.
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Write `buf` with the prefix in front of every line it starts and flush
    /// the sink afterwards.
    ///
    /// Returns the number of bytes from `buf` that were written, which never
    /// includes prefix bytes. An empty `buf` is a no-op.
    ///
    /// # Errors
    ///
    /// Fails with the sink's error and the number of bytes of `buf` that were
    /// accepted before it happened. Writing `&buf[err.consumed..]` again later
    /// continues the output exactly where it stopped.
    pub fn write_lines(&mut self, buf: &[u8]) -> Result<usize, WriteError> {
        if buf.is_empty() {
            return Ok(0);
        }

        let mut consumed = 0;
        let mut rest = buf;

        while !rest.is_empty() {
            if self.head {
                self.write_prefix()
                    .map_err(|source| self.failed(consumed, source))?;
            }

            let (line, terminated) = match rest.iter().position(|byte| *byte == NEWLINE) {
                Some(index) => (&rest[..=index], true),
                None => (rest, false),
            };

            let result = write_counted(&mut self.sink, line, &mut consumed, &mut self.written);
            if let Err(source) = result {
                return Err(self.failed(consumed, source));
            }

            self.head = terminated;
            rest = &rest[line.len()..];
        }

        trace!(consumed, written = self.written, "flushing sink");
        self.sink
            .flush()
            .map_err(|source| self.failed(consumed, source))?;

        Ok(consumed)
    }

    /// Emit what is left of the prefix for the current line. A prefix the
    /// sink only partially accepted continues where it stopped on the next
    /// attempt.
    fn write_prefix(&mut self) -> io::Result<()> {
        let mut accepted = 0;
        let result = write_counted(
            &mut self.sink,
            &self.prefix[self.prefix_offset..],
            &mut accepted,
            &mut self.written,
        );
        self.prefix_offset += accepted;
        result?;

        self.prefix_offset = 0;
        self.head = false;

        Ok(())
    }

    fn failed(&self, consumed: usize, source: io::Error) -> WriteError {
        debug!(
            consumed,
            written = self.written,
            error = %source,
            "sink failed while writing prefixed lines"
        );

        WriteError { consumed, source }
    }
}

/// Write all of `bytes` to `sink`, adding every byte it accepts to `accepted`
/// and `written` as soon as it lands.
fn write_counted<S: Sink>(
    sink: &mut S,
    mut bytes: &[u8],
    accepted: &mut usize,
    written: &mut u64,
) -> io::Result<()> {
    while !bytes.is_empty() {
        match sink.write(bytes) {
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "sink did not accept any bytes",
                ))
            }
            Ok(n) => {
                *accepted += n;
                *written += n as u64;
                bytes = &bytes[n..];
            }
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => return Err(err),
        }
    }

    Ok(())
}

impl<S: Sink> Write for PrefixWriter<S> {
    /// Writes like [`PrefixWriter::write_lines`]. When the sink fails after
    /// part of `buf` was written this reports a short write and keeps the
    /// error, the next call to `write` or `flush` returns it without touching
    /// the sink.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        if let Some(err) = self.pending.take() {
            return Err(err);
        }

        match self.write_lines(buf) {
            Ok(consumed) => Ok(consumed),
            Err(err) if err.consumed == 0 => Err(err.into_source()),
            Err(err) => {
                let consumed = err.consumed;
                self.pending = Some(err.into_source());

                Ok(consumed)
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(err) = self.pending.take() {
            return Err(err);
        }

        self.sink.flush()
    }
}
