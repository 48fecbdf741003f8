#![deny(missing_docs)]
#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![warn(clippy::unwrap_used)]
#![warn(rust_2018_idioms, unused_lifetimes, missing_debug_implementations)]

//! Crate for a writer that prefixes every line written through it, including
//! empty lines and lines that are split over multiple writes.
//!
//! ```
//! use prefix_writer::PrefixWriter;
//! use std::io::Write;
//!
//! let mut buffer = Vec::new();
//! let mut writer = PrefixWriter::in_memory(&mut buffer, "001> ");
//!
//! writeln!(writer, "hello")?;
//! write!(writer, "\nwor")?;
//! writeln!(writer, "ld")?;
//!
//! assert_eq!(b"001> hello\n001> \n001> world\n", buffer.as_slice());
//! # Ok::<(), std::io::Error>(())
//! ```
//!
//! Writers to files, sockets or other external destinations are wrapped in a
//! [`std::io::BufWriter`] by [`PrefixWriter::new`] and flushed at the end of
//! every write. In-memory writers like `Vec<u8>` are written to directly via
//! [`PrefixWriter::in_memory`].

mod error;
mod prefix_writer;
mod sink;

pub use crate::{
    error::WriteError,
    prefix_writer::PrefixWriter,
    sink::{
        InMemory,
        Sink,
        Unbuffered,
        DEFAULT_BUFFER_SIZE,
    },
};
