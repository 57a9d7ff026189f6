//! Duplex byte streams carrying the protocol.

use std::io::{Read, Write};

/// Boxed reader used once the concrete stream types have been erased.
pub type BoxedReader = Box<dyn Read + Send>;

/// Boxed writer used once the concrete stream types have been erased.
pub type BoxedWriter = Box<dyn Write + Send>;

/// Read and write halves of a transport.
///
/// In production these are the process's stdin and stdout; tests use in-memory
/// buffers or channels. Framing is left to the message loop.
#[derive(Debug)]
pub struct StreamPair<R, W> {
    reader: R,
    writer: W,
}

impl<R, W> StreamPair<R, W> {
    /// Pairs a reader with a writer.
    #[must_use]
    pub const fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Splits the pair into its halves.
    #[must_use]
    pub fn into_parts(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

impl<R, W> StreamPair<R, W>
where
    R: Read + Send + 'static,
    W: Write + Send + 'static,
{
    /// Erases the concrete stream types.
    #[must_use]
    pub fn boxed(self) -> StreamPair<BoxedReader, BoxedWriter> {
        StreamPair {
            reader: Box::new(self.reader),
            writer: Box::new(self.writer),
        }
    }
}
