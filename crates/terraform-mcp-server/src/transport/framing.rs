//! Newline-delimited framing for the input stream.

use std::io::{BufRead, BufReader, ErrorKind, Read};

use super::TransportError;

/// Largest accepted message, excluding its line terminator.
pub(crate) const MAX_MESSAGE_BYTES: usize = 4 * 1024 * 1024;

/// One unit read from the input stream.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Frame {
    /// A complete message without its line terminator.
    Message(Vec<u8>),
    /// A line longer than the limit. Its bytes were discarded up to and
    /// including the next newline.
    Oversized {
        /// Bytes discarded, excluding the newline.
        size: usize,
        /// Configured limit.
        max: usize,
    },
}

/// Splits an input stream into newline-delimited frames.
///
/// Blank lines are skipped, `\r\n` terminators are accepted, and an
/// unterminated line at end-of-stream is returned as the final frame. Lines
/// over the limit are skipped rather than buffered so the stream stays in
/// sync at the next newline.
pub(crate) struct FrameReader<R> {
    reader: BufReader<R>,
    limit: usize,
}

impl<R: Read> FrameReader<R> {
    pub(crate) fn new(reader: R) -> Self {
        Self::with_limit(reader, MAX_MESSAGE_BYTES)
    }

    pub(crate) fn with_limit(reader: R, limit: usize) -> Self {
        Self {
            reader: BufReader::new(reader),
            limit,
        }
    }

    /// Returns the next non-blank frame, or `None` at end-of-stream.
    pub(crate) fn next_frame(&mut self) -> Result<Option<Frame>, TransportError> {
        loop {
            let mut line = Vec::new();
            // Headroom for a `\r\n` terminator after a frame that is exactly
            // at the limit; anything longer is discarded below.
            let ceiling = u64::try_from(self.limit.saturating_add(2)).unwrap_or(u64::MAX);
            let read = self
                .reader
                .by_ref()
                .take(ceiling)
                .read_until(b'\n', &mut line)
                .map_err(|source| TransportError::Read { source })?;
            if read == 0 {
                return Ok(None);
            }

            let terminated = line.last() == Some(&b'\n');
            let frame = strip_terminator(line);
            if frame.len() > self.limit {
                let rest = if terminated { 0 } else { self.skip_line()? };
                return Ok(Some(Frame::Oversized {
                    size: frame.len().saturating_add(rest),
                    max: self.limit,
                }));
            }
            if frame.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            return Ok(Some(Frame::Message(frame)));
        }
    }

    /// Consumes input up to and including the next newline, returning the
    /// number of bytes dropped before it.
    fn skip_line(&mut self) -> Result<usize, TransportError> {
        let mut skipped: usize = 0;
        loop {
            let available = match self.reader.fill_buf() {
                Ok(available) => available,
                Err(error) if error.kind() == ErrorKind::Interrupted => continue,
                Err(source) => return Err(TransportError::Read { source }),
            };
            if available.is_empty() {
                return Ok(skipped);
            }
            let newline = available.iter().position(|byte| *byte == b'\n');
            let consumed = newline.map_or(available.len(), |index| index.saturating_add(1));
            self.reader.consume(consumed);
            match newline {
                Some(index) => return Ok(skipped.saturating_add(index)),
                None => skipped = skipped.saturating_add(consumed),
            }
        }
    }
}

fn strip_terminator(mut line: Vec<u8>) -> Vec<u8> {
    if line.last() == Some(&b'\n') {
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
    }
    line
}
