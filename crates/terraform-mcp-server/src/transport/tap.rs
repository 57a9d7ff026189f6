//! Pass-through recording of every byte crossing the transport.
//!
//! [`RecordingTap::wrap`] decorates a [`StreamPair`] so that inbound bytes are
//! recorded as soon as they are read and outbound bytes just before they are
//! delivered. The wrapped halves return the same bytes and the same IO errors
//! as the raw ones; a failing [`Recorder`] is logged and otherwise ignored.

use std::io::{self, Read, Write};
use std::sync::Arc;

use tracing::{info, warn};

use super::{COMMANDS_TARGET, LISTENER_TARGET, StreamPair};

/// Which way a recorded chunk travelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::IntoStaticStr)]
pub enum Direction {
    /// Bytes read from the client.
    #[strum(serialize = "stdin")]
    Inbound,
    /// Bytes written to the client.
    #[strum(serialize = "stdout")]
    Outbound,
}

/// Sink for recorded transport bytes.
pub trait Recorder: Send + Sync {
    /// Records one chunk in transit order.
    ///
    /// # Errors
    ///
    /// Returns an IO error when the chunk could not be recorded. The tap logs
    /// the failure; the transport is unaffected.
    fn record(&self, direction: Direction, bytes: &[u8]) -> io::Result<()>;
}

impl<T> Recorder for Arc<T>
where
    T: Recorder + ?Sized,
{
    fn record(&self, direction: Direction, bytes: &[u8]) -> io::Result<()> {
        (**self).record(direction, bytes)
    }
}

/// Records chunks as structured `tracing` events on the command log target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingRecorder;

impl Recorder for TracingRecorder {
    fn record(&self, direction: Direction, bytes: &[u8]) -> io::Result<()> {
        let stream: &'static str = direction.into();
        info!(
            target: COMMANDS_TARGET,
            direction = stream,
            bytes = bytes.len(),
            payload = %String::from_utf8_lossy(bytes),
            "transport chunk"
        );
        Ok(())
    }
}

/// Wraps stream pairs with a [`Recorder`].
#[derive(Debug, Clone, Copy)]
pub struct RecordingTap;

impl RecordingTap {
    /// Wraps both halves of `pair` so every transported byte reaches `recorder`.
    #[must_use]
    pub fn wrap<R, W>(
        pair: StreamPair<R, W>,
        recorder: Arc<dyn Recorder>,
    ) -> StreamPair<TappedReader<R>, TappedWriter<W>> {
        let (reader, writer) = pair.into_parts();
        StreamPair::new(
            TappedReader {
                inner: reader,
                recorder: RecorderSlot::new(Arc::clone(&recorder), Direction::Inbound),
            },
            TappedWriter {
                inner: writer,
                recorder: RecorderSlot::new(recorder, Direction::Outbound),
            },
        )
    }
}

/// Reader half produced by [`RecordingTap::wrap`].
pub struct TappedReader<R> {
    inner: R,
    recorder: RecorderSlot,
}

impl<R: Read> Read for TappedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let read = self.inner.read(buf)?;
        if let Some(chunk) = buf.get(..read) {
            self.recorder.record(chunk);
        }
        Ok(read)
    }
}

/// Writer half produced by [`RecordingTap::wrap`].
///
/// Each write delivers the whole buffer or fails, so a chunk is recorded once
/// and never split across partial writes.
pub struct TappedWriter<W> {
    inner: W,
    recorder: RecorderSlot,
}

impl<W: Write> Write for TappedWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.recorder.record(buf);
        self.inner.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

struct RecorderSlot {
    recorder: Arc<dyn Recorder>,
    direction: Direction,
    last_failure: Option<io::ErrorKind>,
}

impl RecorderSlot {
    fn new(recorder: Arc<dyn Recorder>, direction: Direction) -> Self {
        Self {
            recorder,
            direction,
            last_failure: None,
        }
    }

    fn record(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        match self.recorder.record(self.direction, bytes) {
            Ok(()) => self.last_failure = None,
            Err(error) => {
                if self.last_failure != Some(error.kind()) {
                    warn!(
                        target: LISTENER_TARGET,
                        direction = %self.direction,
                        %error,
                        "failed to record transport bytes"
                    );
                }
                self.last_failure = Some(error.kind());
            }
        }
    }
}
