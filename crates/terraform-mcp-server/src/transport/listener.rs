//! Read-dispatch-write loop over a single transport session.

use std::io::{Read, Write};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::dispatch::{DispatchError, JsonRpcResponse, ResponseWriter};
use crate::process::ShutdownToken;

use super::framing::{Frame, FrameReader};
use super::{LISTENER_TARGET, MessageHandler, StreamPair, TransportError};

/// Input stream, output stream and shutdown token for one run of the loop.
#[derive(Debug)]
pub struct TransportSession<R, W> {
    streams: StreamPair<R, W>,
    token: ShutdownToken,
}

impl<R, W> TransportSession<R, W> {
    /// Binds a stream pair to the token that stops the loop.
    #[must_use]
    pub const fn new(streams: StreamPair<R, W>, token: ShutdownToken) -> Self {
        Self { streams, token }
    }
}

/// Serves requests until the input closes, the token is cancelled or the
/// transport fails.
///
/// Responses are written and flushed in request order before the next frame
/// is read. A line over the size limit is skipped and answered with an
/// invalid-request error carrying a `null` id. Cancellation is observed between messages; a read that is already
/// blocked returns only once the input produces data or closes.
///
/// # Errors
///
/// Returns a [`TransportError`] when reading, serialising, writing or
/// flushing fails. Handler failures are answered in-band and never end the
/// loop.
pub fn serve<R, W, H>(session: TransportSession<R, W>, handler: &H) -> Result<(), TransportError>
where
    R: Read,
    W: Write,
    H: MessageHandler + ?Sized,
{
    let TransportSession { streams, token } = session;
    let (reader, writer) = streams.into_parts();
    let mut frames = FrameReader::new(reader);
    let mut responses = ResponseWriter::new(writer);
    let mut served: u64 = 0;

    loop {
        if token.is_cancelled() {
            info!(target: LISTENER_TARGET, served, "shutdown requested; message loop stopping");
            return Ok(());
        }
        let Some(frame) = frames.next_frame()? else {
            info!(target: LISTENER_TARGET, served, "input stream closed");
            return Ok(());
        };
        if token.is_cancelled() {
            debug!(target: LISTENER_TARGET, "message arrived after shutdown; discarded");
            return Ok(());
        }

        let response = match frame {
            Frame::Message(message) => handler.handle(&message),
            Frame::Oversized { size, max } => Some(oversized_response(size, max)),
        };
        if let Some(response) = response {
            responses.write_response(&response)?;
        }
        served = served.saturating_add(1);
    }
}

fn oversized_response(size: usize, max: usize) -> JsonRpcResponse {
    warn!(target: LISTENER_TARGET, size, max, "oversized message discarded");
    let error = DispatchError::invalid_request(format!(
        "message of {size} bytes exceeds the {max} byte limit"
    ));
    JsonRpcResponse::failure(Value::Null, &error)
}
