//! Message handling abstraction for the transport loop.

use crate::dispatch::JsonRpcResponse;

/// Turns one inbound frame into at most one response.
pub trait MessageHandler: Send + Sync {
    /// Handles a single frame.
    ///
    /// Returns `None` when no response is due, as for notifications.
    /// Implementations must report failures as error responses rather than
    /// panicking.
    fn handle(&self, frame: &[u8]) -> Option<JsonRpcResponse>;
}

impl<T> MessageHandler for std::sync::Arc<T>
where
    T: MessageHandler + ?Sized,
{
    fn handle(&self, frame: &[u8]) -> Option<JsonRpcResponse> {
        (**self).handle(frame)
    }
}
