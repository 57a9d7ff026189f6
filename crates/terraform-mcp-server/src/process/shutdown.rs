use std::fmt;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;

use signal_hook::consts::signal::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use thiserror::Error;
use tracing::{info, warn};

use super::PROCESS_TARGET;

type Callback = Box<dyn FnOnce() + Send>;

#[derive(Default)]
struct TokenState {
    cancelled: AtomicBool,
    callbacks: Mutex<Vec<Callback>>,
}

/// Cooperative cancellation shared by the supervisor, the message loop and
/// the interrupt listener.
///
/// Clones observe the same state. Cancellation is permanent.
#[derive(Clone, Default)]
pub struct ShutdownToken {
    state: Arc<TokenState>,
}

impl fmt::Debug for ShutdownToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShutdownToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

impl ShutdownToken {
    /// Creates a token that has not been cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels the token and runs the registered callbacks once.
    pub fn cancel(&self) {
        let callbacks = {
            let mut pending = lock(&self.state.callbacks);
            if self.state.cancelled.swap(true, Ordering::SeqCst) {
                return;
            }
            std::mem::take(&mut *pending)
        };
        for callback in callbacks {
            callback();
        }
    }

    /// Whether [`cancel`](Self::cancel) has been called on any clone.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::SeqCst)
    }

    /// Runs `callback` on cancellation, or immediately if already cancelled.
    pub fn on_cancel<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        {
            let mut pending = lock(&self.state.callbacks);
            if !self.state.cancelled.load(Ordering::SeqCst) {
                pending.push(Box::new(callback));
                return;
            }
        }
        callback();
    }
}

/// Errors reported by interrupt listeners.
#[derive(Debug, Error)]
pub enum ShutdownError {
    /// Installing signal handlers failed.
    #[error("failed to install signal handlers: {source}")]
    Install {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The signal listener thread could not be spawned.
    #[error("failed to spawn signal listener: {source}")]
    Spawn {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Translates external interruptions into token cancellation.
pub trait InterruptListener: Send + Sync {
    /// Starts listening; interruptions cancel `token` until the returned
    /// guard is released or dropped.
    ///
    /// # Errors
    ///
    /// Returns a [`ShutdownError`] when the listener cannot be installed.
    fn install(&self, token: &ShutdownToken) -> Result<InterruptGuard, ShutdownError>;
}

/// Keeps an interrupt listener installed; releasing it uninstalls the
/// listener.
pub struct InterruptGuard {
    release: Option<Callback>,
}

impl fmt::Debug for InterruptGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterruptGuard")
            .field("installed", &self.release.is_some())
            .finish()
    }
}

impl InterruptGuard {
    /// Creates a guard that runs `release` when the listener is uninstalled.
    #[must_use]
    pub fn new<F>(release: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Uninstalls the listener now.
    pub fn release(mut self) {
        self.run_release();
    }

    fn run_release(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for InterruptGuard {
    fn drop(&mut self) {
        self.run_release();
    }
}

/// Listener that cancels the token on `SIGINT` or `SIGTERM`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SignalInterruptListener;

impl SignalInterruptListener {
    /// Builds a signal listener.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl InterruptListener for SignalInterruptListener {
    fn install(&self, token: &ShutdownToken) -> Result<InterruptGuard, ShutdownError> {
        let mut signals =
            Signals::new([SIGINT, SIGTERM]).map_err(|source| ShutdownError::Install { source })?;
        let handle = signals.handle();
        let signal_token = token.clone();
        let thread = thread::Builder::new()
            .name("signal-listener".to_owned())
            .spawn(move || {
                for signal in signals.forever() {
                    info!(target: PROCESS_TARGET, signal, "interrupt received");
                    signal_token.cancel();
                }
            })
            .map_err(|source| ShutdownError::Spawn { source })?;
        Ok(InterruptGuard::new(move || {
            handle.close();
            if thread.join().is_err() {
                warn!(target: PROCESS_TARGET, "signal listener thread panicked");
            }
        }))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
