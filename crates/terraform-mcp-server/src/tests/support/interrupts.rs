//! Interrupt listener driven by the test instead of OS signals.

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::process::{InterruptGuard, InterruptListener, ShutdownError, ShutdownToken};

/// Listener that cancels the installed token when [`interrupt`] is called.
///
/// [`interrupt`]: ManualInterruptListener::interrupt
#[derive(Debug, Default, Clone)]
pub struct ManualInterruptListener {
    token: Arc<Mutex<Option<ShutdownToken>>>,
    releases: Arc<AtomicUsize>,
    fail_install: bool,
}

impl ManualInterruptListener {
    /// A listener whose installation fails.
    pub fn failing() -> Self {
        Self {
            fail_install: true,
            ..Self::default()
        }
    }

    /// Simulates SIGINT. Returns `false` when nothing is installed yet.
    pub fn interrupt(&self) -> bool {
        let installed = self.token.lock().expect("listener mutex poisoned").clone();
        installed.is_some_and(|token| {
            token.cancel();
            true
        })
    }

    /// Whether the supervisor has installed the listener.
    pub fn is_installed(&self) -> bool {
        self.token.lock().expect("listener mutex poisoned").is_some()
    }

    /// How many times the installed guard has been released.
    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

impl InterruptListener for ManualInterruptListener {
    fn install(&self, token: &ShutdownToken) -> Result<InterruptGuard, ShutdownError> {
        if self.fail_install {
            return Err(ShutdownError::Install {
                source: io::Error::other("signal handlers unavailable"),
            });
        }
        *self.token.lock().expect("listener mutex poisoned") = Some(token.clone());
        let releases = Arc::clone(&self.releases);
        Ok(InterruptGuard::new(move || {
            releases.fetch_add(1, Ordering::SeqCst);
        }))
    }
}
