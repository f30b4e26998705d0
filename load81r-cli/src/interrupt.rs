//! Ctrl-C handling.
//!
//! While a sync is running, the first Ctrl-C asks it to stop after the
//! current entry. At any other time (or on a second press) the process
//! exits with status 130.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Exit status for an interrupted run.
pub const EXIT_INTERRUPTED: u8 = 130;

/// Shared interrupt state.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    requested: Arc<AtomicBool>,
    armed: Arc<AtomicBool>,
}

/// Keeps graceful cancellation enabled until dropped.
pub struct Armed<'a> {
    interrupt: &'a Interrupt,
}

impl Interrupt {
    /// Install the process-wide Ctrl-C handler.
    pub fn install(&self) -> Result<(), ctrlc::Error> {
        let interrupt = self.clone();
        ctrlc::set_handler(move || {
            if !interrupt.on_signal() {
                std::process::exit(i32::from(EXIT_INTERRUPTED));
            }
        })
    }

    /// Enable graceful cancellation and clear any earlier request.
    pub fn arm(&self) -> Armed<'_> {
        self.requested.store(false, Ordering::SeqCst);
        self.armed.store(true, Ordering::SeqCst);
        Armed { interrupt: self }
    }

    /// The flag a running sync polls.
    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.requested)
    }

    /// Record a signal. Returns false if the process should exit now.
    fn on_signal(&self) -> bool {
        if !self.armed.load(Ordering::SeqCst) {
            return false;
        }
        if self.requested.swap(true, Ordering::SeqCst) {
            return false;
        }
        eprintln!("\nInterrupted, stopping after the current entry (Ctrl-C again to quit)");
        true
    }
}

impl Drop for Armed<'_> {
    fn drop(&mut self) {
        self.interrupt.armed.store(false, Ordering::SeqCst);
    }
}
