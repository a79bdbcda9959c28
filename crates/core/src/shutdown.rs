//! Cooperative interrupt handling
//!
//! A Ctrl+C handler flips a shared flag; long-running loops poll it between
//! blocking operations.

use crate::error::{Error, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// How often [`Shutdown::sleep`] checks the flag
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Shared interrupt flag
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    requested: Arc<AtomicBool>,
}

impl Shutdown {
    /// Create a flag that is not wired to any signal
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a flag set by Ctrl+C
    ///
    /// Only one handler can be installed per process.
    pub fn install() -> Result<Self> {
        let shutdown = Self::new();
        let flag = Arc::clone(&shutdown.requested);
        ctrlc::set_handler(move || {
            flag.store(true, Ordering::SeqCst);
        })
        .map_err(|e| Error::process(format!("Failed to install Ctrl+C handler: {}", e)))?;
        Ok(shutdown)
    }

    /// Whether an interrupt has been received
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Mark the interrupt as received
    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    /// Sleep for `duration`, waking early on interrupt
    ///
    /// Returns `false` if the sleep was cut short.
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        loop {
            if self.is_requested() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            thread::sleep(POLL_INTERVAL.min(deadline - now));
        }
    }
}
