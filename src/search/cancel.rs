//! User interrupt handling.

use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Exit status after a second interrupt
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Shared flag the traversal polls between directory visits
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Route Ctrl+C into this token. The first interrupt asks the scan to
    /// stop so the store can be saved; a second one exits immediately.
    pub fn install_ctrlc(&self) -> Result<()> {
        let cancelled = self.cancelled.clone();
        ctrlc::set_handler(move || {
            if cancelled.swap(true, Ordering::SeqCst) {
                std::process::exit(INTERRUPTED_EXIT_CODE);
            }
        })
        .context("Failed to set Ctrl+C handler")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let token = CancelToken::new();
        let seen_by_driver = token.clone();
        assert!(!seen_by_driver.is_cancelled());

        token.cancel();
        assert!(seen_by_driver.is_cancelled());
    }
}
