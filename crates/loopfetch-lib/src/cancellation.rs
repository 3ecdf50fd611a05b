use crate::error::LoopFetchError;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cooperative stop flag, observed between manifest and package operations.
#[derive(Clone, Debug, Default)]
pub struct Cancellation {
    cancelled: Arc<AtomicBool>,
}

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn check(&self) -> Result<(), LoopFetchError> {
        if self.is_cancelled() {
            Err(LoopFetchError::Interrupted)
        } else {
            Ok(())
        }
    }

    /// Cancels on the first Ctrl-C. Must be called from within a tokio runtime.
    pub fn cancel_on_ctrl_c(&self) {
        let cancellation = self.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::warn!("Interrupt received, stopping after the current operation");
                    cancellation.cancel();
                }
                Err(err) => tracing::warn!("Failed to listen for interrupts: {}", err),
            }
        });
    }
}
