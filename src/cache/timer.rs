//! Periodic flush timer.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Task container for the periodic flush check.
///
/// Spawns a background task that sleeps for `period`, runs the tick to
/// completion, and re-arms. A tick that is running when the timer is
/// cancelled still finishes; no new tick starts afterwards.
#[derive(Debug)]
pub struct FlushTimer {
    cancellation_token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl FlushTimer {
    /// Starts the timer task. Must be called from within a Tokio runtime.
    pub fn start<F, Fut>(period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let cancellation_token = CancellationToken::new();

        let handle = tokio::spawn({
            let cancellation_token = cancellation_token.clone();
            async move {
                loop {
                    tokio::select! {
                        _ = cancellation_token.cancelled() => {
                            break;
                        }
                        _ = tokio::time::sleep(period) => {
                            on_tick().await;
                        }
                    }
                }
                log::debug!("Flush timer stopped");
            }
        });

        Self {
            cancellation_token,
            handle: Some(handle),
        }
    }

    /// Disarms the timer without waiting for the task to exit.
    pub fn cancel(&self) {
        self.cancellation_token.cancel();
    }

    /// Whether the timer was cancelled or stopped.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation_token.is_cancelled()
    }

    /// Disarms the timer and waits for a tick in progress to finish.
    pub async fn stop(&mut self) {
        self.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                log::error!("Flush timer task ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for FlushTimer {
    /// Dropping the container disarms the timer.
    fn drop(&mut self) {
        self.cancellation_token.cancel();
    }
}
