//! Coalescing of change bursts into a single report.
//!
//! At most one timer is pending at any time. Every qualifying change
//! cancels the pending timer and arms a fresh one carrying the latest path,
//! so only the last path of a burst is reported once the delay passes
//! without further changes.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Callback invoked with the last changed path of a settled burst.
pub type Reporter = Arc<dyn Fn(&Path) + Send + Sync>;

/// The armed timer. Replaced as a whole on every qualifying change.
struct Pending {
    cancel: CancellationToken,
    path: PathBuf,
}

/// Debounces qualifying changes for one watch session.
pub struct Debouncer {
    delay: Duration,
    reporter: Reporter,
    pending: Arc<Mutex<Option<Pending>>>,
}

impl Debouncer {
    /// Create a debouncer that reports through `reporter` after `delay`.
    pub fn new(delay: Duration, reporter: Reporter) -> Self {
        Self {
            delay,
            reporter,
            pending: Arc::new(Mutex::new(None)),
        }
    }

    /// Record a qualifying change, restarting the delay.
    pub async fn notify(&self, path: PathBuf) {
        let cancel = CancellationToken::new();

        {
            let mut pending = self.pending.lock().await;
            if let Some(previous) = pending.take() {
                previous.cancel.cancel();
            }
            *pending = Some(Pending {
                cancel: cancel.clone(),
                path,
            });
        }

        let delay = self.delay;
        let reporter = self.reporter.clone();
        let pending = self.pending.clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(delay) => fire(&pending, &cancel, &reporter).await,
            }
        });
    }

    /// Drop the pending timer, if any, without reporting.
    pub async fn cancel(&self) {
        if let Some(previous) = self.pending.lock().await.take() {
            previous.cancel.cancel();
            debug!("Cancelled pending report for {}", previous.path.display());
        }
    }

    /// Check if a report is pending.
    pub async fn is_pending(&self) -> bool {
        self.pending.lock().await.is_some()
    }
}

/// Report the pending path unless `cancel` was cancelled in the meantime.
///
/// Cancellation happens under the same lock, so a timer that loses the race
/// against a newer change never reports.
async fn fire(pending: &Mutex<Option<Pending>>, cancel: &CancellationToken, reporter: &Reporter) {
    let path = {
        let mut pending = pending.lock().await;
        if cancel.is_cancelled() {
            return;
        }
        match pending.take() {
            Some(settled) => settled.path,
            None => return,
        }
    };

    debug!("Settled: {}", path.display());
    reporter(&path);
}
