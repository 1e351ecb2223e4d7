use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;

#[derive(Debug, Default)]
struct Inner {
    stopped: AtomicBool,
    notify: Notify,
}

/// Cancellation handle for long-running polling loops.
///
/// Clones share the same flag. Once stopped a signal stays stopped.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    inner: Arc<Inner>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.inner.stopped.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.load(Ordering::SeqCst)
    }

    /// Sleep for `duration`, returning early if the signal fires.
    ///
    /// Returns `true` when the signal is stopped.
    pub async fn sleep(&self, duration: Duration) -> bool {
        let notified = self.inner.notify.notified();
        if self.is_stopped() {
            return true;
        }
        tokio::select! {
            _ = tokio::time::sleep(duration) => {},
            _ = notified => {},
        }
        self.is_stopped()
    }

    /// Stop this signal on Ctrl+C until the returned guard is dropped.
    pub fn stop_on_ctrl_c(&self) -> CtrlCGuard {
        let signal = self.clone();
        let task = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::debug!("Ctrl+C received, stopping");
                signal.stop();
            }
        });
        CtrlCGuard { task }
    }
}

/// Disarms the Ctrl+C listener on drop.
#[derive(Debug)]
pub struct CtrlCGuard {
    task: JoinHandle<()>,
}

impl Drop for CtrlCGuard {
    fn drop(&mut self) {
        self.task.abort();
    }
}
