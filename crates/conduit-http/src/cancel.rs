//! Cancellation signal shared between a ping loop and its deadline task.

use std::sync::Arc;
use tokio::sync::watch;

/// Cancels every [`CancellationWatcher`] subscribed to it.
///
/// Cancellation is sticky: once set it is never cleared.
#[derive(Clone)]
pub struct CancellationToken {
    notify: Arc<watch::Sender<bool>>,
}

impl CancellationToken {
    /// Create a new token and its first watcher.
    pub fn new() -> (Self, CancellationWatcher) {
        let (tx, rx) = watch::channel(false);
        let token = Self {
            notify: Arc::new(tx),
        };
        (token, CancellationWatcher { notify: rx })
    }

    /// Another watcher on this token.
    pub fn watcher(&self) -> CancellationWatcher {
        CancellationWatcher {
            notify: self.notify.subscribe(),
        }
    }

    /// Cancel. Returns `false` if the token was already cancelled.
    pub fn cancel(&self) -> bool {
        self.notify.send_if_modified(|cancelled| !std::mem::replace(cancelled, true))
    }

    pub fn is_cancelled(&self) -> bool {
        *self.notify.borrow()
    }

    /// Cancel when the returned guard is dropped.
    pub fn drop_guard(self) -> DropGuard {
        DropGuard { token: self }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new().0
    }
}

/// Observes a [`CancellationToken`].
#[derive(Clone)]
pub struct CancellationWatcher {
    notify: watch::Receiver<bool>,
}

impl CancellationWatcher {
    pub fn is_cancelled(&self) -> bool {
        *self.notify.borrow()
    }

    /// Wait for cancellation. Also resolves once every token is gone.
    pub async fn cancelled(&mut self) {
        let _ = self.notify.wait_for(|cancelled| *cancelled).await;
    }
}

/// Cancels its token on drop.
pub struct DropGuard {
    token: CancellationToken,
}

impl Drop for DropGuard {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
