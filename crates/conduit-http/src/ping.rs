//! Readiness polling against a connector's ping path.

use std::time::Duration;
use tokio::time::{interval, sleep, MissedTickBehavior};

use crate::cancel::{CancellationToken, CancellationWatcher};
use crate::connector::Connector;
use crate::error::ConnectorError;

/// Delay between ping attempts.
pub const TICK_INTERVAL: Duration = Duration::from_millis(50);

impl Connector {
    /// Poll the ping path every [`TICK_INTERVAL`] until a GET succeeds or
    /// `timeout_secs` seconds have elapsed.
    pub async fn ping(&self, timeout_secs: u64) -> Result<(), ConnectorError> {
        self.ping_with_timeout(Duration::from_secs(timeout_secs))
            .await
    }

    /// Poll the ping path until a GET succeeds or `timeout` elapses.
    ///
    /// The first attempt is sent immediately. Failed attempts are discarded;
    /// only the deadline is reported. An attempt still in flight when the
    /// deadline fires is dropped.
    pub async fn ping_with_timeout(&self, timeout: Duration) -> Result<(), ConnectorError> {
        let (token, mut watcher) = CancellationToken::new();
        spawn_deadline(token.clone(), watcher.clone(), timeout);
        // Stops the deadline task once this function returns, whatever the outcome.
        let _guard = token.drop_guard();

        let mut ticker = interval(TICK_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut attempts: u32 = 0;
        loop {
            tokio::select! {
                biased;
                _ = watcher.cancelled() => return Err(self.ping_timeout(timeout, attempts)),
                _ = ticker.tick() => {}
            }

            attempts += 1;
            tokio::select! {
                biased;
                _ = watcher.cancelled() => return Err(self.ping_timeout(timeout, attempts)),
                result = self.get(self.ping_path()) => match result {
                    Ok(_) => {
                        tracing::debug!(url = %self.base_url(), attempts, "ping succeeded");
                        return Ok(());
                    }
                    Err(e) => {
                        tracing::trace!(url = %self.base_url(), attempts, error = %e, "ping attempt failed");
                    }
                },
            }
        }
    }

    fn ping_timeout(&self, timeout: Duration, attempts: u32) -> ConnectorError {
        tracing::warn!(url = %self.base_url(), ?timeout, attempts, "ping timed out");
        ConnectorError::PingTimeout {
            url: self.base_url().to_string(),
            timeout,
        }
    }
}

/// Cancel `token` after `timeout`, unless it is cancelled first.
fn spawn_deadline(token: CancellationToken, mut watcher: CancellationWatcher, timeout: Duration) {
    tokio::spawn(async move {
        tokio::select! {
            _ = sleep(timeout) => {
                token.cancel();
            }
            _ = watcher.cancelled() => {}
        }
    });
}
