//! Bounded exponential-backoff reconnection
//!
//! Wraps transport connect failures with a fixed retry budget. Once the
//! budget is spent the session degrades to REST-only for the lifetime of this
//! controller; a fresh controller (new mount) is the only way back. No jitter
//! and no half-open probing: the blast radius is one browser tab.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use matchpoint_common::{AppResult, ReconnectConfig};

/// Realtime session state as observed by UI consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No connection attempt made yet
    Idle,
    /// A connect attempt is in flight
    Connecting,
    /// The realtime channel is up
    Connected,
    /// Waiting out a backoff delay before the next attempt
    Retrying,
    /// Retry budget exhausted; realtime delivery unavailable until remount
    Degraded,
}

impl SessionState {
    #[must_use]
    pub fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }

    #[must_use]
    pub fn is_degraded(self) -> bool {
        matches!(self, Self::Degraded)
    }
}

/// Connect capability the controller drives
///
/// Implemented by the STOMP transport; mocked in tests.
#[async_trait]
pub trait Connect: Send + Sync {
    async fn connect(&self) -> AppResult<()>;
}

/// Drives connect attempts with bounded exponential backoff
pub struct ReconnectController {
    config: ReconnectConfig,
    state_tx: watch::Sender<SessionState>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl ReconnectController {
    /// Create a controller in the Idle state
    #[must_use]
    pub fn new(config: ReconnectConfig) -> Self {
        let (state_tx, _) = watch::channel(SessionState::Idle);
        Self {
            config,
            state_tx,
            task: Mutex::new(None),
        }
    }

    /// Current state snapshot
    #[must_use]
    pub fn state(&self) -> SessionState {
        *self.state_tx.borrow()
    }

    /// Subscribe to state transitions
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    /// Start (or restart) the connect driver
    pub fn spawn<C: Connect + 'static>(&self, connector: Arc<C>) {
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
        let config = self.config.clone();
        let state_tx = self.state_tx.clone();
        let handle = tokio::spawn(run_driver(config, connector, state_tx));
        *self.task.lock() = Some(handle);
    }

    /// Abort the driver, cancelling any pending backoff timer
    pub fn shutdown(&self) {
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
    }
}

impl Drop for ReconnectController {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Backoff delay for the nth consecutive failure (1-based)
fn backoff_delay(config: &ReconnectConfig, failures: u32) -> Duration {
    let exp = failures.saturating_sub(1).min(31);
    let millis = config.base_delay_ms.saturating_mul(1_u64 << exp);
    Duration::from_millis(millis.min(config.max_delay_ms))
}

async fn run_driver<C: Connect>(
    config: ReconnectConfig,
    connector: Arc<C>,
    state_tx: watch::Sender<SessionState>,
) {
    let mut failures = 0_u32;
    loop {
        state_tx.send_replace(SessionState::Connecting);
        match connector.connect().await {
            Ok(()) => {
                state_tx.send_replace(SessionState::Connected);
                tracing::info!(attempts = failures + 1, "Realtime channel connected");
                return;
            }
            Err(err) => {
                failures += 1;
                let delay = backoff_delay(&config, failures);
                tracing::warn!(
                    error = %err,
                    failures,
                    delay_ms = delay.as_millis() as u64,
                    "Realtime connect failed"
                );
                state_tx.send_replace(SessionState::Retrying);
                tokio::time::sleep(delay).await;

                if failures >= config.max_retries {
                    tracing::warn!(
                        max_retries = config.max_retries,
                        "Retry budget exhausted; chat degraded to REST-only"
                    );
                    state_tx.send_replace(SessionState::Degraded);
                    return;
                }
            }
        }
    }
}
