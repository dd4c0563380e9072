//! Graceful stop for the asset listeners.
//!
//! One `Shutdown` is created at startup. The signal task triggers it, and the
//! plain and TLS servers each hold a receiver and stop accepting once it
//! fires. `axum::serve` drains in-flight downloads unbounded; the TLS server
//! gives them `DRAIN_GRACE`.

use std::time::Duration;

use tokio::sync::broadcast;

/// Time a TLS listener waits for open file and relay streams after a stop.
pub const DRAIN_GRACE: Duration = Duration::from_secs(10);

/// Stop signal shared by the signal task and every server loop.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Receiver for one server loop.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Stop every listener. Calling it again is a no-op.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Server loops still waiting on the signal.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves once `rx` sees a trigger or every `Shutdown` handle is dropped.
pub async fn notified(mut rx: broadcast::Receiver<()>) {
    let _ = rx.recv().await;
    tracing::info!("Shutdown signal received, draining connections");
}
