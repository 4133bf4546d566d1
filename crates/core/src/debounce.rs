//! Debounced query propagation.
//!
//! Raw input values are held back until a quiescence window passes with no
//! further input, then the latest value is emitted once on a channel.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Cancellable timer that collapses rapid input into one settled value.
///
/// Each [`push`](Self::push) cancels the pending timer and starts a new one.
/// Dropping the debouncer cancels any pending emission.
pub struct QueryDebouncer {
    window: Duration,
    tx: mpsc::UnboundedSender<String>,
    pending: Option<JoinHandle<()>>,
}

impl QueryDebouncer {
    /// Create a debouncer that emits settled values on `tx`.
    pub fn new(window: Duration, tx: mpsc::UnboundedSender<String>) -> Self {
        Self {
            window,
            tx,
            pending: None,
        }
    }

    /// Create a debouncer together with the receiving end of its channel.
    pub fn channel(window: Duration) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(window, tx), rx)
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Feed a raw input value, restarting the quiescence window.
    pub fn push(&mut self, value: impl Into<String>) {
        self.cancel();

        let value = value.into();
        let tx = self.tx.clone();
        let window = self.window;

        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;
            debug!("Query settled: '{}'", value);
            // Receiver gone means the owner was torn down.
            let _ = tx.send(value);
        }));
    }

    /// Cancel the pending emission, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    /// Whether a value is waiting for its window to elapse.
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for QueryDebouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
