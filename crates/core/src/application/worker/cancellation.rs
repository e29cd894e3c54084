// Work Cancellation Token

use std::time::Duration;
use tokio::sync::watch;

/// Cooperative cancellation signal for one chain run
#[derive(Clone)]
pub struct CancellationToken {
    rx: watch::Receiver<bool>,
}

impl CancellationToken {
    /// Check if cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait for cancellation. Never resolves if the sender is gone.
    pub async fn cancelled(&mut self) {
        let closed = self.rx.wait_for(|cancelled| *cancelled).await.is_err();
        if closed {
            std::future::pending::<()>().await;
        }
    }

    /// Sleep for `duration` unless cancelled first.
    /// Returns false if cancellation cut the sleep short.
    pub async fn sleep(&mut self, duration: Duration) -> bool {
        if self.is_cancelled() {
            return false;
        }
        tokio::select! {
            _ = tokio::time::sleep(duration) => true,
            _ = self.cancelled() => false,
        }
    }
}

/// Cancellation sender
pub struct CancellationSender {
    tx: watch::Sender<bool>,
}

impl CancellationSender {
    /// Signal cancellation to every token of this run
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

/// Create a cancellation channel
pub fn cancellation_channel() -> (CancellationSender, CancellationToken) {
    let (tx, rx) = watch::channel(false);
    (CancellationSender { tx }, CancellationToken { rx })
}
