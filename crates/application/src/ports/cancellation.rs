//! Cancellation signal shared by every step of a run

use std::sync::Arc;

use tokio::sync::watch;

/// Sending half of a cancellation signal. Cancelling is sticky.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    sender: Arc<watch::Sender<bool>>,
}

impl CancellationToken {
    /// Creates a token and its first receiver.
    #[must_use]
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> (Self, CancellationReceiver) {
        let (sender, receiver) = watch::channel(false);
        (
            Self {
                sender: Arc::new(sender),
            },
            CancellationReceiver { receiver },
        )
    }

    /// Signals cancellation to every receiver.
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    /// Returns true once `cancel` has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }

    /// Returns another receiver for this token.
    #[must_use]
    pub fn receiver(&self) -> CancellationReceiver {
        CancellationReceiver {
            receiver: self.sender.subscribe(),
        }
    }
}

/// Receiving half of a cancellation signal.
#[derive(Debug, Clone)]
pub struct CancellationReceiver {
    receiver: watch::Receiver<bool>,
}

impl CancellationReceiver {
    /// A receiver that is never cancelled.
    #[must_use]
    pub fn never() -> Self {
        let (_sender, receiver) = watch::channel(false);
        Self { receiver }
    }

    /// Returns true if cancellation has been signalled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Completes once cancellation is signalled. Pends forever if the token
    /// is dropped without cancelling.
    pub async fn cancelled(&self) {
        let mut receiver = self.receiver.clone();
        if receiver.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn cancel_wakes_receiver() {
        let (token, receiver) = CancellationToken::new();
        assert!(!receiver.is_cancelled());

        let waiter = tokio::spawn(async move { receiver.cancelled().await });
        token.cancel();

        assert!(tokio::time::timeout(Duration::from_secs(1), waiter).await.is_ok());
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn already_cancelled_completes_immediately() {
        let (token, receiver) = CancellationToken::new();
        token.cancel();

        let late = token.receiver();
        assert!(late.is_cancelled());
        assert!(
            tokio::time::timeout(Duration::from_millis(100), late.cancelled())
                .await
                .is_ok()
        );
        assert!(receiver.is_cancelled());
    }

    #[tokio::test]
    async fn never_does_not_fire() {
        let receiver = CancellationReceiver::never();
        assert!(
            tokio::time::timeout(Duration::from_millis(20), receiver.cancelled())
                .await
                .is_err()
        );
    }
}
