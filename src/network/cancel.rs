// * Cooperative cancellation over a watch channel.
// * The binary trips the sender on ctrl-c; every limiter wait and in-flight
// * request races the handle and bails out with AccessError::Cancelled.

use tokio::sync::watch;

// * Creates a linked sender/handle pair. Send `true` to cancel.
pub fn cancel_channel() -> (watch::Sender<bool>, CancelHandle) {
    let (tx, rx) = watch::channel(false);
    (tx, CancelHandle { rx })
}

#[derive(Clone, Debug)]
pub struct CancelHandle {
    rx: watch::Receiver<bool>,
}

impl CancelHandle {
    // * A handle that never fires, for callers without a cancellation source.
    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self { rx }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    // * Resolves once cancellation is signalled. If the sender is gone without
    // * ever cancelling, the future stays pending forever.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow() {
                return;
            }
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn handle_reports_cancellation() {
        let (tx, handle) = cancel_channel();
        assert!(!handle.is_cancelled());

        tx.send(true).expect("receiver alive");
        assert!(handle.is_cancelled());

        // * Must resolve promptly once tripped
        tokio::time::timeout(Duration::from_secs(1), handle.cancelled())
            .await
            .expect("cancelled() should resolve");
    }

    #[tokio::test]
    async fn never_handle_stays_pending() {
        let handle = CancelHandle::never();
        let outcome =
            tokio::time::timeout(Duration::from_millis(50), handle.cancelled()).await;
        assert!(outcome.is_err(), "never() handle must not resolve");
    }

    #[tokio::test]
    async fn clones_observe_the_same_signal() {
        let (tx, handle) = cancel_channel();
        let clone = handle.clone();
        tx.send(true).expect("receiver alive");
        assert!(clone.is_cancelled());
    }
}
