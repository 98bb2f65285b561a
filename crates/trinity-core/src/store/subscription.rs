//! Cancellable full-snapshot streams.

use super::document::Document;
use tokio::sync::watch;

type CancelFn = Box<dyn FnOnce() + Send + Sync>;

/// A live subscription to a query or a single document.
///
/// Each emission is the complete current result, never a diff, so consumers
/// replace their projection wholesale. Intermediate snapshots may be
/// coalesced when the consumer falls behind; the latest one is never lost.
///
/// The subscription ends with [`Subscription::unsubscribe`], which consumes
/// the handle. Dropping the handle has the same effect.
pub struct Subscription<T> {
    receiver: watch::Receiver<T>,
    primed: bool,
    cancel: Option<CancelFn>,
}

/// Subscription to an ordered collection query.
pub type CollectionSubscription = Subscription<Vec<Document>>;

/// Subscription to a single document; `None` while it does not exist.
pub type DocumentSubscription = Subscription<Option<Document>>;

impl<T: Clone> Subscription<T> {
    /// Wraps a watch receiver. The value current at this point is the first emission.
    pub fn new(receiver: watch::Receiver<T>) -> Self {
        Self {
            receiver,
            primed: false,
            cancel: None,
        }
    }

    /// Registers the teardown the store runs when this subscription ends.
    pub fn with_cancel(mut self, cancel: impl FnOnce() + Send + Sync + 'static) -> Self {
        self.cancel = Some(Box::new(cancel));
        self
    }

    /// Waits for the next snapshot.
    ///
    /// The first call returns the current snapshot immediately. Returns
    /// `None` once the store has closed the stream.
    pub async fn next(&mut self) -> Option<T> {
        if !self.primed {
            self.primed = true;
            return Some(self.receiver.borrow_and_update().clone());
        }
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    /// Returns a pending snapshot without waiting.
    pub fn try_next(&mut self) -> Option<T> {
        if !self.primed {
            self.primed = true;
            return Some(self.receiver.borrow_and_update().clone());
        }
        match self.receiver.has_changed() {
            Ok(true) => Some(self.receiver.borrow_and_update().clone()),
            _ => None,
        }
    }

    /// Ends the subscription.
    pub fn unsubscribe(mut self) {
        self.run_cancel();
    }
}

impl<T> Subscription<T> {
    fn run_cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.run_cancel();
    }
}

impl<T> std::fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("primed", &self.primed)
            .field("cancellable", &self.cancel.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_first_next_yields_current_value() {
        let (sender, receiver) = watch::channel(vec![1, 2]);
        let mut subscription = Subscription::new(receiver);

        assert_eq!(subscription.next().await, Some(vec![1, 2]));
        assert_eq!(subscription.try_next(), None);

        sender.send_replace(vec![3]);
        assert_eq!(subscription.try_next(), Some(vec![3]));
    }

    #[tokio::test]
    async fn test_next_returns_none_when_store_closes() {
        let (sender, receiver) = watch::channel(0u8);
        let mut subscription = Subscription::new(receiver);
        subscription.next().await;

        drop(sender);
        assert_eq!(subscription.next().await, None);
    }

    #[test]
    fn test_cancel_runs_exactly_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (_sender, receiver) = watch::channel(());
        let counter = calls.clone();
        let subscription = Subscription::new(receiver).with_cancel(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        subscription.unsubscribe();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_cancels() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (_sender, receiver) = watch::channel(());
        let counter = calls.clone();
        {
            let _subscription = Subscription::new(receiver).with_cancel(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
