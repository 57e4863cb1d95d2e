use std::sync::{Arc, Weak};

use super::store::SpectrumStore;

// ---------------------------------------------------------------------------
// Observer contract
// ---------------------------------------------------------------------------

/// Receives the shared store right after a new spectrum has been published.
/// Called synchronously on the producer thread, so implementations should
/// return quickly.
pub trait SpectrumObserver {
    fn on_data_updated(&self, store: &SpectrumStore);
}

// ---------------------------------------------------------------------------
// Notifier – weak-reference subscriber registry
// ---------------------------------------------------------------------------

/// Fan-out list of weak observer handles. The notifier never extends an
/// observer's lifetime; expired handles are skipped silently and compacted
/// during notification.
#[derive(Default)]
pub struct Notifier {
    observers: Vec<Weak<dyn SpectrumObserver>>,
}

impl Notifier {
    pub fn new() -> Self {
        Notifier::default()
    }

    pub fn subscribe(&mut self, observer: &Arc<dyn SpectrumObserver>) {
        self.observers.push(Arc::downgrade(observer));
    }

    /// Remove a subscriber by identity of the resolved strong reference.
    /// Expired entries encountered on the way are dropped as well.
    pub fn unsubscribe(&mut self, observer: &Arc<dyn SpectrumObserver>) {
        self.observers
            .retain(|weak| weak.upgrade().is_some_and(|live| !Arc::ptr_eq(&live, observer)));
    }

    /// Deliver the store to every live subscriber, in subscription order.
    pub fn notify(&mut self, store: &SpectrumStore) {
        self.observers.retain(|weak| match weak.upgrade() {
            Some(observer) => {
                observer.on_data_updated(store);
                true
            }
            None => false,
        });
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct Recorder {
        id: u8,
        log: Arc<Mutex<Vec<u8>>>,
    }

    impl SpectrumObserver for Recorder {
        fn on_data_updated(&self, _store: &SpectrumStore) {
            self.log.lock().unwrap().push(self.id);
        }
    }

    struct Counter(AtomicUsize);

    impl SpectrumObserver for Counter {
        fn on_data_updated(&self, _store: &SpectrumStore) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn delivers_in_subscription_order() {
        let store = SpectrumStore::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let first: Arc<dyn SpectrumObserver> = Arc::new(Recorder {
            id: 1,
            log: Arc::clone(&log),
        });
        let second: Arc<dyn SpectrumObserver> = Arc::new(Recorder {
            id: 2,
            log: Arc::clone(&log),
        });

        let mut notifier = Notifier::new();
        notifier.subscribe(&first);
        notifier.subscribe(&second);
        notifier.notify(&store);

        assert_eq!(*log.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn expired_subscribers_are_skipped_and_compacted() {
        let store = SpectrumStore::new();
        let kept: Arc<dyn SpectrumObserver> = Arc::new(Counter(AtomicUsize::new(0)));
        let dropped: Arc<dyn SpectrumObserver> = Arc::new(Counter(AtomicUsize::new(0)));

        let mut notifier = Notifier::new();
        notifier.subscribe(&dropped);
        notifier.subscribe(&kept);
        drop(dropped);

        notifier.notify(&store);
        assert_eq!(notifier.len(), 1);
        notifier.notify(&store);
        assert_eq!(notifier.len(), 1);
    }

    #[test]
    fn unsubscribe_removes_by_identity() {
        let store = SpectrumStore::new();
        let a = Arc::new(Counter(AtomicUsize::new(0)));
        let b = Arc::new(Counter(AtomicUsize::new(0)));
        let a_handle: Arc<dyn SpectrumObserver> = a.clone();
        let b_handle: Arc<dyn SpectrumObserver> = b.clone();

        let mut notifier = Notifier::new();
        notifier.subscribe(&a_handle);
        notifier.subscribe(&b_handle);
        notifier.unsubscribe(&a_handle);

        notifier.notify(&store);
        assert_eq!(a.0.load(Ordering::SeqCst), 0);
        assert_eq!(b.0.load(Ordering::SeqCst), 1);
    }
}
