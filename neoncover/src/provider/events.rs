//! Provider event fan-out.
//!
//! Each subscriber gets its own queue and an id. Unsubscribing removes that
//! one queue and nothing else, so two listeners registered by different
//! owners never interfere.

use alloy::primitives::Address;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use tokio::sync::mpsc;
use tracing::{debug, trace};

/// An event emitted by an account provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    /// The exposed accounts changed. Empty means the wallet was locked or
    /// the site's permission was revoked.
    AccountsChanged(Vec<Address>),
    /// The active chain changed; carries the new hex chain id.
    ChainChanged(String),
}

/// Identifies one subscription on an [`EventHub`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Receiving end of a subscription.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    rx: mpsc::UnboundedReceiver<ProviderEvent>,
}

impl Subscription {
    /// The token needed to unsubscribe.
    #[must_use]
    pub const fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Wait for the next event. Returns `None` once unsubscribed and drained.
    pub async fn recv(&mut self) -> Option<ProviderEvent> {
        self.rx.recv().await
    }

    /// Take the next queued event without waiting.
    pub fn try_recv(&mut self) -> Option<ProviderEvent> {
        self.rx.try_recv().ok()
    }
}

/// Subscriber registry for provider events.
#[derive(Debug, Default)]
pub struct EventHub {
    next_id: AtomicU64,
    subscribers: Mutex<HashMap<SubscriptionId, mpsc::UnboundedSender<ProviderEvent>>>,
}

impl EventHub {
    /// Create an empty hub.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber.
    pub fn subscribe(&self) -> Subscription {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock().insert(id, tx);
        debug!(subscription = id.0, "provider subscription added");
        Subscription { id, rx }
    }

    /// Remove exactly the given subscriber. Returns whether it was present.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self.lock().remove(&id).is_some();
        if removed {
            debug!(subscription = id.0, "provider subscription removed");
        }
        removed
    }

    /// Deliver an event to every live subscriber. Returns the delivery count.
    pub fn emit(&self, event: &ProviderEvent) -> usize {
        let mut subscribers = self.lock();
        subscribers.retain(|_, tx| tx.send(event.clone()).is_ok());
        trace!(?event, receivers = subscribers.len(), "provider event emitted");
        subscribers.len()
    }

    /// Number of registered subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(
        &self,
    ) -> std::sync::MutexGuard<'_, HashMap<SubscriptionId, mpsc::UnboundedSender<ProviderEvent>>>
    {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsubscribe_is_exact() {
        let hub = EventHub::new();
        let mut first = hub.subscribe();
        let mut second = hub.subscribe();
        assert_eq!(hub.subscriber_count(), 2);

        assert!(hub.unsubscribe(first.id()));
        assert!(!hub.unsubscribe(first.id()));

        let delivered = hub.emit(&ProviderEvent::ChainChanged("0x1".into()));
        assert_eq!(delivered, 1);
        assert_eq!(
            second.try_recv(),
            Some(ProviderEvent::ChainChanged("0x1".into()))
        );
        assert_eq!(first.try_recv(), None);
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let hub = EventHub::new();
        let dropped = hub.subscribe();
        let mut kept = hub.subscribe();
        drop(dropped);

        assert_eq!(hub.emit(&ProviderEvent::AccountsChanged(vec![])), 1);
        assert_eq!(hub.subscriber_count(), 1);
        assert_eq!(kept.try_recv(), Some(ProviderEvent::AccountsChanged(vec![])));
    }

    #[tokio::test]
    async fn test_recv_in_order() {
        let hub = EventHub::new();
        let mut sub = hub.subscribe();
        hub.emit(&ProviderEvent::ChainChanged("0x1".into()));
        hub.emit(&ProviderEvent::ChainChanged("0x2".into()));

        assert_eq!(
            sub.recv().await,
            Some(ProviderEvent::ChainChanged("0x1".into()))
        );
        assert_eq!(
            sub.recv().await,
            Some(ProviderEvent::ChainChanged("0x2".into()))
        );
    }
}
