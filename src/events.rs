//! Fan-out of conversation events to live subscribers.
//!
//! Each subscriber owns the receiving end of an unbounded channel; the only
//! strong sender lives in the registry. [`EventBroadcaster::broadcast`]
//! serializes the event once, snapshots the registered senders under the
//! registry lock, releases the lock, then enqueues on every snapshotted
//! channel. A subscriber unregisters itself when dropped.

use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender, WeakUnboundedSender};

use crate::conversation::types::{now_timestamp, ConversationRecord};

type Registry = Mutex<Vec<UnboundedSender<String>>>;

fn lock(registry: &Registry) -> MutexGuard<'_, Vec<UnboundedSender<String>>> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

fn remove(registry: &Registry, handle: &WeakUnboundedSender<String>) -> bool {
    // Every strong sender lives in the registry; if none is left the channel is already gone.
    let Some(tx) = handle.upgrade() else {
        return false;
    };
    let mut senders = lock(registry);
    let before = senders.len();
    senders.retain(|s| !s.same_channel(&tx));
    senders.len() != before
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    NewConversation,
    Connected,
}

/// Wire event: `{"type": ..., "data": ..., "timestamp": ...}`.
#[derive(Debug, Clone, Serialize)]
pub struct BroadcastEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    pub timestamp: String,
}

impl BroadcastEvent {
    pub fn new_conversation(record: &ConversationRecord) -> Self {
        Self {
            kind: EventKind::NewConversation,
            data: serde_json::to_value(record).ok(),
            timestamp: now_timestamp(),
        }
    }

    pub fn connected() -> Self {
        Self {
            kind: EventKind::Connected,
            data: None,
            timestamp: now_timestamp(),
        }
    }
}

/// Registry of subscriber channels. Cloning shares the registry.
#[derive(Clone, Default)]
pub struct EventBroadcaster {
    subscribers: Arc<Registry>,
}

impl EventBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self) -> Subscriber {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tx.downgrade();
        lock(&self.subscribers).push(tx);
        tracing::debug!("event subscriber registered");
        Subscriber {
            handle,
            rx,
            registry: Arc::downgrade(&self.subscribers),
        }
    }

    /// Remove `subscriber` from the registry. No-op if already removed.
    pub fn unregister(&self, subscriber: &Subscriber) {
        if remove(&self.subscribers, &subscriber.handle) {
            tracing::debug!("event subscriber unregistered");
        }
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.subscribers).len()
    }

    /// Deliver `event` to every subscriber registered at call time.
    ///
    /// Returns how many channels accepted the message. Never fails: a
    /// serialization error is logged and nothing is sent.
    pub fn broadcast<T: Serialize + ?Sized>(&self, event: &T) -> usize {
        let message = match serde_json::to_string(event) {
            Ok(message) => message,
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize broadcast event");
                return 0;
            }
        };

        let snapshot = lock(&self.subscribers).clone();

        let delivered = snapshot
            .iter()
            .filter(|tx| tx.send(message.clone()).is_ok())
            .count();
        tracing::debug!(delivered, subscribers = snapshot.len(), "event broadcast");
        delivered
    }

    pub fn broadcast_conversation(&self, record: &ConversationRecord) -> usize {
        self.broadcast(&BroadcastEvent::new_conversation(record))
    }
}

/// One live subscription. Dropping it unregisters it.
pub struct Subscriber {
    handle: WeakUnboundedSender<String>,
    rx: UnboundedReceiver<String>,
    registry: Weak<Registry>,
}

impl Subscriber {
    /// Wait for the next serialized event.
    ///
    /// Returns `None` only once the subscriber has been unregistered and its
    /// queue drained.
    pub async fn recv(&mut self) -> Option<String> {
        self.rx.recv().await
    }

    /// Take the next queued event without waiting.
    pub fn try_recv(&mut self) -> Option<String> {
        self.rx.try_recv().ok()
    }
}

impl Drop for Subscriber {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            if remove(&registry, &self.handle) {
                tracing::debug!("event subscriber dropped");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fan_out_reaches_every_subscriber() {
        let events = EventBroadcaster::new();
        let mut subs: Vec<Subscriber> = (0..3).map(|_| events.register()).collect();

        assert_eq!(events.broadcast(&json!({"type": "x"})), 3);

        let received: Vec<String> = subs.iter_mut().map(|s| s.try_recv().unwrap()).collect();
        assert!(received.iter().all(|m| m == &received[0]));
        assert_eq!(received[0], r#"{"type":"x"}"#);
        for sub in &mut subs {
            assert!(sub.try_recv().is_none());
        }
    }

    #[test]
    fn unregistered_subscriber_receives_nothing() {
        let events = EventBroadcaster::new();
        let mut kept = events.register();
        let mut removed = events.register();

        events.unregister(&removed);
        events.unregister(&removed);
        assert_eq!(events.subscriber_count(), 1);

        assert_eq!(events.broadcast(&json!({"type": "x"})), 1);
        assert!(kept.try_recv().is_some());
        assert!(removed.try_recv().is_none());
    }

    #[test]
    fn drop_unregisters() {
        let events = EventBroadcaster::new();
        let sub = events.register();
        assert_eq!(events.subscriber_count(), 1);
        drop(sub);
        assert_eq!(events.subscriber_count(), 0);
        assert_eq!(events.broadcast(&json!({"type": "x"})), 0);
    }

    #[test]
    fn conversation_event_carries_record() {
        let events = EventBroadcaster::new();
        let mut sub = events.register();
        let record = ConversationRecord {
            id: 7,
            timestamp: now_timestamp(),
            role: "user".into(),
            content: "hello".into(),
            metadata: None,
        };

        events.broadcast_conversation(&record);

        let message: serde_json::Value = serde_json::from_str(&sub.try_recv().unwrap()).unwrap();
        assert_eq!(message["type"], "new_conversation");
        assert_eq!(message["data"]["id"], 7);
        assert_eq!(message["data"]["content"], "hello");
        assert!(message["timestamp"].is_string());
    }

    #[test]
    fn connected_event_has_no_data() {
        let value = serde_json::to_value(BroadcastEvent::connected()).unwrap();
        assert_eq!(value["type"], "connected");
        assert!(value.get("data").is_none());
    }

    #[tokio::test]
    async fn recv_waits_for_next_event() {
        let events = EventBroadcaster::new();
        let mut sub = events.register();

        let sender = events.clone();
        tokio::spawn(async move {
            tokio::task::yield_now().await;
            sender.broadcast(&json!({"type": "later"}));
        });

        assert_eq!(sub.recv().await.as_deref(), Some(r#"{"type":"later"}"#));
    }

    #[tokio::test]
    async fn recv_ends_after_unregister() {
        let events = EventBroadcaster::new();
        let mut sub = events.register();
        events.broadcast(&json!({"type": "queued"}));
        events.unregister(&sub);

        assert!(sub.recv().await.is_some());
        assert!(sub.recv().await.is_none());
    }
}
