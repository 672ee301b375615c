use futures::future::join_all;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Identifier of one registered output channel
pub type SubscriberId = Uuid;

/// Outbound half of a subscriber's channel; the session's writer task drains the other end
pub type SubscriberTx = mpsc::Sender<String>;

/// Outcome of one broadcast pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    /// Subscribers removed because delivery failed or timed out
    pub pruned: usize,
}

/// Tracks every live subscriber and fans messages out to them
pub struct ConnectionRegistry {
    subscribers: Mutex<HashMap<SubscriberId, SubscriberTx>>,
    send_timeout: Duration,
}

impl ConnectionRegistry {
    pub fn new(send_timeout: Duration) -> Self {
        Self {
            subscribers: Mutex::new(HashMap::new()),
            send_timeout,
        }
    }

    /// Add a subscriber. Returns false (and keeps the existing channel) if the id is taken.
    pub fn register(&self, id: SubscriberId, tx: SubscriberTx) -> bool {
        let mut subscribers = self.subscribers.lock();
        if subscribers.contains_key(&id) {
            warn!(subscriber = %id, "Subscriber already registered");
            return false;
        }
        subscribers.insert(id, tx);
        info!(subscriber = %id, connections = subscribers.len(), "Subscriber registered");
        true
    }

    /// Remove a subscriber; a no-op if it is already gone
    pub fn unregister(&self, id: &SubscriberId) -> bool {
        let mut subscribers = self.subscribers.lock();
        let removed = subscribers.remove(id).is_some();
        if removed {
            info!(subscriber = %id, connections = subscribers.len(), "Subscriber unregistered");
        }
        removed
    }

    pub fn contains(&self, id: &SubscriberId) -> bool {
        self.subscribers.lock().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.subscribers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver `message` to every subscriber, best effort.
    ///
    /// The subscriber list is copied out under the lock, sends run
    /// concurrently without it, and any channel that is closed or does not
    /// accept the message within `send_timeout` is removed afterwards.
    /// Failures never reach the caller.
    pub async fn broadcast(&self, message: &str) -> BroadcastReport {
        let targets: Vec<(SubscriberId, SubscriberTx)> = {
            let subscribers = self.subscribers.lock();
            subscribers
                .iter()
                .map(|(id, tx)| (*id, tx.clone()))
                .collect()
        };

        if targets.is_empty() {
            return BroadcastReport::default();
        }

        let timeout = self.send_timeout;
        let results = join_all(targets.into_iter().map(|(id, tx)| {
            let text = message.to_string();
            async move { (id, tx.send_timeout(text, timeout).await.is_ok()) }
        }))
        .await;

        let dead: Vec<SubscriberId> = results
            .iter()
            .filter(|(_, delivered)| !delivered)
            .map(|(id, _)| *id)
            .collect();
        let delivered = results.len() - dead.len();

        let mut pruned = 0;
        if !dead.is_empty() {
            let mut subscribers = self.subscribers.lock();
            for id in &dead {
                if subscribers.remove(id).is_some() {
                    pruned += 1;
                    warn!(subscriber = %id, "Dropping subscriber after failed delivery");
                }
            }
        }

        debug!(delivered = delivered, pruned = pruned, "Broadcast complete");

        BroadcastReport { delivered, pruned }
    }
}
