//! Per-ride event fan-out.
//!
//! A topic-keyed publish/subscribe registry: topic = ride id, subscriber = an
//! opaque connection. A connection registers once and receives all events for
//! the rides it has joined over a single ordered channel. Delivery is
//! best-effort and at-most-once; there is no retained log to catch up from.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::RwLock;
use tracing::debug;

use crate::model::{OrderEvent, RideId};

pub type ConnectionId = u64;

#[derive(Debug, Default)]
struct Registry {
    connections: HashMap<ConnectionId, UnboundedSender<OrderEvent>>,
    groups: HashMap<RideId, HashSet<ConnectionId>>,
}

impl Registry {
    fn drop_connection(&mut self, connection: ConnectionId) {
        self.connections.remove(&connection);
        for members in self.groups.values_mut() {
            members.remove(&connection);
        }
        self.groups.retain(|_, members| !members.is_empty());
    }
}

/// Fan-out hub for order state-change events.
#[derive(Debug, Default)]
pub struct OrderEvents {
    registry: RwLock<Registry>,
    next_connection: AtomicU64,
}

impl OrderEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a new connection and hand back its event stream. Events for
    /// every ride the connection subscribes to arrive on this one channel,
    /// in publish order per ride.
    pub async fn register(&self) -> (ConnectionId, UnboundedReceiver<OrderEvent>) {
        let connection = self.next_connection.fetch_add(1, Ordering::Relaxed) + 1;
        let (sender, receiver) = mpsc::unbounded_channel();
        self.registry.write().await.connections.insert(connection, sender);
        (connection, receiver)
    }

    /// Join the subscriber group for a ride. Unknown connections are ignored.
    pub async fn subscribe(&self, connection: ConnectionId, order_id: RideId) {
        let mut registry = self.registry.write().await;
        if !registry.connections.contains_key(&connection) {
            debug!(connection, order = order_id, "subscribe from unknown connection ignored");
            return;
        }
        registry.groups.entry(order_id).or_default().insert(connection);
    }

    /// Leave the subscriber group for a ride. Idempotent.
    pub async fn unsubscribe(&self, connection: ConnectionId, order_id: RideId) {
        let mut registry = self.registry.write().await;
        if let Some(members) = registry.groups.get_mut(&order_id) {
            members.remove(&connection);
            if members.is_empty() {
                registry.groups.remove(&order_id);
            }
        }
    }

    /// Detach a connection entirely: its channel closes and it leaves every
    /// group it had joined.
    pub async fn disconnect(&self, connection: ConnectionId) {
        self.registry.write().await.drop_connection(connection);
    }

    /// Push an event to every connection currently subscribed to its ride.
    ///
    /// Returns the number of subscribers reached. Connections whose receiving
    /// half is gone are pruned rather than reported as failures; a publish
    /// with no subscribers is a no-op.
    pub async fn publish(&self, event: OrderEvent) -> usize {
        let mut registry = self.registry.write().await;
        let subscribers: Vec<ConnectionId> = match registry.groups.get(&event.order_id) {
            Some(members) => members.iter().copied().collect(),
            None => return 0,
        };

        let mut delivered = 0;
        let mut stale = Vec::new();
        for connection in subscribers {
            match registry.connections.get(&connection) {
                Some(sender) if sender.send(event.clone()).is_ok() => delivered += 1,
                _ => stale.push(connection),
            }
        }
        for connection in stale {
            debug!(connection, order = event.order_id, "pruning closed event subscriber");
            registry.drop_connection(connection);
        }
        delivered
    }

    pub async fn subscriber_count(&self, order_id: RideId) -> usize {
        self.registry
            .read()
            .await
            .groups
            .get(&order_id)
            .map_or(0, HashSet::len)
    }
}
