//! WebSocket-backed notifier
//!
//! Each registered user has one outbound channel drained by their socket
//! task. A newer registration replaces the older one; the older socket
//! task only unregisters if it still owns the slot.

use dashmap::DashMap;
use matching_engine::{MatchEvent, Notifier};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};
use types::ids::UserId;

struct Connection {
    id: u64,
    tx: UnboundedSender<String>,
}

/// Live user connections
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: DashMap<UserId, Connection>,
    next_id: AtomicU64,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route `user_id`'s events to `tx`; returns the connection id
    pub fn register(&self, user_id: UserId, tx: UnboundedSender<String>) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        if self
            .connections
            .insert(user_id.clone(), Connection { id, tx })
            .is_some()
        {
            debug!(%user_id, connection_id = id, "Replaced previous connection");
        } else {
            debug!(%user_id, connection_id = id, "Registered connection");
        }
        id
    }

    /// Drop `user_id`'s connection if it is still `connection_id`
    pub fn unregister(&self, user_id: &UserId, connection_id: u64) -> bool {
        let removed = self
            .connections
            .remove_if(user_id, |_, conn| conn.id == connection_id)
            .is_some();
        if removed {
            debug!(%user_id, connection_id, "Removed connection");
        }
        removed
    }
}

impl Notifier for ConnectionRegistry {
    fn try_deliver(&self, user_id: &UserId, event: &MatchEvent) -> bool {
        let payload = match serde_json::to_string(event) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(%user_id, error = %err, "Failed to encode event");
                return false;
            }
        };

        let Some(conn) = self.connections.get(user_id) else {
            return false;
        };
        if conn.tx.send(payload).is_ok() {
            return true;
        }

        // Socket task is gone; forget the dead channel
        let dead = conn.id;
        drop(conn);
        self.unregister(user_id, dead);
        false
    }
}
