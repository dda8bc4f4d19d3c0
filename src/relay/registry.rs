//! In-memory room registry.
//!
//! Rooms and connections live in two `DashMap`s so that traffic for unrelated
//! projects only contends on a shard, never on a process-wide lock. Lock order
//! is connections → rooms; no code path takes a room guard and then touches
//! the connection map.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};
use uuid::Uuid;

use super::{ConnectionId, ConnectionState, DeliveryError, RelayError, ServerMessage};

/// A frame queued for one connection.
pub type Outbound = Arc<ServerMessage>;
pub type OutboxReceiver = mpsc::Receiver<Outbound>;
type OutboxSender = mpsc::Sender<Outbound>;

struct ConnectionEntry {
    state: ConnectionState,
    outbox: OutboxSender,
}

/// Outcome of a single broadcast.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub dropped: usize,
}

pub struct Relay {
    rooms: DashMap<Uuid, HashMap<ConnectionId, OutboxSender>>,
    connections: DashMap<ConnectionId, ConnectionEntry>,
    outbox_capacity: usize,
}

impl Relay {
    pub fn new(outbox_capacity: usize) -> Self {
        Self {
            rooms: DashMap::new(),
            connections: DashMap::new(),
            outbox_capacity: outbox_capacity.max(1),
        }
    }

    /// Register a new connection and hand back the receiving end of its outbox.
    pub fn connect(&self) -> (ConnectionId, OutboxReceiver) {
        let id = ConnectionId::new();
        let (outbox, rx) = mpsc::channel(self.outbox_capacity);
        self.connections.insert(
            id,
            ConnectionEntry {
                state: ConnectionState::Connected,
                outbox,
            },
        );
        debug!(connection = %id, count = self.connections.len(), "relay: connected");
        (id, rx)
    }

    /// Subscribe `conn` to the room of `project_id`.
    ///
    /// Returns `Ok(false)` if the connection was already in the room, so a
    /// repeated subscribe never causes duplicate delivery.
    pub fn subscribe(&self, conn: ConnectionId, project_id: Uuid) -> Result<bool, RelayError> {
        let mut entry = self
            .connections
            .get_mut(&conn)
            .ok_or(RelayError::UnknownConnection(conn))?;
        let added = entry.state.subscribe(project_id)?;
        if added {
            self.rooms
                .entry(project_id)
                .or_default()
                .insert(conn, entry.outbox.clone());
            debug!(connection = %conn, %project_id, "relay: joined room");
        }
        Ok(added)
    }

    /// Fan `message` out to every connection currently in the room.
    ///
    /// Enqueueing never waits. A subscriber whose outbox is full or closed is
    /// dropped from the relay; the rest of the room still gets the message.
    pub fn broadcast(&self, project_id: Uuid, message: ServerMessage) -> BroadcastReport {
        let message: Outbound = Arc::new(message);
        let mut report = BroadcastReport::default();
        let mut failed = Vec::new();

        // Exclusive room guard: concurrent broadcasts to one room enqueue in
        // the same order for every subscriber.
        if let Some(room) = self.rooms.get_mut(&project_id) {
            for (conn, outbox) in room.iter() {
                match enqueue(outbox, Arc::clone(&message)) {
                    Ok(()) => report.delivered += 1,
                    Err(e) => {
                        warn!(connection = %conn, %project_id, error = %e, "relay: delivery failed, dropping subscriber");
                        failed.push(*conn);
                    }
                }
            }
        }

        report.dropped = failed.len();
        for conn in failed {
            self.disconnect(conn);
        }
        report
    }

    /// Push a frame to a single connection.
    pub fn send_to(&self, conn: ConnectionId, message: ServerMessage) -> Result<(), RelayError> {
        let outbox = self
            .connections
            .get(&conn)
            .map(|entry| entry.outbox.clone())
            .ok_or(RelayError::UnknownConnection(conn))?;
        if let Err(e) = enqueue(&outbox, Arc::new(message)) {
            warn!(connection = %conn, error = %e, "relay: direct delivery failed, dropping connection");
            self.disconnect(conn);
            return Err(e.into());
        }
        Ok(())
    }

    /// Remove `conn` from every room. Returns `false` if it was already gone.
    pub fn disconnect(&self, conn: ConnectionId) -> bool {
        let Some((_, mut entry)) = self.connections.remove(&conn) else {
            return false;
        };
        for project_id in entry.state.disconnect() {
            if let Some(mut room) = self.rooms.get_mut(&project_id) {
                room.remove(&conn);
            }
            self.rooms.remove_if(&project_id, |_, room| room.is_empty());
        }
        debug!(connection = %conn, count = self.connections.len(), "relay: disconnected");
        true
    }

    /// Current lifecycle state; unknown connections read as `Disconnected`.
    pub fn connection_state(&self, conn: ConnectionId) -> ConnectionState {
        self.connections
            .get(&conn)
            .map(|entry| entry.state.clone())
            .unwrap_or(ConnectionState::Disconnected)
    }

    pub fn room_size(&self, project_id: Uuid) -> usize {
        self.rooms.get(&project_id).map(|room| room.len()).unwrap_or(0)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

fn enqueue(outbox: &OutboxSender, message: Outbound) -> Result<(), DeliveryError> {
    outbox.try_send(message).map_err(|e| match e {
        TrySendError::Full(_) => DeliveryError::Overflow,
        TrySendError::Closed(_) => DeliveryError::Closed,
    })
}
