use std::collections::BTreeSet;
use std::fmt;

use uuid::Uuid;

use super::RelayError;

/// Identifies one live socket inside the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of a relay connection.
///
/// `Connected` is the initial state. The first successful subscribe moves the
/// connection to `Subscribed`; further subscribes add rooms. `Disconnected` is
/// terminal and rejects every transition.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Connected,
    Subscribed {
        rooms: BTreeSet<Uuid>,
    },
    Disconnected,
}

impl ConnectionState {
    /// Add `project_id` to this connection's rooms.
    ///
    /// Returns `Ok(false)` when the connection was already in that room.
    pub fn subscribe(&mut self, project_id: Uuid) -> Result<bool, RelayError> {
        match self {
            ConnectionState::Connected => {
                *self = ConnectionState::Subscribed {
                    rooms: BTreeSet::from([project_id]),
                };
                Ok(true)
            }
            ConnectionState::Subscribed { rooms } => Ok(rooms.insert(project_id)),
            ConnectionState::Disconnected => Err(RelayError::Disconnected),
        }
    }

    /// Move to `Disconnected`, returning the rooms the connection has left.
    pub fn disconnect(&mut self) -> BTreeSet<Uuid> {
        match std::mem::replace(self, ConnectionState::Disconnected) {
            ConnectionState::Subscribed { rooms } => rooms,
            ConnectionState::Connected | ConnectionState::Disconnected => BTreeSet::new(),
        }
    }

    #[cfg(test)]
    pub fn is_subscribed_to(&self, project_id: Uuid) -> bool {
        matches!(self, ConnectionState::Subscribed { rooms } if rooms.contains(&project_id))
    }

    #[cfg(test)]
    pub fn is_disconnected(&self) -> bool {
        matches!(self, ConnectionState::Disconnected)
    }
}
