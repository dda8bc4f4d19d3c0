//! Realtime broadcast relay for project chat rooms.
//!
//! Delivery is best effort and at most once: a client that is not connected
//! when a message is broadcast never sees it over the socket and has to fetch
//! history through `GET /chat`.

mod connection;
pub mod protocol;
mod registry;
pub mod socket;

use thiserror::Error;

pub use connection::{ConnectionId, ConnectionState};
pub use protocol::{ClientMessage, ServerMessage};
pub use registry::{BroadcastReport, OutboxReceiver, Outbound, Relay};

/// A single subscriber could not take a frame.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("outbox full")]
    Overflow,
    #[error("outbox closed")]
    Closed,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RelayError {
    #[error("connection {0} is not registered")]
    UnknownConnection(ConnectionId),
    #[error("connection is disconnected")]
    Disconnected,
    #[error("delivery failed: {0}")]
    Delivery(#[from] DeliveryError),
}
