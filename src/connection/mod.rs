//! Connection to the device's WebSocket server
//!
//! - `manager`: sans-IO state machine (state, pending queue, flush on open)
//! - `ws`: tokio-tungstenite transport
//! - `actor` / `actor_handle`: run the manager on one tokio task

pub mod actor;
pub mod actor_handle;
pub mod manager;
pub mod ws;

use std::fmt;

pub use actor::{ConnectionActor, ConnectionCommand, ConnectionStatus};
pub use actor_handle::ConnectionHandle;
pub use manager::{ConnectionManager, Delivery, Transport};
pub use ws::WsTransport;

/// Default port of the device's WebSocket server
pub const DEFAULT_WS_PORT: u16 = 81;

/// Build the socket URL for a device host
pub fn ws_url(host: &str, port: u16) -> String {
    format!("ws://{}:{}/", host, port)
}

/// Connection lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Nothing attempted yet; `start()` has not run
    Uninitialized,
    /// Handshake in flight
    Connecting,
    Open,
    /// Closed cleanly or by error; the next submit reconnects
    Closed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionState::Uninitialized => "uninitialized",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "open",
            ConnectionState::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// Identifies one connection attempt; a reconnect gets a fresh id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle and data events reported by a transport
///
/// `unsent` holds frames the transport accepted but never wrote, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketEventKind {
    Opened,
    Closed { reason: String, unsent: Vec<String> },
    Error { message: String, unsent: Vec<String> },
    Message { text: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketEvent {
    pub connection: ConnectionId,
    pub kind: SocketEventKind,
}

impl SocketEvent {
    pub fn new(connection: ConnectionId, kind: SocketEventKind) -> Self {
        Self { connection, kind }
    }
}
