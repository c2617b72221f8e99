//! ConnectionHandle - public API for the ConnectionActor
//!
//! Fire-and-forget methods for the slider path, oneshot-backed queries for
//! status.

use tokio::sync::{mpsc, oneshot};

use super::actor::{ConnectionActor, ConnectionCommand, ConnectionStatus};
use super::manager::ConnectionManager;
use super::ws::WsTransport;
use crate::message::ControlMessage;

/// Cloneable handle to a running ConnectionActor
#[derive(Clone)]
pub struct ConnectionHandle {
    cmd_tx: mpsc::UnboundedSender<ConnectionCommand>,
}

impl ConnectionHandle {
    pub fn new(cmd_tx: mpsc::UnboundedSender<ConnectionCommand>) -> Self {
        Self { cmd_tx }
    }

    /// Spawn an actor talking to `url` over a real WebSocket
    ///
    /// Nothing connects until [`start`](Self::start) is called.
    pub fn spawn_ws(url: impl Into<String>) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let manager = ConnectionManager::new(url, WsTransport::new(event_tx));
        ConnectionActor::spawn(manager, event_rx)
    }

    // =========================================================================
    // Fire-and-forget
    // =========================================================================

    /// Open the first connection
    pub fn start(&self) {
        let _ = self.cmd_tx.send(ConnectionCommand::Start);
    }

    /// Send or queue a value change
    pub fn submit(&self, message: ControlMessage) {
        let _ = self.cmd_tx.send(ConnectionCommand::Submit(message));
    }

    pub fn shutdown(&self) {
        let _ = self.cmd_tx.send(ConnectionCommand::Shutdown);
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Current state, or `None` if the actor has stopped
    pub async fn status(&self) -> Option<ConnectionStatus> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(ConnectionCommand::GetStatus { respond_to: tx })
            .ok()?;
        rx.await.ok()
    }

    /// Blocking variant of [`status`](Self::status) for non-async threads
    ///
    /// Panics if called from within an async context.
    pub fn blocking_status(&self) -> Option<ConnectionStatus> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(ConnectionCommand::GetStatus { respond_to: tx })
            .ok()?;
        rx.blocking_recv().ok()
    }
}
