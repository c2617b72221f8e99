//! ConnectionActor - runs the connection manager on a single task
//!
//! Commands from handles and events from the transport are processed one at
//! a time, so the queue and the socket handle never need a lock.
//!
//! ```text
//!  ConnectionHandle ──commands──┐
//!                               ▼
//!                      ┌──────────────────┐
//!                      │ ConnectionActor  │
//!                      │  └ manager       │──connect/send──▶ transport
//!                      └──────────────────┘
//!                               ▲
//!  socket tasks ─────events─────┘
//! ```

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, trace, warn};

use super::actor_handle::ConnectionHandle;
use super::manager::{ConnectionManager, Transport};
use super::{ConnectionState, SocketEvent};
use crate::message::ControlMessage;

/// Commands accepted by the actor
#[derive(Debug)]
pub enum ConnectionCommand {
    /// Open the first connection
    Start,
    /// Send or queue a value change
    Submit(ControlMessage),
    /// Report current state
    GetStatus {
        respond_to: oneshot::Sender<ConnectionStatus>,
    },
    /// Stop the actor
    Shutdown,
}

/// Snapshot of the manager
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionStatus {
    pub url: String,
    pub state: ConnectionState,
    pub pending: usize,
}

pub struct ConnectionActor<T: Transport> {
    manager: ConnectionManager<T>,
    cmd_rx: mpsc::UnboundedReceiver<ConnectionCommand>,
    event_rx: mpsc::UnboundedReceiver<SocketEvent>,
}

impl<T: Transport + Send + 'static> ConnectionActor<T> {
    pub fn new(
        manager: ConnectionManager<T>,
        cmd_rx: mpsc::UnboundedReceiver<ConnectionCommand>,
        event_rx: mpsc::UnboundedReceiver<SocketEvent>,
    ) -> Self {
        Self {
            manager,
            cmd_rx,
            event_rx,
        }
    }

    /// Spawn the actor on the current runtime and return a handle to it
    ///
    /// `event_rx` must receive the events of the manager's transport.
    pub fn spawn(
        manager: ConnectionManager<T>,
        event_rx: mpsc::UnboundedReceiver<SocketEvent>,
    ) -> ConnectionHandle {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let actor = Self::new(manager, cmd_rx, event_rx);
        tokio::spawn(actor.run());
        ConnectionHandle::new(cmd_tx)
    }

    pub async fn run(mut self) {
        debug!("Connection actor started for {}", self.manager.url());

        loop {
            tokio::select! {
                cmd = self.cmd_rx.recv() => match cmd {
                    Some(ConnectionCommand::Shutdown) | None => break,
                    Some(cmd) => self.handle_command(cmd),
                },
                Some(event) = self.event_rx.recv() => {
                    self.manager.handle_event(event);
                }
            }
        }

        info!(
            "Connection actor stopped ({} message(s) left unsent)",
            self.manager.queue_len()
        );
    }

    fn handle_command(&mut self, cmd: ConnectionCommand) {
        match cmd {
            ConnectionCommand::Start => {
                self.manager.start();
            }
            ConnectionCommand::Submit(message) => match self.manager.submit(&message) {
                Ok(delivery) => trace!("{} {:?}", message.name, delivery),
                Err(e) => warn!("Dropping {} update: {}", message.name, e),
            },
            ConnectionCommand::GetStatus { respond_to } => {
                let _ = respond_to.send(ConnectionStatus {
                    url: self.manager.url().to_string(),
                    state: self.manager.state(),
                    pending: self.manager.queue_len(),
                });
            }
            ConnectionCommand::Shutdown => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{ConnectionId, SocketEventKind};
    use crate::control::HrccValue;
    use crate::error::Result;
    use std::sync::{Arc, Mutex};

    /// Transport whose records stay visible after the manager moves into the actor
    #[derive(Clone, Default)]
    struct SharedTransport {
        connects: Arc<Mutex<Vec<ConnectionId>>>,
        sent: Arc<Mutex<Vec<String>>>,
    }

    impl Transport for SharedTransport {
        fn connect(&mut self, _url: &str, id: ConnectionId) {
            self.connects.lock().unwrap().push(id);
        }

        fn send(&mut self, frame: &str) -> Result<()> {
            self.sent.lock().unwrap().push(frame.to_string());
            Ok(())
        }
    }

    fn spawn() -> (
        ConnectionHandle,
        SharedTransport,
        mpsc::UnboundedSender<SocketEvent>,
    ) {
        let transport = SharedTransport::default();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let manager = ConnectionManager::new("ws://device:81/", transport.clone());
        let handle = ConnectionActor::spawn(manager, event_rx);
        (handle, transport, event_tx)
    }

    #[tokio::test]
    async fn test_start_submit_and_flush() {
        let (handle, transport, event_tx) = spawn();

        handle.start();
        handle.submit(ControlMessage::new("volume", HrccValue::new(100).unwrap()));

        let status = handle.status().await.unwrap();
        assert_eq!(status.state, ConnectionState::Connecting);
        assert_eq!(status.pending, 1);
        assert_eq!(status.url, "ws://device:81/");
        assert_eq!(*transport.connects.lock().unwrap(), vec![ConnectionId(1)]);

        event_tx
            .send(SocketEvent::new(ConnectionId(1), SocketEventKind::Opened))
            .unwrap();

        // Poll until the event is processed; commands and events share one task
        let mut status = handle.status().await.unwrap();
        for _ in 0..50 {
            if status.state == ConnectionState::Open {
                break;
            }
            tokio::task::yield_now().await;
            status = handle.status().await.unwrap();
        }

        assert_eq!(status.state, ConnectionState::Open);
        assert_eq!(status.pending, 0);
        assert_eq!(
            *transport.sent.lock().unwrap(),
            vec![r#"{"name":"volume","hrcc_value":100}"#.to_string()]
        );
    }

    #[tokio::test]
    async fn test_shutdown_stops_actor() {
        let (handle, _transport, _event_tx) = spawn();
        handle.shutdown();

        for _ in 0..50 {
            if handle.status().await.is_none() {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("actor still running after shutdown");
    }
}
