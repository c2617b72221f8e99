//! Connection manager - single logical socket with an outgoing queue
//!
//! The manager never touches the network itself. It asks a [`Transport`] to
//! open sockets and write frames, and is told about the outcome through
//! [`SocketEvent`]s. This keeps every transition synchronous and testable.
//!
//! ```text
//!  Uninitialized --start()--> Connecting --Opened--> Open
//!                                  ^                   |
//!                    submit() while Closed     Closed / Error
//!                                  |                   v
//!                                  +------------- Closed
//! ```

use std::collections::VecDeque;

use tracing::{debug, info, warn};

use super::{ConnectionId, ConnectionState, SocketEvent, SocketEventKind};
use crate::error::Result;
use crate::message::ControlMessage;

/// Socket operations the manager needs
pub trait Transport {
    /// Start opening a socket. The outcome is reported later as an event tagged with `id`.
    ///
    /// Any previous socket is superseded.
    fn connect(&mut self, url: &str, id: ConnectionId);

    /// Write one text frame on the current socket
    fn send(&mut self, frame: &str) -> Result<()>;
}

/// What `submit` did with a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    Queued,
}

/// Owns the connection state and the pending queue
pub struct ConnectionManager<T: Transport> {
    url: String,
    transport: T,
    state: ConnectionState,
    current: Option<ConnectionId>,
    next_id: u64,
    queue: VecDeque<String>,
}

impl<T: Transport> ConnectionManager<T> {
    pub fn new(url: impl Into<String>, transport: T) -> Self {
        Self {
            url: url.into(),
            transport,
            state: ConnectionState::Uninitialized,
            current: None,
            next_id: 0,
            queue: VecDeque::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Id of the most recent connection attempt
    pub fn current_connection(&self) -> Option<ConnectionId> {
        self.current
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Frames waiting to be sent, oldest first
    pub fn pending(&self) -> impl Iterator<Item = &str> {
        self.queue.iter().map(String::as_str)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Open the first connection. Only valid once, from `Uninitialized`.
    pub fn start(&mut self) -> bool {
        if self.state != ConnectionState::Uninitialized {
            warn!("Connection already started (state: {}), ignoring start", self.state);
            return false;
        }
        self.open_connection();
        true
    }

    /// Send a value change now, or queue it until the socket opens
    ///
    /// While `Closed` this also starts a new connection attempt. While
    /// `Uninitialized` the message is only queued; `start()` opens the socket.
    /// Connection problems never fail a submit; only encoding can.
    pub fn submit(&mut self, message: &ControlMessage) -> Result<Delivery> {
        let frame = message.to_frame()?;

        let delivery = match self.state {
            ConnectionState::Open => match self.transport.send(&frame) {
                Ok(()) => {
                    debug!("📤 {}", frame);
                    Delivery::Sent
                }
                Err(e) => {
                    info!("Send failed ({}), connection marked closed", e);
                    self.state = ConnectionState::Closed;
                    self.queue.push_back(frame);
                    Delivery::Queued
                }
            },
            ConnectionState::Closed => {
                self.open_connection();
                self.enqueue(frame)
            }
            ConnectionState::Connecting | ConnectionState::Uninitialized => self.enqueue(frame),
        };
        Ok(delivery)
    }

    /// Apply a transport event
    ///
    /// Frames a socket accepted but never wrote are queued again, ahead of
    /// anything queued since, even when the socket has already been replaced.
    pub fn handle_event(&mut self, mut event: SocketEvent) {
        if let SocketEventKind::Closed { unsent, .. } | SocketEventKind::Error { unsent, .. } =
            &mut event.kind
        {
            self.requeue(std::mem::take(unsent));
        }

        if self.current != Some(event.connection) {
            debug!(
                "Ignoring event from superseded connection {}: {:?}",
                event.connection, event.kind
            );
            if self.state == ConnectionState::Open {
                self.flush();
            }
            return;
        }

        match event.kind {
            SocketEventKind::Opened => self.on_open(),
            SocketEventKind::Closed { reason, .. } => {
                info!("🔌 Connection {} closed: {}", event.connection, reason);
                self.state = ConnectionState::Closed;
            }
            SocketEventKind::Error { message, .. } => {
                info!("🔌 Connection {} error: {}", event.connection, message);
                self.state = ConnectionState::Closed;
            }
            SocketEventKind::Message { text } => {
                info!("📥 Message from device: {}", text);
            }
        }
    }

    fn open_connection(&mut self) {
        self.next_id += 1;
        let id = ConnectionId(self.next_id);
        self.current = Some(id);
        self.state = ConnectionState::Connecting;
        info!("Connecting to {} (connection {})", self.url, id);
        self.transport.connect(&self.url, id);
    }

    fn enqueue(&mut self, frame: String) -> Delivery {
        debug!("Queued {} ({} pending)", frame, self.queue.len() + 1);
        self.queue.push_back(frame);
        Delivery::Queued
    }

    fn requeue(&mut self, unsent: Vec<String>) {
        if unsent.is_empty() {
            return;
        }
        info!("{} frame(s) were not written, queued again", unsent.len());
        for frame in unsent.into_iter().rev() {
            self.queue.push_front(frame);
        }
    }

    fn on_open(&mut self) {
        if self.state != ConnectionState::Connecting {
            warn!("Open event while {}, ignoring", self.state);
            return;
        }
        self.state = ConnectionState::Open;
        info!("✅ Connected to {}", self.url);
        self.flush();
    }

    /// Drain the queue in order. A failed write leaves it and everything after it queued.
    fn flush(&mut self) {
        let total = self.queue.len();
        while let Some(frame) = self.queue.front() {
            if let Err(e) = self.transport.send(frame) {
                info!(
                    "Flush interrupted ({}), {} message(s) still pending",
                    e,
                    self.queue.len()
                );
                self.state = ConnectionState::Closed;
                return;
            }
            self.queue.pop_front();
        }
        if total > 0 {
            debug!("Flushed {} queued message(s)", total);
        }
    }
}
