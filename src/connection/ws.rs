//! WebSocket transport built on tokio-tungstenite
//!
//! Each `connect` spawns a socket task that owns the stream. Frames reach it
//! through a per-connection channel; replacing the connection drops that
//! channel's sender, which makes the old task close its socket and exit.

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, trace};

use super::manager::Transport;
use super::{ConnectionId, SocketEvent, SocketEventKind};
use crate::error::{HrccError, Result};

/// Transport that talks to the device over a real WebSocket
///
/// Must be used from within a tokio runtime.
pub struct WsTransport {
    events: mpsc::UnboundedSender<SocketEvent>,
    outgoing: Option<mpsc::UnboundedSender<String>>,
}

impl WsTransport {
    /// Socket events are reported on `events`
    pub fn new(events: mpsc::UnboundedSender<SocketEvent>) -> Self {
        Self {
            events,
            outgoing: None,
        }
    }
}

impl Transport for WsTransport {
    fn connect(&mut self, url: &str, id: ConnectionId) {
        let (tx, rx) = mpsc::unbounded_channel();
        // Dropping the old sender shuts the previous socket task down
        self.outgoing = Some(tx);
        tokio::spawn(run_socket(url.to_string(), id, rx, self.events.clone()));
    }

    fn send(&mut self, frame: &str) -> Result<()> {
        let tx = self
            .outgoing
            .as_ref()
            .ok_or_else(|| HrccError::TransportUnavailable("no connection".to_string()))?;

        tx.send(frame.to_string())
            .map_err(|_| HrccError::TransportUnavailable("socket task ended".to_string()))
    }
}

/// How a socket task ended
enum SocketEnd {
    Closed(String),
    Failed(String),
    /// The manager replaced this connection
    Superseded,
}

async fn run_socket(
    url: String,
    id: ConnectionId,
    mut outgoing: mpsc::UnboundedReceiver<String>,
    events: mpsc::UnboundedSender<SocketEvent>,
) {
    let (end, in_flight) = pump(&url, id, &mut outgoing, &events).await;

    // Close before draining so no frame is accepted after the drain
    outgoing.close();
    let mut unsent: Vec<String> = in_flight.into_iter().collect();
    while let Ok(frame) = outgoing.try_recv() {
        unsent.push(frame);
    }
    if !unsent.is_empty() {
        debug!("Connection {} returning {} unsent frame(s)", id, unsent.len());
    }

    let kind = match end {
        SocketEnd::Closed(reason) => SocketEventKind::Closed { reason, unsent },
        SocketEnd::Failed(message) => SocketEventKind::Error { message, unsent },
        SocketEnd::Superseded => return,
    };
    report(&events, id, kind);
}

/// Drive one socket until it ends. Returns the frame that was being written, if any.
async fn pump(
    url: &str,
    id: ConnectionId,
    outgoing: &mut mpsc::UnboundedReceiver<String>,
    events: &mpsc::UnboundedSender<SocketEvent>,
) -> (SocketEnd, Option<String>) {
    let ws = match connect_async(url).await {
        Ok((ws, _response)) => ws,
        Err(e) => {
            return (
                SocketEnd::Failed(format!("failed to connect to {}: {}", url, e)),
                None,
            );
        }
    };
    report(events, id, SocketEventKind::Opened);

    let (mut sink, mut stream) = ws.split();

    loop {
        tokio::select! {
            frame = outgoing.recv() => match frame {
                Some(text) => {
                    if let Err(e) = sink.send(WsMessage::Text(text.clone())).await {
                        return (SocketEnd::Failed(e.to_string()), Some(text));
                    }
                }
                None => {
                    debug!("Connection {} superseded, closing socket", id);
                    let _ = sink.close().await;
                    return (SocketEnd::Superseded, None);
                }
            },
            incoming = stream.next() => match incoming {
                Some(Ok(WsMessage::Text(text))) => {
                    report(events, id, SocketEventKind::Message { text });
                }
                Some(Ok(WsMessage::Close(frame))) => {
                    let reason = frame
                        .map(|f| format!("{} {}", u16::from(f.code), f.reason))
                        .unwrap_or_else(|| "closed by peer".to_string());
                    return (SocketEnd::Closed(reason), None);
                }
                Some(Ok(other)) => {
                    trace!("Connection {} ignoring frame: {:?}", id, other);
                }
                Some(Err(e)) => return (SocketEnd::Failed(e.to_string()), None),
                None => return (SocketEnd::Closed("stream ended".to_string()), None),
            },
        }
    }
}

fn report(events: &mpsc::UnboundedSender<SocketEvent>, id: ConnectionId, kind: SocketEventKind) {
    if events.send(SocketEvent::new(id, kind)).is_err() {
        trace!("Connection {} event dropped, manager gone", id);
    }
}
