//! WebSocket transport task for the DCC bridge.
//!
//! Accepts persistent client connections on one endpoint. Each connection
//! gets a process-lifetime-unique [`ClientId`] and a pair of tasks' worth of
//! plumbing folded into a single select loop: inbound text frames become
//! `ClientFrame` events, and broadcast payloads queued by the registry are
//! written back out. One websocket text message is one frame; there is no
//! sub-protocol.
//!
//! Admission policy: the client registry itself is unbounded, so this
//! transport enforces the connection cap. Sockets accepted above
//! `max_clients` are dropped before the handshake completes.

use dccbridge_core::{
    create_client_channel, BridgeError, BridgeEvent, ChannelConfig, ClientId, EventSender, Result,
    TransportError, TransportTask, WsConfig,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, info, warn};

// ----------------------------------------------------------------------------
// WebSocket Transport Task
// ----------------------------------------------------------------------------

/// Transport task accepting real-time clients over WebSocket.
pub struct WsTransportTask {
    config: WsConfig,
    channels: ChannelConfig,
    events: Option<EventSender>,
}

impl WsTransportTask {
    pub fn new(config: WsConfig, channels: ChannelConfig) -> Self {
        Self {
            config,
            channels,
            events: None,
        }
    }
}

#[async_trait::async_trait]
impl TransportTask for WsTransportTask {
    fn attach_events(&mut self, events: EventSender) -> Result<()> {
        self.events = Some(events);
        Ok(())
    }

    async fn run(&mut self) -> Result<()> {
        let events = self.events.take().ok_or_else(|| {
            BridgeError::Transport(TransportError::InvalidConfiguration {
                reason: "WebSocket task started without an event channel".to_string(),
            })
        })?;

        // Bind failure is fatal to startup, not a steady-state condition.
        let listener = TcpListener::bind(&self.config.bind_addr).await.map_err(|e| {
            BridgeError::Transport(TransportError::BindFailed {
                addr: self.config.bind_addr.clone(),
                reason: e.to_string(),
            })
        })?;
        info!(addr = %self.config.bind_addr, "websocket listener ready");

        accept_loop(listener, events, self.config.clone(), self.channels.clone()).await
    }

    fn name(&self) -> &'static str {
        "websocket"
    }
}

// ----------------------------------------------------------------------------
// Accept Loop
// ----------------------------------------------------------------------------

/// Accept clients on an already-bound listener.
///
/// Split out from [`TransportTask::run`] so tests can bind an ephemeral port
/// themselves.
pub async fn accept_loop(
    listener: TcpListener,
    events: EventSender,
    config: WsConfig,
    channels: ChannelConfig,
) -> Result<()> {
    let active = Arc::new(AtomicUsize::new(0));
    let mut next_id: u64 = 1;

    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!(error = %e, "accept failed");
                continue;
            }
        };

        if active.load(Ordering::Acquire) >= config.max_clients {
            warn!(%peer, max = config.max_clients, "connection cap reached, refusing client");
            drop(stream);
            continue;
        }

        let id = ClientId::new(next_id);
        next_id += 1;

        active.fetch_add(1, Ordering::AcqRel);
        let events = events.clone();
        let active = active.clone();
        let channels = channels.clone();
        tokio::spawn(async move {
            serve_client(stream, id, events, &channels).await;
            active.fetch_sub(1, Ordering::AcqRel);
        });
    }
}

/// Drive one client connection from handshake to disconnect.
async fn serve_client(
    stream: TcpStream,
    id: ClientId,
    events: EventSender,
    channels: &ChannelConfig,
) {
    let ws = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            debug!(client = %id, error = %e, "websocket handshake failed");
            return;
        }
    };
    let (mut sink, mut source) = ws.split();

    let (outbound, mut broadcasts) = create_client_channel(channels);
    if events
        .send(BridgeEvent::ClientConnected { id, outbound })
        .await
        .is_err()
    {
        return;
    }
    debug!(client = %id, "client connected");

    loop {
        tokio::select! {
            message = source.next() => match message {
                Some(Ok(Message::Text(text))) => {
                    if events.send(BridgeEvent::ClientFrame { id, text }).await.is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Ping(payload))) => {
                    if sink.send(Message::Pong(payload)).await.is_err() {
                        break;
                    }
                }
                // Binary and pong frames carry no bridge semantics.
                Some(Ok(Message::Binary(_) | Message::Pong(_) | Message::Frame(_))) => {}
                Some(Ok(Message::Close(_))) | None => break,
                Some(Err(e)) => {
                    debug!(client = %id, error = %e, "websocket read failed");
                    break;
                }
            },
            payload = broadcasts.recv() => match payload {
                Some(text) => {
                    if sink.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                // The registry dropped our sender: we were evicted.
                None => break,
            },
        }
    }

    let _ = sink.close().await;
    let _ = events.send(BridgeEvent::ClientDisconnected { id }).await;
    debug!(client = %id, "client disconnected");
}
