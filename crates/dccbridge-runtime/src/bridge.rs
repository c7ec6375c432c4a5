//! Bridge Controller Task Implementation
//!
//! The single consumer of the bridge event queue. It owns the client
//! registry, forwards marker-framed client frames to the serial writer,
//! broadcasts serial lines to all registered clients, and drives the status
//! display for both directions. One task, one queue: connect/disconnect and
//! message handling are serialized by construction, so serial writes never
//! interleave and the client set needs no locking.

use crate::registry::ClientRegistry;
use dccbridge_core::{
    display::{LINE_CLIENTS, LINE_TELEMETRY},
    frame::{is_broadcastable, preview, strip_line_terminator},
    BridgeConfig, BridgeError, BridgeEvent, ChannelError, ClientId, ClientSender, EventReceiver,
    Frame, Result, SerialCmd, SerialCmdSender, SharedLinkStatus, StatusDisplay,
};
use tracing::{debug, info, warn};

// ----------------------------------------------------------------------------
// Bridge Controller Task
// ----------------------------------------------------------------------------

/// The bridge controller task that processes all transport events.
pub struct BridgeTask {
    /// Clients currently eligible for broadcasts (exclusively owned)
    registry: ClientRegistry,
    /// Channel for receiving events from transport tasks
    events: EventReceiver,
    /// Channel for sending write commands to the serial task
    serial_cmds: SerialCmdSender,
    /// Status display collaborator; failures are its own concern
    display: Box<dyn StatusDisplay>,
    /// Shared link-health state read by the status reporter
    link: SharedLinkStatus,
    /// Loop configuration
    config: BridgeConfig,
    /// Whether the serial link is currently writable
    serial_up: bool,
    /// Counters
    stats: BridgeStats,
    /// Whether the task should continue running
    running: bool,
}

impl BridgeTask {
    pub fn new(
        events: EventReceiver,
        serial_cmds: SerialCmdSender,
        display: Box<dyn StatusDisplay>,
        link: SharedLinkStatus,
        config: BridgeConfig,
    ) -> Self {
        Self {
            registry: ClientRegistry::new(),
            events,
            serial_cmds,
            display,
            link,
            config,
            serial_up: false,
            stats: BridgeStats::default(),
            running: true,
        }
    }

    /// Run the main bridge loop.
    ///
    /// Returns when the event channel closes (all transports gone) or when
    /// the serial command channel closes underneath us, which means the
    /// serial task died rather than merely losing its link.
    pub async fn run(&mut self) -> Result<()> {
        info!("Bridge controller starting");

        let mut sweep = tokio::time::interval(self.config.sweep_interval());
        sweep.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        while self.running {
            tokio::select! {
                event = self.events.recv() => {
                    match event {
                        Some(event) => {
                            if let Err(e) = self.process_event(event).await {
                                match e {
                                    // Unrecoverable: the serial task is gone.
                                    BridgeError::Channel(ChannelError::Closed) => {
                                        warn!("Serial command channel closed, shutting down bridge");
                                        self.running = false;
                                    }
                                    // Everything else is per-frame and already logged.
                                    _ => {}
                                }
                            }
                        }
                        None => {
                            info!("Event channel closed, shutting down bridge");
                            break;
                        }
                    }
                }
                _ = sweep.tick() => {
                    self.sweep().await;
                }
            }
        }

        info!("Bridge controller stopped");
        Ok(())
    }

    /// Stop the bridge loop at the next iteration.
    pub fn stop(&mut self) {
        self.running = false;
    }

    async fn process_event(&mut self, event: BridgeEvent) -> Result<()> {
        self.stats.events_processed += 1;
        match event {
            BridgeEvent::ClientConnected { id, outbound } => {
                self.handle_connected(id, outbound).await
            }
            BridgeEvent::ClientDisconnected { id } => self.handle_disconnected(id).await,
            BridgeEvent::ClientFrame { id, text } => return self.handle_client_frame(id, text),
            BridgeEvent::SerialLine { line } => self.handle_serial_line(line),
            BridgeEvent::SerialLinkUp => self.handle_serial_link(true, None).await,
            BridgeEvent::SerialLinkDown { reason } => {
                self.handle_serial_link(false, Some(reason)).await
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Client → Serial path
    // ------------------------------------------------------------------------

    /// Stateless per frame: forward iff the first byte is the command start
    /// marker; the display preview happens for every frame regardless.
    fn handle_client_frame(&mut self, id: ClientId, text: String) -> Result<()> {
        self.stats.client_frames += 1;
        let frame = Frame::client(id, text);

        // Display truncation never affects what goes on the wire.
        self.display
            .set_line(LINE_CLIENTS, "S: ", preview(&frame.text), "");

        if !frame.is_forwardable() {
            self.stats.frames_filtered += 1;
            return Ok(());
        }

        if !self.serial_up {
            self.stats.frames_dropped_link_down += 1;
            debug!(client = %id, "serial link down, dropping command frame");
            return Ok(());
        }

        match self.serial_cmds.try_send(SerialCmd::WriteLine { text: frame.text }) {
            Ok(()) => {
                self.stats.frames_forwarded += 1;
                Ok(())
            }
            Err(tokio::sync::mpsc::error::TrySendError::Full(_)) => {
                // Never block a client callback on serial backpressure.
                self.stats.frames_dropped_backpressure += 1;
                warn!(client = %id, "serial command queue full, dropping frame");
                Ok(())
            }
            Err(tokio::sync::mpsc::error::TrySendError::Closed(_)) => {
                Err(BridgeError::Channel(ChannelError::Closed))
            }
        }
    }

    // ------------------------------------------------------------------------
    // Serial → Client path
    // ------------------------------------------------------------------------

    /// Strip the terminator, broadcast the full line iff non-trivial, and
    /// display a bounded preview.
    fn handle_serial_line(&mut self, line: String) {
        let stripped = strip_line_terminator(&line);
        if !is_broadcastable(stripped) {
            self.stats.lines_dropped += 1;
            return;
        }

        // Full, untruncated payload in one fan-out per line.
        let delivered = self.registry.broadcast(stripped);
        self.stats.lines_broadcast += 1;
        debug!(delivered, "serial line broadcast");

        self.display
            .set_line(LINE_TELEMETRY, "R: ", preview(stripped), "");
    }

    // ------------------------------------------------------------------------
    // Lifecycle events
    // ------------------------------------------------------------------------

    async fn handle_connected(&mut self, id: ClientId, outbound: ClientSender) {
        self.registry.admit(id, outbound);
        self.display
            .set_line(LINE_CLIENTS, "Client connected: ", &id.to_string(), "");
        self.publish_client_count().await;
    }

    async fn handle_disconnected(&mut self, id: ClientId) {
        self.registry.evict(id);
        self.display
            .set_line(LINE_CLIENTS, "Client disconnected: ", &id.to_string(), "");
        self.publish_client_count().await;
    }

    async fn handle_serial_link(&mut self, up: bool, reason: Option<String>) {
        self.serial_up = up;
        if up {
            info!("serial link up");
            self.display.set_line(LINE_TELEMETRY, "E: ", "link ready", "");
        } else {
            warn!(reason = reason.as_deref().unwrap_or("unknown"), "serial link down");
            self.display.set_line(LINE_TELEMETRY, "E: ", "link lost", "");
        }
        self.link.write().await.serial_up = up;
    }

    async fn sweep(&mut self) {
        self.registry.sweep_closed();
        self.publish_client_count().await;
    }

    async fn publish_client_count(&self) {
        self.link.write().await.connected_clients = self.registry.len();
    }

    /// Current statistics.
    pub fn stats(&self) -> &BridgeStats {
        &self.stats
    }

    /// Number of currently registered clients.
    pub fn client_count(&self) -> usize {
        self.registry.len()
    }
}

// ----------------------------------------------------------------------------
// Supporting Types
// ----------------------------------------------------------------------------

/// Statistics for the bridge controller
#[derive(Debug, Clone, Default)]
pub struct BridgeStats {
    /// Total events drained from the queue
    pub events_processed: u64,
    /// Client frames received
    pub client_frames: u64,
    /// Client frames written to the serial queue
    pub frames_forwarded: u64,
    /// Client frames dropped by the start-marker filter
    pub frames_filtered: u64,
    /// Client frames dropped while the serial link was down
    pub frames_dropped_link_down: u64,
    /// Client frames dropped because the serial queue was full
    pub frames_dropped_backpressure: u64,
    /// Serial lines broadcast to clients
    pub lines_broadcast: u64,
    /// Serial lines dropped as trivial (length <= 1 after stripping)
    pub lines_dropped: u64,
}
