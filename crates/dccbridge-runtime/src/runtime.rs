//! Bridge Runtime
//!
//! Wires transport tasks to the bridge controller and manages their
//! lifecycle. The runtime can host any number of transport implementations;
//! the serial link and the WebSocket listener are the production pair, tests
//! plug in stubs.
//!
//! Components are constructed once at startup and passed in by handle; the
//! runtime itself holds no ambient state.

use crate::bridge::BridgeTask;
use dccbridge_core::{
    create_event_channel, BridgeConfig, BridgeError, ChannelConfig, EventSender, Result,
    SerialCmdSender, SharedLinkStatus, StatusDisplay, TransportError, TransportTask,
};
use tokio::task::JoinHandle;
use tracing::{debug, info};

// ----------------------------------------------------------------------------
// Bridge Runtime
// ----------------------------------------------------------------------------

/// Orchestrates the bridge controller and its transport tasks.
pub struct BridgeRuntime {
    /// Channel sizing shared by the runtime's queues
    channel_config: ChannelConfig,
    /// Registered transport tasks (before start)
    pending_transports: Vec<Box<dyn TransportTask>>,
    /// Running transport task handles (after start)
    transport_handles: Vec<(&'static str, JoinHandle<Result<()>>)>,
    /// Bridge controller task handle
    bridge_handle: Option<JoinHandle<Result<()>>>,
    /// Event sender kept for transports registered by tests after start
    event_sender: Option<EventSender>,
    /// Running state
    running: bool,
}

impl BridgeRuntime {
    pub fn new(channel_config: ChannelConfig) -> Self {
        Self {
            channel_config,
            pending_transports: Vec::new(),
            transport_handles: Vec::new(),
            bridge_handle: None,
            event_sender: None,
            running: false,
        }
    }

    /// Register a transport task. Must be called before `start()`.
    pub fn add_transport<T: TransportTask + 'static>(&mut self, transport: T) -> Result<()> {
        if self.running {
            return Err(BridgeError::Transport(TransportError::InvalidConfiguration {
                reason: "Cannot add transports to a running runtime".to_string(),
            }));
        }
        self.pending_transports.push(Box::new(transport));
        Ok(())
    }

    /// Start the bridge controller and every registered transport.
    pub async fn start(
        &mut self,
        serial_cmds: SerialCmdSender,
        display: Box<dyn StatusDisplay>,
        link: SharedLinkStatus,
        bridge_config: BridgeConfig,
    ) -> Result<()> {
        if self.running {
            return Err(BridgeError::Transport(TransportError::InvalidConfiguration {
                reason: "Runtime already running".to_string(),
            }));
        }
        if self.pending_transports.is_empty() {
            return Err(BridgeError::Transport(TransportError::InvalidConfiguration {
                reason: "No transport tasks registered. Use add_transport() first.".to_string(),
            }));
        }

        self.channel_config
            .validate()
            .map_err(|reason| BridgeError::Configuration { reason })?;
        bridge_config
            .validate()
            .map_err(|reason| BridgeError::Configuration { reason })?;

        let (event_sender, event_receiver) = create_event_channel(&self.channel_config);

        let mut bridge = BridgeTask::new(event_receiver, serial_cmds, display, link, bridge_config);
        self.bridge_handle = Some(tokio::spawn(async move { bridge.run().await }));

        let transports = std::mem::take(&mut self.pending_transports);
        for mut transport in transports {
            let name = transport.name();
            transport.attach_events(event_sender.clone())?;
            debug!(transport = name, "starting transport task");
            let handle = tokio::spawn(async move { transport.run().await });
            self.transport_handles.push((name, handle));
        }

        self.event_sender = Some(event_sender);
        self.running = true;
        info!(
            transports = self.transport_handles.len(),
            "bridge runtime started"
        );
        Ok(())
    }

    /// Stop the bridge and all transports.
    pub async fn stop(&mut self) -> Result<()> {
        if !self.running {
            return Ok(());
        }
        self.running = false;

        for (name, handle) in self.transport_handles.drain(..) {
            debug!(transport = name, "stopping transport task");
            handle.abort();
        }
        if let Some(handle) = self.bridge_handle.take() {
            handle.abort();
        }
        self.event_sender = None;

        info!("bridge runtime stopped");
        Ok(())
    }

    /// Event sender for transports wired up outside the runtime (tests).
    pub fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

impl Drop for BridgeRuntime {
    fn drop(&mut self) {
        if self.running {
            for (_, handle) in &self.transport_handles {
                handle.abort();
            }
            if let Some(ref handle) = self.bridge_handle {
                handle.abort();
            }
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
