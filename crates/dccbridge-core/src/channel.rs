//! CSP Channel Communication Protocol Types
//!
//! All inter-task communication in the bridge flows through these channel
//! message types. Transport tasks produce [`BridgeEvent`]s into a single
//! queue drained by the bridge controller; the controller feeds the serial
//! writer through the [`SerialCmd`] queue, which is the only path to the
//! serial port. This replaces the callback-driven event handling of a
//! shared-state design and guarantees serial writes never interleave.

use crate::config::ChannelConfig;
use crate::types::ClientId;

// ----------------------------------------------------------------------------
// Event: Transport → Bridge Controller
// ----------------------------------------------------------------------------

/// Events sent from transport tasks to the bridge controller
#[derive(Debug)]
pub enum BridgeEvent {
    /// A client completed its handshake and can receive broadcasts.
    ///
    /// Carries the client's outbound channel; the registry owns it from
    /// here on.
    ClientConnected {
        id: ClientId,
        outbound: ClientSender,
    },
    /// A client connection went away (close frame, error, or EOF).
    ClientDisconnected { id: ClientId },
    /// A complete text frame arrived from a client.
    ClientFrame { id: ClientId, text: String },
    /// A raw line arrived from the serial link, terminator still attached.
    SerialLine { line: String },
    /// The serial link is open and writable.
    SerialLinkUp,
    /// The serial link was lost; forwarding is suspended until it returns.
    SerialLinkDown { reason: String },
}

// ----------------------------------------------------------------------------
// Command: Bridge Controller → Serial Writer
// ----------------------------------------------------------------------------

/// Commands sent from the bridge controller to the serial link task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SerialCmd {
    /// Write one command frame to the port, followed by a line terminator.
    WriteLine { text: String },
}

// ----------------------------------------------------------------------------
// Channel Type Aliases
// ----------------------------------------------------------------------------

pub type EventSender = tokio::sync::mpsc::Sender<BridgeEvent>;
pub type EventReceiver = tokio::sync::mpsc::Receiver<BridgeEvent>;
pub type SerialCmdSender = tokio::sync::mpsc::Sender<SerialCmd>;
pub type SerialCmdReceiver = tokio::sync::mpsc::Receiver<SerialCmd>;

/// Per-client outbound payload channel (bridge → client writer task).
pub type ClientSender = tokio::sync::mpsc::Sender<String>;
pub type ClientReceiver = tokio::sync::mpsc::Receiver<String>;

// ----------------------------------------------------------------------------
// Channel Creation Utilities
// ----------------------------------------------------------------------------

/// Create the bounded event channel (Transports → Bridge Controller)
pub fn create_event_channel(config: &ChannelConfig) -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::channel(config.event_buffer_size)
}

/// Create the bounded serial command channel (Bridge Controller → Serial)
pub fn create_serial_cmd_channel(config: &ChannelConfig) -> (SerialCmdSender, SerialCmdReceiver) {
    tokio::sync::mpsc::channel(config.serial_cmd_buffer_size)
}

/// Create one client's bounded outbound channel (Bridge Controller → client)
pub fn create_client_channel(config: &ChannelConfig) -> (ClientSender, ClientReceiver) {
    tokio::sync::mpsc::channel(config.client_buffer_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn event_channel_round_trip() {
        let config = ChannelConfig::testing();
        let (tx, mut rx) = create_event_channel(&config);

        tx.send(BridgeEvent::SerialLine {
            line: "<T 1>\r\n".to_string(),
        })
        .await
        .unwrap();

        match rx.recv().await {
            Some(BridgeEvent::SerialLine { line }) => assert_eq!(line, "<T 1>\r\n"),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn serial_cmd_channel_preserves_order() {
        let config = ChannelConfig::testing();
        let (tx, mut rx) = create_serial_cmd_channel(&config);

        for i in 0..3 {
            tx.send(SerialCmd::WriteLine {
                text: format!("<t {}>", i),
            })
            .await
            .unwrap();
        }

        for i in 0..3 {
            assert_eq!(
                rx.recv().await,
                Some(SerialCmd::WriteLine {
                    text: format!("<t {}>", i),
                })
            );
        }
    }
}
