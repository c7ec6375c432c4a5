//! Serial link transport task for the DCC bridge.
//!
//! Owns the serial port exclusively. Inbound bytes are reassembled into
//! line-delimited frames and forwarded raw to the bridge controller (the
//! controller owns terminator stripping and filtering); outbound command
//! frames arrive over the single serial command queue and are written with a
//! trailing line terminator, so writes never interleave.
//!
//! Link loss is steady-state behavior, not an error: the task reports
//! `SerialLinkDown`, keeps retrying the port with a fixed delay, and reports
//! `SerialLinkUp` when the port comes back.

use dccbridge_core::{
    BridgeError, BridgeEvent, EventSender, Result, SerialCmd, SerialCmdReceiver, SerialConfig,
    TransportError, TransportTask,
};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio_serial::SerialPortBuilderExt;
use tracing::{debug, info, warn};

// ----------------------------------------------------------------------------
// Serial Link Task
// ----------------------------------------------------------------------------

/// Transport task driving the serial port.
pub struct SerialLinkTask {
    config: SerialConfig,
    events: Option<EventSender>,
    commands: SerialCmdReceiver,
}

impl SerialLinkTask {
    /// Create the task. `commands` is the receiving end of the single write
    /// queue; handing it over here makes this task the port's only writer.
    pub fn new(config: SerialConfig, commands: SerialCmdReceiver) -> Self {
        Self {
            config,
            events: None,
            commands,
        }
    }
}

#[async_trait::async_trait]
impl TransportTask for SerialLinkTask {
    fn attach_events(&mut self, events: EventSender) -> Result<()> {
        self.events = Some(events);
        Ok(())
    }

    async fn run(&mut self) -> Result<()> {
        let events = self.events.take().ok_or_else(|| {
            BridgeError::Transport(TransportError::InvalidConfiguration {
                reason: "Serial task started without an event channel".to_string(),
            })
        })?;

        let mut down_reported = false;
        loop {
            let builder = tokio_serial::new(&self.config.port, self.config.baud_rate)
                .data_bits(tokio_serial::DataBits::Eight)
                .parity(tokio_serial::Parity::None)
                .stop_bits(tokio_serial::StopBits::One)
                .flow_control(tokio_serial::FlowControl::None);

            let stream = match builder.open_native_async() {
                Ok(stream) => stream,
                Err(e) => {
                    if !down_reported {
                        down_reported = true;
                        warn!(port = %self.config.port, error = %e, "serial port unavailable");
                        if events
                            .send(BridgeEvent::SerialLinkDown {
                                reason: e.to_string(),
                            })
                            .await
                            .is_err()
                        {
                            return Ok(());
                        }
                    }
                    tokio::time::sleep(self.config.reconnect_delay()).await;
                    continue;
                }
            };

            info!(port = %self.config.port, baud = self.config.baud_rate, "serial port open");
            down_reported = false;
            if events.send(BridgeEvent::SerialLinkUp).await.is_err() {
                return Ok(());
            }

            let (reader, writer) = tokio::io::split(stream);
            match drive_link(reader, writer, &events, &mut self.commands).await {
                LinkExit::Shutdown => {
                    debug!("serial command channel closed, stopping");
                    return Ok(());
                }
                LinkExit::LinkLost(reason) => {
                    warn!(reason = %reason, "serial link lost");
                    if events
                        .send(BridgeEvent::SerialLinkDown { reason })
                        .await
                        .is_err()
                    {
                        return Ok(());
                    }
                    tokio::time::sleep(self.config.reconnect_delay()).await;
                }
            }
        }
    }

    fn name(&self) -> &'static str {
        "serial"
    }
}

// ----------------------------------------------------------------------------
// Session Loop
// ----------------------------------------------------------------------------

/// Why one port session ended.
#[derive(Debug, PartialEq, Eq)]
enum LinkExit {
    /// The medium failed; reopen and continue.
    LinkLost(String),
    /// Our channels closed; the process is going down.
    Shutdown,
}

/// Drive one open link: concurrent line reassembly and command draining.
///
/// Generic over the byte stream so tests can run it over an in-memory pipe.
async fn drive_link<R, W>(
    reader: R,
    mut writer: W,
    events: &EventSender,
    commands: &mut SerialCmdReceiver,
) -> LinkExit
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let read_side = async {
        let mut lines = BufReader::new(reader);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match lines.read_until(b'\n', &mut buf).await {
                Ok(0) => return LinkExit::LinkLost("end of stream".to_string()),
                Ok(_) => {
                    // Tolerate stray bytes: the payload is opaque text anyway.
                    let line = String::from_utf8_lossy(&buf).into_owned();
                    if events.send(BridgeEvent::SerialLine { line }).await.is_err() {
                        return LinkExit::Shutdown;
                    }
                }
                Err(e) => return LinkExit::LinkLost(e.to_string()),
            }
        }
    };

    let write_side = async {
        loop {
            match commands.recv().await {
                Some(SerialCmd::WriteLine { text }) => {
                    if let Err(e) = write_frame(&mut writer, &text).await {
                        return LinkExit::LinkLost(e.to_string());
                    }
                }
                None => return LinkExit::Shutdown,
            }
        }
    };

    tokio::select! {
        exit = read_side => exit,
        exit = write_side => exit,
    }
}

/// Write one command frame followed by the line terminator.
async fn write_frame<W: AsyncWrite + Unpin>(writer: &mut W, text: &str) -> std::io::Result<()> {
    writer.write_all(text.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
