//! Transport Task Trait Definition
//!
//! Defines the common interface for transport tasks in the bridge
//! architecture. Concrete implementations live in their respective crates
//! (`dccbridge-serial`, `dccbridge-ws`).
//!
//! Each transport task:
//! - runs independently with its own async event loop via `run()`
//! - sends [`BridgeEvent`]s to the bridge controller over the attached channel
//! - owns its medium exclusively (the serial port, the listening socket)
//! - is spawned and aborted by the `BridgeRuntime`

use crate::channel::EventSender;
use crate::errors::Result;

// ----------------------------------------------------------------------------
// Transport Task Trait
// ----------------------------------------------------------------------------

/// Common interface for transport tasks.
#[async_trait::async_trait]
pub trait TransportTask: Send {
    /// Attach the event channel created by the runtime.
    ///
    /// Implementations must store the handle and use it for all communication
    /// with the bridge controller.
    fn attach_events(&mut self, events: EventSender) -> Result<()>;

    /// Run the transport's main event loop.
    ///
    /// The future runs until shutdown (its channels close) or a fatal setup
    /// error. Steady-state medium loss is the transport's own concern: it
    /// reports link events and retries rather than returning.
    async fn run(&mut self) -> Result<()>;

    /// Short identifier used in logs.
    fn name(&self) -> &'static str;
}
