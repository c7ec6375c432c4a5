//! DCC Bridge Runtime
//!
//! Hosts the bridge controller task (the single consumer of the event
//! queue), the client registry it owns, and the [`BridgeRuntime`] that wires
//! transport tasks to the controller and manages their lifecycle.

pub mod bridge;
pub mod registry;
pub mod runtime;

pub use bridge::{BridgeStats, BridgeTask};
pub use registry::{ClientRegistry, RegistryStats};
pub use runtime::BridgeRuntime;
