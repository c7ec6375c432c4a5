//! Fundamental identifier and state types shared across the bridge.

use serde::{Deserialize, Serialize};
use std::fmt;

// ----------------------------------------------------------------------------
// Client Identifier
// ----------------------------------------------------------------------------

/// Process-lifetime-unique identifier for one real-time client connection.
///
/// Identifiers are allocated from a monotonically increasing counter by the
/// accepting transport. They are never reused within a process, and consumers
/// must not assume density.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClientId(u64);

impl ClientId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ----------------------------------------------------------------------------
// Connection State
// ----------------------------------------------------------------------------

/// Lifecycle state of one registered client connection.
///
/// Transitions are one-way: `Connecting → Open → Closing → Closed`. The
/// registry only ever observes `Open` and `Closed` in steady state; the
/// intermediate states exist for transports that report handshake progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closing,
    Closed,
}

impl ConnectionState {
    /// Whether broadcasts should still be attempted for this client.
    pub fn is_live(&self) -> bool {
        matches!(self, ConnectionState::Connecting | ConnectionState::Open)
    }
}
