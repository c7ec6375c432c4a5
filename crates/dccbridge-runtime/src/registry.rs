//! Client registry for the bridge runtime.
//!
//! Tracks the set of currently connected real-time clients and performs the
//! broadcast fan-out. The registry is owned exclusively by the bridge
//! controller task, so all mutation and iteration happens on one task and
//! needs no locking.

use dccbridge_core::{ClientId, ClientSender, ConnectionState};
use std::collections::HashMap;
use tracing::{debug, trace};

// ----------------------------------------------------------------------------
// Client Registry
// ----------------------------------------------------------------------------

/// One registered client.
#[derive(Debug)]
struct ClientEntry {
    outbound: ClientSender,
    state: ConnectionState,
}

/// The set of currently connected real-time clients.
#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: HashMap<ClientId, ClientEntry>,
    stats: RegistryStats,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a newly connected client. Admission is unconditional; any
    /// connection cap is the accepting transport's policy.
    pub fn admit(&mut self, id: ClientId, outbound: ClientSender) {
        self.stats.admitted += 1;
        self.clients.insert(
            id,
            ClientEntry {
                outbound,
                state: ConnectionState::Open,
            },
        );
        debug!(client = %id, total = self.clients.len(), "client admitted");
    }

    /// Remove a client. Evicting an absent id is a no-op.
    pub fn evict(&mut self, id: ClientId) -> bool {
        let removed = self.clients.remove(&id).is_some();
        if removed {
            self.stats.evicted += 1;
            debug!(client = %id, total = self.clients.len(), "client evicted");
        }
        removed
    }

    /// Send `payload` to every registered client.
    ///
    /// Fire-and-forget per client: a closed receiver marks that client for
    /// the next sweep, a full buffer drops the payload for that client only.
    /// Neither outcome stops the fan-out. Returns the number of clients the
    /// payload was queued for.
    pub fn broadcast(&mut self, payload: &str) -> usize {
        self.stats.broadcasts += 1;
        let mut delivered = 0;
        for (id, entry) in self.clients.iter_mut() {
            if !entry.state.is_live() {
                continue;
            }
            match entry.outbound.try_send(payload.to_string()) {
                Ok(()) => delivered += 1,
                Err(tokio::sync::mpsc::error::TrySendError::Full(_)) => {
                    self.stats.send_failures += 1;
                    trace!(client = %id, "outbound buffer full, dropping broadcast for client");
                }
                Err(tokio::sync::mpsc::error::TrySendError::Closed(_)) => {
                    self.stats.send_failures += 1;
                    entry.state = ConnectionState::Closed;
                }
            }
        }
        delivered
    }

    /// Remove clients whose connection silently became unusable.
    ///
    /// Cheap enough to run unconditionally every control-loop tick. Returns
    /// the removed identifiers.
    pub fn sweep_closed(&mut self) -> Vec<ClientId> {
        let dead: Vec<ClientId> = self
            .clients
            .iter()
            .filter(|(_, entry)| !entry.state.is_live() || entry.outbound.is_closed())
            .map(|(id, _)| *id)
            .collect();
        for id in &dead {
            self.clients.remove(id);
            self.stats.swept += 1;
        }
        if !dead.is_empty() {
            debug!(removed = dead.len(), total = self.clients.len(), "registry sweep");
        }
        dead
    }

    pub fn contains(&self, id: ClientId) -> bool {
        self.clients.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn stats(&self) -> &RegistryStats {
        &self.stats
    }
}

// ----------------------------------------------------------------------------
// Supporting Types
// ----------------------------------------------------------------------------

/// Statistics for client registry activity
#[derive(Debug, Clone, Default)]
pub struct RegistryStats {
    /// Number of clients admitted
    pub admitted: u64,
    /// Number of clients evicted on disconnect
    pub evicted: u64,
    /// Number of clients removed by the liveness sweep
    pub swept: u64,
    /// Number of broadcast fan-outs performed
    pub broadcasts: u64,
    /// Number of per-client send failures (full or closed)
    pub send_failures: u64,
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
