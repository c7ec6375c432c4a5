//! Centralized Configuration Management
//!
//! This module consolidates the configuration structures used throughout the
//! bridge. Each component takes its own config struct; the CLI crate layers
//! file, environment and flag sources on top of these defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

// ----------------------------------------------------------------------------
// Channel Configuration
// ----------------------------------------------------------------------------

/// Configuration for CSP channel buffer sizes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Buffer size for the event channel (Transports → Bridge Controller)
    pub event_buffer_size: usize,
    /// Buffer size for the serial command channel (Bridge → Serial)
    pub serial_cmd_buffer_size: usize,
    /// Buffer size for each client's outbound channel (Bridge → client)
    pub client_buffer_size: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            event_buffer_size: 128,    // client frames and serial lines can be bursty
            serial_cmd_buffer_size: 64,
            client_buffer_size: 32,    // slow clients drop, they must not stall the bridge
        }
    }
}

impl ChannelConfig {
    /// Create configuration optimized for testing
    pub fn testing() -> Self {
        Self {
            event_buffer_size: 16,
            serial_cmd_buffer_size: 16,
            client_buffer_size: 16,
        }
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.event_buffer_size == 0
            || self.serial_cmd_buffer_size == 0
            || self.client_buffer_size == 0
        {
            return Err("channel buffer sizes must be greater than zero".to_string());
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Bridge Configuration
// ----------------------------------------------------------------------------

/// Configuration for the bridge controller loop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Interval between registry liveness sweeps, in milliseconds
    pub sweep_interval_ms: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            sweep_interval_ms: 1_000,
        }
    }
}

impl BridgeConfig {
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.sweep_interval_ms == 0 {
            return Err("sweep interval must be greater than zero".to_string());
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Serial Link Configuration
// ----------------------------------------------------------------------------

/// Configuration for the serial link task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerialConfig {
    /// Serial port device path (e.g. `/dev/ttyUSB0`)
    pub port: String,
    /// Baud rate; the command station side runs 115200 8-N-1
    pub baud_rate: u32,
    /// Delay before re-opening the port after a link loss, in milliseconds
    pub reconnect_delay_ms: u64,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyUSB0".to_string(),
            baud_rate: 115_200,
            reconnect_delay_ms: 1_000,
        }
    }
}

impl SerialConfig {
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.port.is_empty() {
            return Err("serial port path must not be empty".to_string());
        }
        if self.baud_rate == 0 {
            return Err("baud rate must be greater than zero".to_string());
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// WebSocket Configuration
// ----------------------------------------------------------------------------

/// Configuration for the WebSocket transport
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsConfig {
    /// Listen address for the real-time channel
    pub bind_addr: String,
    /// Maximum concurrently connected clients; further accepts are refused
    pub max_clients: usize,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8081".to_string(),
            max_clients: 64,
        }
    }
}

impl WsConfig {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.bind_addr.is_empty() {
            return Err("websocket bind address must not be empty".to_string());
        }
        if self.max_clients == 0 {
            return Err("max_clients must be greater than zero".to_string());
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// HTTP Configuration
// ----------------------------------------------------------------------------

/// Configuration for the HTTP control surface
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Listen address for the HTTP surface
    pub bind_addr: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
        }
    }
}

impl HttpConfig {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.bind_addr.is_empty() {
            return Err("http bind address must not be empty".to_string());
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Storage Configuration
// ----------------------------------------------------------------------------

/// Configuration for the blob storage facade
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory of the storage namespace
    pub root: PathBuf,
    /// Advertised total capacity of the namespace, in bytes
    pub capacity_bytes: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("data"),
            capacity_bytes: 4 * 1024 * 1024,
        }
    }
}

// ----------------------------------------------------------------------------
// Network Identity Configuration
// ----------------------------------------------------------------------------

/// Identity reported in the stats document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Name of the network the bridge is attached to
    pub hotspot: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            hotspot: "dccbridge".to_string(),
        }
    }
}
