//! Error types for the DCC bridge.
//!
//! This module contains all error types used throughout the bridge core:
//! transport errors, storage errors, channel errors, and the top-level
//! `BridgeError` that unifies them.

// ----------------------------------------------------------------------------
// Specific Error Types
// ----------------------------------------------------------------------------

/// Specific transport error types
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Failed to bind {addr}: {reason}")]
    BindFailed { addr: String, reason: String },
    #[error("Serial port {port} unavailable: {reason}")]
    SerialUnavailable { port: String, reason: String },
    #[error("Network I/O error: {0}")]
    NetworkIo(#[from] std::io::Error),
    #[error("WebSocket handshake failed: {reason}")]
    HandshakeFailed { reason: String },
    #[error("Invalid transport configuration: {reason}")]
    InvalidConfiguration { reason: String },
    #[error("Transport shutdown: {reason}")]
    Shutdown { reason: String },
}

/// Specific storage error types
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Blob not found: {path}")]
    NotFound { path: String },
    #[error("Invalid blob name: {name}")]
    InvalidName { name: String },
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Upload already completed")]
    UploadClosed,
}

/// Errors raised by the CSP channel layer
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Channel buffer is full")]
    Full,
    #[error("Channel is closed")]
    Closed,
}

// ----------------------------------------------------------------------------
// Top-level Error
// ----------------------------------------------------------------------------

/// Unified error type for the bridge
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("Invalid configuration: {reason}")]
    Configuration { reason: String },
}

pub type Result<T> = std::result::Result<T, BridgeError>;
