//! DCC Bridge Core
//!
//! This crate provides the foundational types for the DCC bridge: the frame
//! model and line codec, the CSP channel protocol connecting transport tasks
//! to the bridge controller, the storage facade used by the HTTP surface, and
//! the seam traits for transports and the status display.
//!
//! The bridge itself (event loop and client registry) lives in
//! `dccbridge-runtime`; concrete transports live in `dccbridge-serial` and
//! `dccbridge-ws`.

// ----------------------------------------------------------------------------
// Module Declarations
// ----------------------------------------------------------------------------

pub mod channel;
pub mod config;
pub mod display;
pub mod errors;
pub mod frame;
pub mod listing;
pub mod status;
pub mod storage;
pub mod transport;
pub mod types;
pub mod upload;

// ----------------------------------------------------------------------------
// Public API
// ----------------------------------------------------------------------------

pub use channel::{
    create_client_channel, create_event_channel, create_serial_cmd_channel, BridgeEvent,
    ClientReceiver, ClientSender, EventReceiver, EventSender, SerialCmd, SerialCmdReceiver,
    SerialCmdSender,
};
pub use config::{
    BridgeConfig, ChannelConfig, HttpConfig, NetworkConfig, SerialConfig, StorageConfig, WsConfig,
};
pub use display::{
    compose_line, NullDisplay, StatusDisplay, TracingDisplay, DISPLAY_COLUMNS, LINE_BANNER,
    LINE_BOOT, LINE_CLIENTS, LINE_TELEMETRY,
};
pub use errors::{BridgeError, ChannelError, Result, StorageError, TransportError};
pub use frame::{
    is_broadcastable, preview, strip_line_terminator, Frame, FrameOrigin, COMMAND_START_MARKER,
    DISPLAY_PREVIEW_CHARS,
};
pub use listing::DirectoryNode;
pub use status::{LinkStatus, SharedLinkStatus, StatusReporter, StatusSnapshot};
pub use storage::{BlobKind, BlobMeta, FsStorage, Storage};
pub use transport::TransportTask;
pub use types::{ClientId, ConnectionState};
pub use upload::UploadSink;
