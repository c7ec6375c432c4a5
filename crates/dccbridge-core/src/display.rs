//! Status display seam.
//!
//! The physical display is a 4-line, 20-column character panel. The core only
//! pushes short text lines at it and never depends on the push succeeding, so
//! the seam is a fire-and-forget trait. The default implementation renders
//! lines into the log stream.

/// Character width of one display line.
pub const DISPLAY_COLUMNS: usize = 20;

/// Display line carrying the product banner.
pub const LINE_BANNER: u8 = 0;
/// Display line carrying boot progress and the bound address.
pub const LINE_BOOT: u8 = 1;
/// Display line carrying client events and the last inbound frame.
pub const LINE_CLIENTS: u8 = 2;
/// Display line carrying the last outbound telemetry preview.
pub const LINE_TELEMETRY: u8 = 3;

// ----------------------------------------------------------------------------
// Status Display Trait
// ----------------------------------------------------------------------------

/// A line-oriented status display.
///
/// Implementations replace the addressed line wholesale and must not block;
/// rendering failures are the implementation's own concern and are never
/// surfaced to the bridge.
pub trait StatusDisplay: Send + Sync {
    fn set_line(&self, line: u8, header: &str, body: &str, footer: &str);
}

/// Compose one display line from its parts, bounded to the panel width.
pub fn compose_line(header: &str, body: &str, footer: &str) -> String {
    let mut line = String::with_capacity(DISPLAY_COLUMNS);
    for part in [header, body, footer] {
        for ch in part.chars() {
            if line.chars().count() >= DISPLAY_COLUMNS {
                return line;
            }
            line.push(ch);
        }
    }
    line
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

/// Default display that renders lines into the tracing stream.
#[derive(Debug, Default, Clone)]
pub struct TracingDisplay;

impl StatusDisplay for TracingDisplay {
    fn set_line(&self, line: u8, header: &str, body: &str, footer: &str) {
        tracing::info!(target: "display", line, "{}", compose_line(header, body, footer));
    }
}

/// Display that drops everything. Useful in tests that don't assert on it.
#[derive(Debug, Default, Clone)]
pub struct NullDisplay;

impl StatusDisplay for NullDisplay {
    fn set_line(&self, _line: u8, _header: &str, _body: &str, _footer: &str) {}
}
