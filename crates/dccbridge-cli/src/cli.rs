//! Command-line interface definitions and parsing

use clap::Parser;

#[derive(Debug, Parser)]
#[command(author, version, about = "DCC serial to WebSocket bridge", long_about = None)]
pub struct Cli {
    /// Serial port device path (e.g. /dev/ttyUSB0)
    #[arg(short = 'p', long)]
    pub serial_port: Option<String>,

    /// Serial baud rate
    #[arg(long)]
    pub baud: Option<u32>,

    /// WebSocket listen address
    #[arg(long)]
    pub ws_addr: Option<String>,

    /// HTTP listen address
    #[arg(long)]
    pub http_addr: Option<String>,

    /// Storage root directory
    #[arg(short, long)]
    pub data_dir: Option<String>,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
