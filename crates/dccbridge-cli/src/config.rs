//! Bridge daemon configuration management
//!
//! Configuration is layered with proper priority ordering:
//! CLI args > `DCCBRIDGE_*` environment variables > config file > defaults.

use crate::cli::Cli;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use dccbridge_core::{
    BridgeConfig, ChannelConfig, HttpConfig, NetworkConfig, SerialConfig, StorageConfig, WsConfig,
};

// ----------------------------------------------------------------------------
// Application Configuration
// ----------------------------------------------------------------------------

/// Complete configuration for the bridge daemon.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Serial link settings
    pub serial: SerialConfig,
    /// WebSocket transport settings
    pub ws: WsConfig,
    /// HTTP surface settings
    pub http: HttpConfig,
    /// Blob storage settings
    pub storage: StorageConfig,
    /// Reported network identity
    pub network: NetworkConfig,
    /// CSP channel sizing
    pub channels: ChannelConfig,
    /// Bridge controller settings
    pub bridge: BridgeConfig,
}

impl AppConfig {
    /// Load configuration, layering an optional TOML file and the
    /// environment over the defaults.
    pub fn load(config_file: Option<&str>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));
        if let Some(path) = config_file {
            figment = figment.merge(Toml::file(path));
        }
        figment
            .merge(Env::prefixed("DCCBRIDGE_").split("__"))
            .extract()
    }

    /// Apply command-line overrides, the highest-priority layer.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(port) = &cli.serial_port {
            self.serial.port = port.clone();
        }
        if let Some(baud) = cli.baud {
            self.serial.baud_rate = baud;
        }
        if let Some(addr) = &cli.ws_addr {
            self.ws.bind_addr = addr.clone();
        }
        if let Some(addr) = &cli.http_addr {
            self.http.bind_addr = addr.clone();
        }
        if let Some(dir) = &cli.data_dir {
            self.storage.root = dir.into();
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        self.serial.validate()?;
        self.ws.validate()?;
        self.http.validate()?;
        self.channels.validate()?;
        self.bridge.validate()?;
        Ok(())
    }
}
