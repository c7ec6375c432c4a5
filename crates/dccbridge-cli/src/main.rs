//! DCC bridge daemon entry point

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};

use dccbridge_cli::{cli::Cli, config::AppConfig};
use dccbridge_core::{
    create_serial_cmd_channel, display::{LINE_BANNER, LINE_BOOT}, FsStorage, LinkStatus,
    StatusDisplay, Storage, TracingDisplay,
};
use dccbridge_http as http;
use dccbridge_runtime::BridgeRuntime;
use dccbridge_serial::SerialLinkTask;
use dccbridge_ws::WsTransportTask;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    setup_logging(cli.verbose);

    // Load configuration
    let mut config = load_configuration(&cli)?;
    config.apply_cli(&cli);
    if let Err(reason) = config.validate() {
        error!("Invalid configuration: {}", reason);
        std::process::exit(1);
    }

    let display = TracingDisplay;
    display.set_line(LINE_BANNER, "DCC Bridge ", env!("CARGO_PKG_VERSION"), "");
    display.set_line(LINE_BOOT, "Starting..", "", "");

    // Storage failure at boot is fatal: the HTTP surface cannot run without it.
    let storage = Arc::new(
        FsStorage::open(config.storage.root.clone(), config.storage.capacity_bytes).await?,
    );
    let storage_dyn: Arc<dyn Storage> = storage.clone();

    // Shared link status, seeded with the configured identity.
    let link = LinkStatus::new(&config.network.hotspot, &config.http.bind_addr).shared();

    // Wire the bridge: one write queue to the serial task, one event queue in.
    let (serial_cmds, serial_cmd_rx) = create_serial_cmd_channel(&config.channels);
    let mut runtime = BridgeRuntime::new(config.channels.clone());
    runtime.add_transport(SerialLinkTask::new(config.serial.clone(), serial_cmd_rx))?;
    runtime.add_transport(WsTransportTask::new(
        config.ws.clone(),
        config.channels.clone(),
    ))?;

    info!(
        serial = %config.serial.port,
        ws = %config.ws.bind_addr,
        http = %config.http.bind_addr,
        "starting bridge"
    );
    runtime
        .start(
            serial_cmds,
            Box::new(display.clone()),
            link.clone(),
            config.bridge.clone(),
        )
        .await?;

    // HTTP surface runs beside the bridge and never blocks it.
    let app = http::router(storage_dyn, link, storage.root().to_path_buf());
    let http_config = config.http.clone();
    let http_handle = tokio::spawn(async move {
        if let Err(e) = http::serve(&http_config, app).await {
            error!("HTTP surface failed: {}", e);
        }
    });

    display.set_line(LINE_BOOT, "Addr: ", &config.http.bind_addr, "");

    // Run until interrupted.
    tokio::signal::ctrl_c().await?;
    info!("shutdown requested");

    runtime.stop().await?;
    http_handle.abort();

    info!("bridge exited");
    Ok(())
}

/// Setup logging based on verbosity level
fn setup_logging(verbose: bool) {
    let log_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();
}

/// Load configuration from file or use defaults
fn load_configuration(cli: &Cli) -> anyhow::Result<AppConfig> {
    if let Some(config_path) = &cli.config {
        info!("Loading configuration from: {}", config_path);
    }
    Ok(AppConfig::load(cli.config.as_deref())?)
}
