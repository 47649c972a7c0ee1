//! CICS Listener CLI - Monitor a Codan NGT transceiver over its serial console.

use anyhow::{Context, Result};
use cics_listener::{
    command::Commander,
    config::Config,
    listener,
    state::CicsState,
    stats::ListenerStats,
    transport::open_serial,
};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// CICS Listener - Monitor a Codan NGT transceiver over its serial console
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Serial device the console is attached to
    #[arg(short, long, env = "CICS_DEVICE")]
    device: Option<String>,

    /// Serial baud rate
    #[arg(short, long, env = "CICS_BAUD")]
    baud: Option<u32>,

    /// Read timeout in seconds
    #[arg(long)]
    read_timeout: Option<u64>,

    /// Poll the device state every N seconds (0 disables)
    #[arg(short, long)]
    poll_interval: Option<u64>,

    /// Print the status snapshot every N seconds (0 disables)
    #[arg(short, long)]
    status_interval: Option<u64>,

    /// Request a GPS beacon from these callsigns at startup
    #[arg(long = "gps-poll")]
    gps_poll: Vec<String>,

    /// Print status snapshots as JSON
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Maximum runtime in seconds (0 = unlimited)
    #[arg(long, default_value_t = 0)]
    max_runtime: u64,
}

/// Fold CLI overrides into the file configuration.
fn apply_overrides(config: &mut Config, args: &Args) {
    if let Some(device) = &args.device {
        config.device = device.clone();
    }
    if let Some(baud) = args.baud {
        config.baud = baud;
    }
    if let Some(read_timeout) = args.read_timeout {
        config.read_timeout = read_timeout;
    }
    if let Some(poll_interval) = args.poll_interval {
        config.poll_interval = poll_interval;
    }
    if let Some(status_interval) = args.status_interval {
        config.status_interval = status_interval;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let mut config = Config::load()?;
    apply_overrides(&mut config, &args);
    config.validate()?;

    info!("CICS Listener starting...");
    info!("Device: {} at {} baud", config.device, config.baud);
    info!("Known stations: {}", config.stations.len());

    // Shared state, seeded from the configured station directory
    let state = Arc::new(CicsState::with_stations(
        config.stations.iter().map(|s| (s.callsign.clone(), s.id)),
    ));
    let stats = Arc::new(ListenerStats::new());

    let (source, sink) = open_serial(
        &config.device,
        config.baud,
        Duration::from_secs(config.read_timeout),
    )
    .with_context(|| format!("Failed to open serial device {}", config.device))?;

    let listener = listener::start(source, Arc::clone(&state), Arc::clone(&stats));
    let commander = Commander::new(sink, Arc::clone(&state));

    // Create shutdown signal
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    // Handle Ctrl+C
    let shutdown_tx_clone = shutdown_tx.clone();
    tokio::spawn(async move {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        info!("Shutdown signal received");
        let _ = shutdown_tx_clone.send(true);
    });

    // Optional max runtime
    if args.max_runtime > 0 {
        let shutdown_tx_clone = shutdown_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(args.max_runtime)).await;
            info!("Max runtime reached");
            let _ = shutdown_tx_clone.send(true);
        });
    }

    // Start status printer
    if config.status_interval > 0 {
        let state_clone = Arc::clone(&state);
        let status_interval = config.status_interval;
        let json = args.json;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(status_interval));
            loop {
                interval.tick().await;
                let snapshot = state_clone.snapshot();
                if json {
                    match serde_json::to_string(&snapshot) {
                        Ok(text) => println!("{}", text),
                        Err(e) => warn!("Failed to serialize status: {}", e),
                    }
                } else {
                    println!("\n{}", snapshot);
                }
            }
        });
    }

    // One-shot beacon requests from the command line
    for callsign in &args.gps_poll {
        if let Err(e) = commander.poll_gps_by_callsign(callsign).await {
            warn!("GPS poll for {} failed: {}", callsign, e);
        }
    }

    // Main loop: poll the device state until shutdown
    let poll_enabled = config.poll_interval > 0;
    let mut poll_timer =
        tokio::time::interval(Duration::from_secs(config.poll_interval.max(1)));

    loop {
        tokio::select! {
            // Check for shutdown
            _ = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    break;
                }
            }

            // Periodic state poll (replies arrive on the receive loop)
            _ = poll_timer.tick(), if poll_enabled => {
                if let Err(e) = commander.poll_state().await {
                    warn!("State poll failed: {}", e);
                }
            }
        }
    }

    let reason = listener.stop().await;
    info!("Receive loop stopped: {:?}", reason);

    // Print final state and statistics
    println!("\n\nFINAL STATE");
    println!("{}", state.snapshot());
    println!("\n{}", stats.summary());

    Ok(())
}
