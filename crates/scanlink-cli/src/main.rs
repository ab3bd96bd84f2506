//! Line-oriented front end for the scanner bridge.
//!
//! Runs a bridge over the mock gateway. Requests and simulated gateway events
//! are read from stdin as JSON lines; responses and outbound events are
//! written to stdout as JSON lines. Logs go to stderr.
//!
//! ```text
//! $ scanlink
//! {"simulate": {"kind": "scannerAppeared", "scanner": {"id": 7, "name": "DS2278", "connectionType": "BLE"}}}
//! {"type":"scannerListChanged","scanners":[{"id":7,"name":"DS2278","model":"Unknown","connectionType":"BLE","isActive":false}]}
//! {"request": {"action": "connectScanner", "id": 7}}
//! {"status":"ok","message":"Connecting to scanner 7"}
//! {"type":"scannerConnected","scanner":{...,"isActive":true}}
//! {"type":"scannerListChanged","scanners":[...]}
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use scanlink_gateway::mock::{MockGateway, MockGatewayHandle};
use scanlink_session::{
    BridgeConfig, BridgeError, EventSubscription, Response, ScannerBridge, handle_request,
};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

mod input;

use input::InputLine;

/// Scanner bridge over a simulated gateway.
#[derive(Parser, Debug)]
#[command(name = "scanlink")]
#[command(about = "Scanner session and event bridge driven by JSON lines on stdin")]
#[command(version)]
struct Args {
    /// JSON bridge configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level used when RUST_LOG is unset (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Do not answer connect/disconnect with simulated session events
    #[arg(long)]
    no_auto_confirm: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let config = load_config(args.config.as_ref()).await?;
    info!(
        auto_listen = config.auto_listen_on_connect,
        require_known = config.require_known_scanner,
        "Starting scanner bridge"
    );

    let (gateway, events, handle) = MockGateway::new();
    handle.set_auto_confirm(!args.no_auto_confirm);

    let bridge = ScannerBridge::new(config);
    bridge
        .attach_gateway(gateway)
        .context("Failed to attach gateway")?;

    let subscription = bridge.subscribe().await;
    let printer = tokio::spawn(print_events(subscription));
    let pump = bridge.start(events);

    tokio::select! {
        result = read_input(&bridge, &handle) => result?,
        _ = tokio::signal::ctrl_c() => info!("Interrupted"),
    }

    // Closing every sender lets the pump drain queued events and stop.
    drop(handle);
    bridge.detach_gateway();
    if let Err(e) = pump.wait().await {
        warn!(error = %e, "Event pump stopped with an error");
    }

    drop(bridge);
    printer.await.context("Event printer task failed")?;
    info!("Scanner bridge stopped");
    Ok(())
}

/// Initialize tracing, preferring `RUST_LOG` over the command-line level.
fn init_tracing(log_level: &str) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();
}

async fn load_config(path: Option<&PathBuf>) -> Result<BridgeConfig> {
    let config = match path {
        Some(path) => {
            let json = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            BridgeConfig::from_json_str(&json)?
        }
        None => BridgeConfig::default(),
    };
    Ok(config.apply_env()?)
}

async fn read_input(
    bridge: &ScannerBridge<MockGateway>,
    handle: &MockGatewayHandle,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        match InputLine::parse(&line) {
            None => {}
            Some(Ok(InputLine::Request(request))) => {
                let response = handle_request(bridge, request).await;
                println!("{}", serde_json::to_string(&response)?);
            }
            Some(Ok(InputLine::Simulate(event))) => {
                debug!(kind = event.kind(), "Simulating gateway event");
                handle.emit(event).await?;
            }
            Some(Err(e)) => {
                let response = Response::error(&BridgeError::invalid_request(e.to_string()));
                println!("{}", serde_json::to_string(&response)?);
            }
        }
    }

    debug!("End of input");
    Ok(())
}

async fn print_events(mut subscription: EventSubscription) {
    while let Some(event) = subscription.recv().await {
        match event.to_json() {
            Ok(json) => println!("{json}"),
            Err(e) => warn!(error = %e, event = event.event_name(), "Dropping unencodable event"),
        }
    }
}
