//! group-relay: main binary
//!
//! Relays `POST /send-message` requests into allow-listed WhatsApp groups
//! and/or a Hangouts incoming webhook.
//!
//! Usage:
//!   group-relay            - Start the relay server
//!   group-relay --help     - Show help
//!   group-relay --version  - Show version

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use gr_api::{AppState, Delivery};
use gr_core::{Config, DeliveryMode, WhatsAppConfig};
use gr_hangouts::HangoutsWebhook;
use gr_whatsapp::{render_qr, SessionEvent, WhatsAppSession};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

/// Run mode
enum RunMode {
    Server,
    Help,
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    match parse_args() {
        RunMode::Help => {
            print_help();
            return Ok(());
        }
        RunMode::Version => {
            println!("group-relay {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        RunMode::Server => {}
    }

    // Load .env first so RUST_LOG from it is honoured
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::load().map_err(|e| anyhow::anyhow!("Config error: {}", e))?;

    tracing::info!("Starting group-relay...");
    tracing::info!("Delivery mode: {}", config.delivery);

    run_server(config).await
}

/// Parse command line arguments
fn parse_args() -> RunMode {
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--help" | "-h" => return RunMode::Help,
            "--version" | "-v" => return RunMode::Version,
            _ => {}
        }
    }

    RunMode::Server
}

/// Print help message
fn print_help() {
    println!("group-relay - WhatsApp group message relay");
    println!();
    println!("Usage:");
    println!("  group-relay            Start the relay server");
    println!("  group-relay --help     Show this help message");
    println!("  group-relay --version  Show version");
    println!();
    println!("Environment Variables:");
    println!("  PORT                         HTTP port (default: 3000)");
    println!("  HOST                         Listen address (default: 0.0.0.0)");
    println!("  ALLOWED_GROUPS               Comma-separated group names (surrounding spaces are ignored)");
    println!("  DELIVERY_MODE                whatsapp, hangouts or both (default: whatsapp)");
    println!("  HANGOUTS_WEBHOOK_URL         Google Chat incoming webhook URL");
    println!("  WHATSAPP_API_URL             WhatsApp sidecar URL (default: http://localhost:3001)");
    println!("  WHATSAPP_SESSION             Sidecar session name (default: default)");
    println!("  WHATSAPP_API_KEY             Sidecar API key (optional)");
    println!("  WHATSAPP_POLL_INTERVAL_SECS  Session status poll interval (default: 2)");
    println!();
    println!("Settings can also be given in ./{}", gr_core::config::CONFIG_FILE);
}

/// Wire the delivery backends and serve until Ctrl+C
async fn run_server(config: Config) -> anyhow::Result<()> {
    let allow_list = config.allow_list();
    if allow_list.is_empty() {
        tracing::warn!("No allowed groups configured; every request will be rejected");
    } else {
        tracing::info!("Allowed groups: {:?}", allow_list.groups());
    }

    let hangouts = Arc::new(HangoutsWebhook::new(config.hangouts.webhook_url.clone()));
    if config.delivery.uses_hangouts() && !hangouts.is_configured() {
        tracing::warn!("HANGOUTS_WEBHOOK_URL is not set; forwarding requests will fail");
    }

    let mut event_handle = None;
    let session = if config.delivery.uses_whatsapp() {
        let (session, handle) = start_whatsapp(&config.whatsapp).await?;
        event_handle = Some(handle);
        Some(session)
    } else {
        tracing::info!("WhatsApp session disabled (delivery mode {})", config.delivery);
        None
    };

    let delivery = match (config.delivery, &session) {
        (DeliveryMode::Hangouts, _) => Delivery::Hangouts(hangouts),
        (DeliveryMode::WhatsApp, Some(session)) => Delivery::WhatsApp(session.clone()),
        (DeliveryMode::Both, Some(session)) => Delivery::Both {
            session: session.clone(),
            hangouts,
        },
        (mode, None) => anyhow::bail!("Delivery mode {} requires a WhatsApp session", mode),
    };

    let host: IpAddr = config
        .server
        .host
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid HOST {:?}: {}", config.server.host, e))?;
    let addr = SocketAddr::new(host, config.server.port);

    let state = AppState::new(allow_list, delivery);
    gr_api::start_server(addr, state, shutdown_signal()).await?;
    tracing::info!("Shutting down...");

    if let Some(session) = session {
        if let Err(e) = session.shutdown().await {
            tracing::warn!("Error during WhatsApp session shutdown: {}", e);
        }
    }
    if let Some(handle) = event_handle {
        handle.abort();
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Create the WhatsApp session and begin authentication
///
/// A sidecar that cannot be reached is logged, not fatal; sends fail until it
/// comes up and the relay is restarted.
async fn start_whatsapp(
    config: &WhatsAppConfig,
) -> anyhow::Result<(Arc<WhatsAppSession>, JoinHandle<()>)> {
    let session = Arc::new(
        WhatsAppSession::new(config)
            .map_err(|e| anyhow::anyhow!("Failed to create WhatsApp session: {}", e))?,
    );

    let handle = spawn_session_events(session.subscribe());

    tracing::info!("Connecting to WhatsApp sidecar at {}", config.api_url);
    if let Err(e) = session.initialize().await {
        tracing::error!("WhatsApp session initialization failed: {}", e);
    }

    Ok((session, handle))
}

/// Show QR challenges to the operator and log session progress
fn spawn_session_events(mut events: broadcast::Receiver<SessionEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(SessionEvent::Qr(code)) => match render_qr(&code) {
                    Ok(rendered) => {
                        println!("{}", rendered);
                        tracing::info!("Scan the QR code above to authenticate.");
                    }
                    Err(e) => tracing::error!("Could not render QR code: {}", e),
                },
                Ok(SessionEvent::Ready) => tracing::info!("WhatsApp client is ready!"),
                Ok(SessionEvent::Failed(reason)) => {
                    tracing::error!("WhatsApp session failed: {}", reason)
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Missed {} WhatsApp session events", skipped)
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
