mod chatbot;
mod error;
mod predictor;
mod routes;
mod state;

use crate::state::{AppSettings, AppState};
use log::info;
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if handle_cli_args() {
        return Ok(());
    }

    better_panic::install();

    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = AppSettings::load();
    let bind = settings.bind.clone();
    let state = AppState::new(settings);
    let app = routes::router(state);

    let listener = TcpListener::bind(&bind).await?;
    info!("AZTLAN backend listening on {bind}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

fn handle_cli_args() -> bool {
    let mut args = std::env::args().skip(1);
    let Some(arg) = args.next() else {
        return false;
    };

    match arg.as_str() {
        "-h" | "--help" => {
            println!("{}", usage_text());
            true
        }
        "-V" | "--version" => {
            println!("aztlan {}", env!("CARGO_PKG_VERSION"));
            true
        }
        _ => {
            eprintln!("Unknown argument: {arg}\n\n{}", usage_text());
            std::process::exit(2);
        }
    }
}

fn usage_text() -> &'static str {
    "aztlan - FTC Mexico dashboard and AZTLAN demo backend

Usage:
  aztlan
  aztlan --help
  aztlan --version

Environment:
  AZTLAN_BIND            Listen address (default 0.0.0.0:5000)
  TOA_API_KEY            The Orange Alliance key; unset serves sample data
  TOA_REGION, TOA_SEASON Region and season keys (default MX, 2425)
  FTC_EVENTS_USERNAME    FIRST events API username
  FTC_EVENTS_TOKEN       FIRST events API token
  FTC_SEASON             FIRST season year (default 2024)
  FTC_COUNTRY            Country filter for FIRST events (default Mexico)
  FTC_SCRAPE_URL         Page scraped by /api/ftc-live-scrape
  LLM_API_KEY            Chat completion key; unset keeps the chatbot rule-based
  LLM_API_URL, LLM_MODEL Completion endpoint and model
  NASA_FEED_CAP          Max images per /api/nasa-feed response (default 8)
  UPSTREAM_TIMEOUT_SECS  Per-request upstream timeout (default 8)
  AZTLAN_KNOWLEDGE_BASE  Document embedded into the judge's LLM prompt
  AZTLAN_DEBUG           Show raw LLM errors in responses
  RUST_LOG               Log filter (default info)"
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            log::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                log::error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
