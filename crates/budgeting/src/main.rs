mod app;
mod broker;
mod cache;
mod config;
mod consumer;
mod handlers;
mod services;
mod state;
mod storage;

use anyhow::Result;
use clap::Parser;
use listenfd::ListenFd;
use tokio::{net::TcpListener, signal};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    app::create_app,
    config::Config,
    consumer::{registrations, ConsumerSupervisor},
    state::AppState,
};

/// Budgeting - Accounts, budgets and goals with event-driven ingestion
#[derive(Parser, Debug)]
#[command(name = "budgeting")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Host address to bind the server to
    #[arg(long, short = 'H', default_value = "0.0.0.0", env = "HOST")]
    host: String,

    /// Port to listen on
    #[arg(long, short, default_value = "3000", env = "PORT")]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "budgeting=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let state = AppState::new(&config).await;

    // Topic consumers run alongside the HTTP surface; without a broker the
    // server still answers requests.
    let supervisor = match state.broker.as_deref() {
        Some(broker) => match ConsumerSupervisor::start(
            broker,
            registrations(&state.services),
            config.consumer_retry_delay(),
        )
        .await
        {
            Ok(supervisor) => {
                tracing::info!(topics = ?supervisor.topics(), "Consumers started");
                Some(supervisor)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to subscribe to topics, running without consumers");
                None
            }
        },
        None => {
            tracing::warn!("No broker available, running without consumers");
            None
        }
    };

    // Build the application router
    let app = create_app(state);

    // Auto-reload support via listenfd
    let mut listenfd = ListenFd::from_env();
    let listener = match listenfd.take_tcp_listener(0)? {
        // If we are given a tcp listener on listen fd 0, use that one
        Some(listener) => {
            listener.set_nonblocking(true)?;
            TcpListener::from_std(listener)?
        }
        // Otherwise fall back to CLI-specified host:port
        None => {
            let addr = format!("{}:{}", cli.host, cli.port);
            TcpListener::bind(&addr).await?
        }
    };

    tracing::info!("listening on {}", listener.local_addr()?);

    // The interrupt cancels the consumers at once; the HTTP server then
    // drains its open connections.
    let consumers = supervisor.as_ref().map(ConsumerSupervisor::shutdown_signal);
    let graceful = async move {
        match consumers {
            Some(signal) => signal.cancel_after(shutdown_signal()).await,
            None => shutdown_signal().await,
        }
    };

    // Run the server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(graceful)
        .await?;

    tracing::info!("Server stopped");

    if let Some(supervisor) = supervisor {
        for (topic, stats) in supervisor.shutdown().await {
            tracing::info!(
                topic,
                acked = stats.acked,
                rejected = stats.rejected,
                resolve_failures = stats.resolve_failures,
                "Consumer stopped"
            );
        }
    }

    Ok(())
}

/// Wait for shutdown signals (Ctrl+C or SIGTERM).
///
/// A handler that cannot be installed is logged and never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }
}
