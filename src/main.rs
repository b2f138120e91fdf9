// This is the entry point of the player-data service.
//
// **Architecture Overview:**
// - `core/` = Business logic (storage-agnostic)
// - `infra/` = Implementations of core traits (MySQL / SQLite)
// - `host/` = Game-server adapters (events, commands)
//
// This file's job is to:
// 1. Load configuration
// 2. Open the database and make sure the schema exists (fail fast otherwise)
// 3. Wire services together (dependency injection)
// 4. Feed host events to the dispatcher until input ends or Ctrl-C
// 5. Drain in-flight events, then close the database

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with several mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "host/host_layer.rs"]
mod host;
#[path = "infra/infra_layer.rs"]
mod infra;

use crate::core::players::{PlayerService, PlayerStore};
use crate::host::dispatcher::EventDispatcher;
use crate::host::events::parse_line;
use crate::infra::database::{schema, ConnectionProvider, DatabaseConfig};
use crate::infra::players::SqlPlayerStore;
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinSet;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const DEFAULT_DRAIN_SECS: u64 = 10;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = DatabaseConfig::from_env()
        .inspect_err(|e| tracing::error!("Invalid database configuration: {}", e))
        .context("invalid database configuration")?;
    let backend = config.backend();
    tracing::info!(backend = %backend, "Starting crown_core");

    // ========================================================================
    // DATABASE
    // ========================================================================
    // Any failure here is fatal: we never run with a half-open database.

    let provider = Arc::new(
        ConnectionProvider::open(&config)
            .await
            .inspect_err(|e| tracing::error!("Failed to open database: {}", e))
            .context("failed to open database")?,
    );

    if let Err(e) = schema::initialize(&provider, config.statement_timeout).await {
        tracing::error!("Database initialization failed: {}", e);
        provider.shutdown().await;
        return Err(e).context("database initialization failed");
    }

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================

    let store = SqlPlayerStore::new(Arc::clone(&provider), config.statement_timeout);
    let players = Arc::new(PlayerService::new(store));
    let dispatcher = Arc::new(EventDispatcher::new(players, backend));

    let drain_timeout = std::env::var("SHUTDOWN_DRAIN_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(DEFAULT_DRAIN_SECS));

    tracing::info!("crown_core ready, reading host events from stdin");
    run_event_loop(dispatcher, drain_timeout).await;

    provider.shutdown().await;
    tracing::info!("crown_core stopped");
    Ok(())
}

/// Read events line by line and handle each one on its own task.
async fn run_event_loop<S: PlayerStore + 'static>(
    dispatcher: Arc<EventDispatcher<S>>,
    drain_timeout: Duration,
) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut tasks = JoinSet::new();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                tracing::info!("Ctrl-C received, shutting down");
                break;
            }
            Some(finished) = tasks.join_next(), if !tasks.is_empty() => {
                if let Err(e) = finished {
                    tracing::error!("Event task failed: {}", e);
                }
            }
            line = lines.next_line() => match line {
                Ok(Some(line)) => match parse_line(&line) {
                    Ok(Some(event)) => {
                        let dispatcher = Arc::clone(&dispatcher);
                        tasks.spawn(async move {
                            if let Some(reply) = dispatcher.dispatch(event).await {
                                println!("{}: {}", reply.recipient, reply.text);
                            }
                        });
                    }
                    Ok(None) => {}
                    Err(e) => tracing::warn!("Skipping malformed event {:?}: {}", line, e),
                },
                Ok(None) => {
                    tracing::info!("Host event stream closed, shutting down");
                    break;
                }
                Err(e) => {
                    tracing::error!("Failed to read host events: {}", e);
                    break;
                }
            },
        }
    }

    drain_in_flight(tasks, drain_timeout).await;
}

/// Let running events finish before the database goes away.
async fn drain_in_flight(mut tasks: JoinSet<()>, limit: Duration) {
    if tasks.is_empty() {
        return;
    }
    tracing::info!(in_flight = tasks.len(), "Draining in-flight events");

    let drained = tokio::time::timeout(limit, async {
        while let Some(finished) = tasks.join_next().await {
            if let Err(e) = finished {
                tracing::error!("Event task failed: {}", e);
            }
        }
    })
    .await;

    if drained.is_err() {
        tracing::warn!(
            remaining = tasks.len(),
            "Drain timed out after {:?}, aborting remaining events",
            limit
        );
        tasks.shutdown().await;
    }
}
