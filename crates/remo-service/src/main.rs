//! Remo Service - room sensor poller and HTTP API.
//!
//! Run with: `cargo run -p remo-service`

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use clap::{Parser, Subcommand};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use remo_core::{PollerOptions, PollingController, ProxyClient, ProxyFeed};
use remo_service::config::default_config_path;
use remo_service::{AppState, Collector, Config, api};

/// Remo Service - room sensor poller and HTTP REST API.
#[derive(Parser, Debug)]
#[command(name = "remo-service")]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Bind address (overrides config).
    #[arg(short, long, global = true)]
    bind: Option<String>,

    /// Disable background polling (API only mode).
    #[arg(long, global = true)]
    no_collector: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the service in the foreground (default behavior).
    Run,

    /// Run one polling cycle and print the snapshot as JSON.
    Fetch,

    /// Poll a running service's proxy endpoint and log each cycle.
    Watch {
        /// Base URL of the service (e.g., "http://127.0.0.1:8080").
        #[arg(long)]
        proxy: String,
    },

    /// Write a default configuration file.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args = Args::parse();

    // Logs go to stderr so `fetch` output stays clean JSON
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("remo_service=info".parse()?)
                .add_directive("remo_core=info".parse()?)
                .add_directive("tower_http=debug".parse()?),
        )
        .init();

    match args.command.take() {
        Some(Command::Fetch) => fetch_once(&args).await,
        Some(Command::Watch { proxy }) => watch_proxy(&proxy, &args).await,
        Some(Command::Init { force }) => init_config(&args, force),
        Some(Command::Run) | None => run_server(args).await,
    }
}

fn load_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default().unwrap_or_else(|e| {
            warn!("Ignoring unreadable default config: {}", e);
            Config::default()
        }),
    };

    // Override config with CLI args and environment
    if let Some(bind) = &args.bind {
        config.server.bind = bind.clone();
    }
    config.apply_env();
    config.validate()?;

    Ok(config)
}

async fn run_server(args: Args) -> anyhow::Result<()> {
    let config = load_config(&args)?;
    let bind = config.server.bind.clone();

    let state = AppState::new(config)?;

    // Start the background collector
    let collector = if !args.no_collector {
        let collector = Collector::new(Arc::clone(&state));
        let _logger = collector.start().await;
        Some(collector)
    } else {
        info!("Background collector disabled");
        None
    };

    // Build the router
    let app = Router::new()
        .merge(api::router())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    info!("Starting server on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(collector) = collector {
        collector.stop().await;
    }
    info!("Server stopped");

    Ok(())
}

async fn fetch_once(args: &Args) -> anyhow::Result<()> {
    let state = AppState::new(load_config(args)?)?;
    let snapshot = state.controller.refresh().await;
    state.controller.dispose().await;

    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

async fn watch_proxy(proxy: &str, args: &Args) -> anyhow::Result<()> {
    let config = load_config(args)?;
    let client = ProxyClient::with_timeout(proxy, config.upstream.timeout())?;
    info!("Watching {}", client.base_url());

    let generator =
        remo_core::SyntheticGenerator::new(config.synthetic.rooms.iter().cloned());
    let controller = PollingController::new(
        Arc::new(ProxyFeed::new(client)),
        PollerOptions::new()
            .interval(config.poller.interval())
            .generator(generator),
    );

    let mut rx = controller.subscribe();
    controller.start().await;

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    let mut seen_cycles = 0;
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = rx.borrow_and_update().clone();
                if snapshot.completed_cycles == seen_cycles {
                    continue;
                }
                seen_cycles = snapshot.completed_cycles;

                match &snapshot.error {
                    Some(error) => warn!("Cycle {} degraded: {}", seen_cycles, error),
                    None => info!("Cycle {} ({:?})", seen_cycles, snapshot.source),
                }
                for room in &snapshot.room_data {
                    info!(
                        "  {}: temperature={:?} humidity={:?} illumination={:?}",
                        room.name, room.temperature, room.humidity, room.illumination
                    );
                }
            }
        }
    }

    controller.dispose().await;
    Ok(())
}

fn init_config(args: &Args, force: bool) -> anyhow::Result<()> {
    let path = args.config.clone().unwrap_or_else(default_config_path);
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    let mut config = Config::default();
    if let Some(bind) = &args.bind {
        config.server.bind = bind.clone();
    }
    config.validate()?;
    config.save(&path)?;

    println!("Wrote {}", path.display());
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
