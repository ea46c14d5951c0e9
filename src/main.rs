// src/main.rs
use anyhow::Result;
use clap::{Parser, Subcommand};
use cocoon_api::{
    config::{self, Config},
    context::AppContext,
    metrics::MetricsRegistry,
    render::{self, HealthFetcher, StatusBoard},
    server::{shutdown_signal, AppState, MetricsEndpoint, RequestHandler, ServerBuilder},
    status::{self, Aggregator},
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use url::Url;

#[derive(Parser)]
#[command(name = "cocoon-api")]
#[command(about = "SoW document API with aggregated dependency status", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file (YAML, JSON or TOML)
    #[arg(short, long, global = true, env = "COCOON_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API (default)
    Serve,

    /// Poll a running server's /status/health and draw it in the terminal
    Watch {
        /// Base URL of the server
        #[arg(short, long, default_value = "http://localhost:8000")]
        url: Url,

        /// Poll period in milliseconds; defaults to status.poll_interval_ms
        #[arg(short, long)]
        interval_ms: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("cocoon_api={}", level).parse()?)
                .add_directive("hyper=info".parse()?)
                .add_directive("sqlx=warn".parse()?),
        )
        .init();

    if let Some(path) = &cli.config {
        info!("Loading configuration from: {}", path.display());
    }
    let config = config::load_config(cli.config.as_deref())?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::Watch { url, interval_ms } => {
            let period = interval_ms
                .map(Duration::from_millis)
                .unwrap_or_else(|| config.status.poll_interval());
            watch(config, url, period).await
        }
    }
}

async fn serve(config: Config) -> Result<()> {
    let context = AppContext::connect(&config).await?;

    let metrics_registry = Arc::new(MetricsRegistry::new()?);
    let metrics = metrics_registry.collector();

    let probes = status::build_probes(&config, context.graph.clone(), context.postgres.clone())?;
    let aggregator = Aggregator::new(probes).with_metrics(metrics.clone());
    let page = status::render_status_page(
        &aggregator.descriptors(),
        config.status.poll_interval(),
    );

    let state = AppState {
        aggregator: Arc::new(aggregator),
        status_page: Arc::from(page),
        sows: context.postgres.clone(),
        knowledge: context.graph.clone(),
        graph_health: context.graph.clone(),
        relational_health: context.postgres.clone(),
        probe_timeout: config.status.probe_timeout(),
        metrics: config.metrics.enabled.then(|| MetricsEndpoint {
            registry: metrics_registry.clone(),
            path: config.metrics.path.clone(),
        }),
    };

    let handler = RequestHandler::new(Arc::new(state)).with_metrics(metrics);

    info!("Starting API on {}", config.server.listen_addr);
    ServerBuilder::new(config.server.listen_addr)
        .with_handler(handler)
        .with_shutdown_grace(config.server.shutdown_grace())
        .serve_with_shutdown(shutdown_signal())
        .await?;

    context.close().await;
    Ok(())
}

async fn watch(config: Config, base: Url, period: Duration) -> Result<()> {
    let timeout = render::fetch_timeout(status::aggregate_time_bound(&config));
    let fetcher = HealthFetcher::new(&base, timeout)?;
    let mut board = StatusBoard::new(status::descriptors(&config));

    render::watch(
        &fetcher,
        &mut board,
        period,
        |board| print!("{}", render::render_board(board)),
        shutdown_signal(),
    )
    .await;
    Ok(())
}
