//! Multi-node HTTP configuration provider.
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────────────┐
//!                 │                    PROVIDER                              │
//!   node-a ──────▶│  ┌─────────┐   ┌───────────┐   ┌───────┐   ┌─────────┐  │
//!   node-b ──────▶│  │  fetch  │──▶│ transform │──▶│ merge │──▶│  emit   │──┼──▶ sink
//!   node-c ──────▶│  │ fan-out │   │  policy   │   │ first │   │ payload │  │
//!                 │  └─────────┘   └───────────┘   │ wins  │   └─────────┘  │
//!                 │       ▲                        └───────┘                │
//!                 │       └──────── driver (ticker, cancellation) ──────────┤
//!                 └──────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::sync::mpsc;

use multi_http_provider::config::loader::{load_config, read_config};
use multi_http_provider::emit::{ConfigurationSink, JsonFileSink};
use multi_http_provider::lifecycle::{shutdown_or_terminal, ShutdownReason};
use multi_http_provider::observability::{logging, metrics};
use multi_http_provider::{ConfigurationPayload, Provider, ProviderStatus};

#[derive(Parser)]
#[command(name = "multi-http-provider")]
#[command(about = "Aggregate routing configuration from multiple HTTP nodes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll endpoints until interrupted
    Run {
        #[arg(short, long, default_value = "provider.toml")]
        config: PathBuf,

        /// Write every merged configuration to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file and list its endpoints
    Validate {
        #[arg(short, long, default_value = "provider.toml")]
        config: PathBuf,
    },
    /// Run a single cycle and print the merged configuration
    Once {
        #[arg(short, long, default_value = "provider.toml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, output } => run(config, output).await,
        Commands::Validate { config } => validate(config),
        Commands::Once { config } => once(config).await,
    }
}

async fn run(path: PathBuf, output: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let config = read_config(&path)?;
    logging::init_logging(&config.observability.log_level);

    tracing::info!(
        config = %path.display(),
        "multi-http-provider v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let mut provider = Provider::new(config);
    provider.init()?;

    let (tx, mut rx) = mpsc::channel::<ConfigurationPayload>(1);
    provider.start(Arc::new(tx))?;

    let file_sink = output.map(JsonFileSink::new);
    let consumer = tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            let entities = payload.configuration.as_ref().map_or(0, |c| c.entity_count());
            tracing::info!(entities, "Received merged configuration");

            if let Some(sink) = &file_sink {
                if let Err(e) = sink.deliver(payload).await {
                    tracing::error!(
                        path = %sink.path().display(),
                        error = %e,
                        "Failed to write configuration"
                    );
                }
            }
        }
    });

    let reason = shutdown_or_terminal(provider.subscribe()).await;
    provider.stop().await?;
    // The driver held the only sender; the consumer drains and exits.
    let _ = consumer.await;

    if let ShutdownReason::Provider(ProviderStatus::Failed(reason)) = reason {
        tracing::error!(reason = %reason, "Provider failed, exiting");
        return Err(format!("provider failed: {}", reason).into());
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

fn validate(path: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let (config, settings) = load_config(&path)?;

    println!("{}: ok", path.display());
    println!("  provider:      {}", config.provider_name);
    println!("  policy:        {:?}", settings.policy);
    println!("  poll interval: {:?}", settings.poll_interval);
    println!("  poll timeout:  {:?}", settings.poll_timeout);
    if !settings.entrypoints.is_empty() {
        let entrypoints: Vec<_> = settings.entrypoints.iter().map(String::as_str).collect();
        println!("  entrypoints:   {}", entrypoints.join(", "));
    }
    println!("  endpoints:");
    for endpoint in &settings.endpoints {
        println!(
            "    {:<16} {}:{}{} ({} headers)",
            endpoint.name,
            endpoint.address,
            settings.fetch.port,
            settings.fetch.path,
            endpoint.headers.len()
        );
    }
    Ok(())
}

async fn once(path: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = read_config(&path)?;
    logging::init_logging(&config.observability.log_level);

    let mut provider = Provider::new(config);
    provider.init()?;

    let cycle = provider.run_once().await?;
    if !cycle.failed.is_empty() {
        eprintln!("skipped endpoints: {}", cycle.failed.join(", "));
    }

    let payload = ConfigurationPayload::new(cycle.configuration);
    println!("{}", payload.to_json_pretty()?);
    Ok(())
}
