//! `circuit-guard` command line.
//!
//! ```text
//! circuit-guard check    --config breakers.toml
//! circuit-guard simulate --config breakers.toml --breaker payments --failure-ratio 0.6
//! circuit-guard serve    --config breakers.toml
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use circuit_guard::admin::setup_admin_router;
use circuit_guard::config::loader::load_config;
use circuit_guard::config::Settings;
use circuit_guard::observability::{logging, metrics};
use circuit_guard::simulate::{run_workload, Workload};
use circuit_guard::BreakerRegistry;

#[derive(Parser)]
#[command(name = "circuit-guard")]
#[command(about = "Inspect and exercise circuit breaker configurations", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "breakers.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and validate the configuration
    Check,
    /// Drive a synthetic workload through one breaker and print the result
    Simulate {
        /// Breaker to exercise (defaults to the first one configured)
        #[arg(short, long)]
        breaker: Option<String>,
        #[arg(long, default_value_t = 100)]
        calls: usize,
        #[arg(long, default_value_t = 0.0)]
        failure_ratio: f64,
        #[arg(long, default_value_t = 0.0)]
        slow_ratio: f64,
        #[arg(long, default_value_t = 10)]
        pause_ms: u64,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Serve the admin API (and metrics, if enabled) until Ctrl-C
    Serve,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let settings = match load_config(&cli.config) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}: {}", cli.config.display(), e);
            std::process::exit(2);
        }
    };

    logging::init_logging(&settings.observability.log_level);
    tracing::info!(
        path = %cli.config.display(),
        breakers = settings.breakers.len(),
        "Configuration loaded"
    );

    match cli.command {
        Commands::Check => {
            println!("{}: ok ({} breakers)", cli.config.display(), settings.breakers.len());
        }
        Commands::Simulate {
            breaker,
            calls,
            failure_ratio,
            slow_ratio,
            pause_ms,
            seed,
        } => {
            let registry = BreakerRegistry::from_settings(&settings);
            let name = match breaker.or_else(|| settings.breakers.first().map(|b| b.name.clone())) {
                Some(name) => name,
                None => return Err("no breakers configured".into()),
            };
            let breaker = registry
                .get(&name)
                .ok_or_else(|| format!("unknown breaker '{name}'"))?;

            let workload = Workload {
                calls,
                failure_ratio,
                slow_ratio,
                // Comfortably past the threshold so slow calls classify as slow
                slow_delay: breaker.config().slow_call_duration_threshold + Duration::from_millis(5),
                pause: Duration::from_millis(pause_ms),
                seed,
            };
            let report = run_workload(&breaker, &workload).await;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Serve => serve(settings).await?,
    }

    Ok(())
}

async fn serve(settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    if settings.observability.metrics_enabled {
        metrics::init_metrics(settings.observability.metrics_address.parse()?);
    }

    let registry = BreakerRegistry::from_settings(&settings);
    if !settings.admin.enabled {
        tracing::warn!("Admin API disabled; nothing to serve");
        return Ok(());
    }

    let app = setup_admin_router(registry, &settings.admin);
    let listener = tokio::net::TcpListener::bind(&settings.admin.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Admin API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
