//! inlo-triage - Crash Assist triage service
//!
//! Subcommands:
//! - `serve`: HTTP API (default port 5780)
//! - `triage`: run one case from command-line fields
//! - `assess`: assess a photo against the reference image, then triage it
//!
//! `triage` and `assess` print the result as JSON on stdout; logs go to stderr.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use inlo_common::config::{ConfigResolver, LoggingConfig};
use tokio::runtime::Handle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use inlo_triage::models::CaseInput;
use inlo_triage::services::AssessRequest;
use inlo_triage::AppState;

/// Command-line arguments for inlo-triage
#[derive(Parser, Debug)]
#[command(name = "inlo-triage")]
#[command(about = "Crash assist triage: vehicle condition assessment and dispatch routing")]
#[command(version)]
struct Args {
    /// TOML config file (falls back to INLO_CONFIG, then the platform config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP API
    Serve {
        /// Port to listen on (overrides the config file)
        #[arg(short, long, env = "INLO_PORT")]
        port: Option<u16>,
    },
    /// Triage a single case
    Triage {
        #[arg(long)]
        vehicle_number: Option<String>,
        /// Whether the vehicle is inoperative ("yes" / "no")
        #[arg(long)]
        inoperative: Option<String>,
        #[arg(long)]
        location: Option<String>,
    },
    /// Assess a vehicle photo and triage the resulting case
    Assess {
        #[arg(long)]
        target: PathBuf,
        /// Reference image (overrides the config file)
        #[arg(long)]
        reference: Option<PathBuf>,
        #[arg(long)]
        vehicle_number: Option<String>,
        #[arg(long)]
        location: Option<String>,
    },
}

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("inlo_triage={0},inlo_common={0},tower_http=info", logging.level)));

    let file_layer = match &logging.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Loaded before tracing because it carries the log level and file; the
    // outcome is logged right after init.
    let resolver = ConfigResolver::new("inlo-triage");
    let loaded = resolver
        .load(args.config.as_deref())
        .context("Failed to load configuration")?;
    let toml_config = loaded.config;

    init_tracing(&toml_config.logging)?;

    info!(
        "Starting INLO Crash Assist (inlo-triage) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    loaded.source.log(resolver.module_name());

    let crash_assist = inlo_triage::config::build_crash_assist(&toml_config, Handle::current())
        .context("Failed to initialize crash assist")?;

    match args.command {
        Command::Serve { port } => {
            let port = port.unwrap_or(toml_config.port);
            if toml_config.assessment.image_dir.is_none() {
                warn!("No [assessment] image_dir configured; /api/assess accepts any readable server path");
            }
            let app = inlo_triage::build_router(AppState::new(crash_assist));

            let addr = format!("127.0.0.1:{}", port);
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("Failed to bind {}", addr))?;
            info!("Listening on http://{}", addr);
            info!("Health check: http://{}/health", addr);

            axum::serve(listener, app).await?;
        }
        Command::Triage {
            vehicle_number,
            inoperative,
            location,
        } => {
            let input = CaseInput {
                vehicle_number,
                inoperative,
                location,
            };
            let outcome = tokio::task::spawn_blocking(move || crash_assist.triage(input)).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Command::Assess {
            target,
            reference,
            vehicle_number,
            location,
        } => {
            let request = AssessRequest {
                target_image: target,
                reference_image: reference,
                vehicle_number,
                location,
            };
            let triaged = tokio::task::spawn_blocking(move || crash_assist.assess_and_triage(request))
                .await?
                .context("Assessment failed")?;
            println!("{}", serde_json::to_string_pretty(&triaged)?);
        }
    }

    Ok(())
}
