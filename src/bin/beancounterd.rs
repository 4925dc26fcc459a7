//! beancounterd — event recorder daemon.
//!
//! Serves the event endpoints over HTTP, forwarding each recorded point to
//! the backend selected in configuration.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use beancounter::server::config::{BackendMode, Config, OtelExporter, Secrets};
use beancounter::{Beancounter, BeancounterError, PointEmitter, build_router};

/// Beancounter daemon — HTTP event recorder.
#[derive(Parser)]
#[command(name = "beancounterd")]
#[command(version = beancounter::PKG_VERSION)]
#[command(about = "Beancounter event recorder daemon")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let args = Args::parse();

    // Load configuration
    let config = Config::load(args.config.as_deref())?;
    let secrets = Secrets::load()?;

    // Build the configured emitter
    let emitter = build_emitter(&config, &secrets)?;

    // Parse address
    let addr: SocketAddr = config
        .server
        .address
        .parse()
        .map_err(|e| BeancounterError::Configuration(format!("Invalid address: {e}")))?;

    info!(
        version = beancounter::version_string(),
        %addr,
        backend = emitter.name(),
        "beancounterd starting"
    );

    let app = build_router(emitter.clone());
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Flush buffered points before exiting
    emitter.shutdown().await?;

    Ok(())
}

/// Build the emitter from configuration.
fn build_emitter(
    config: &Config,
    secrets: &Secrets,
) -> Result<Arc<dyn PointEmitter>, BeancounterError> {
    let mut builder = Beancounter::builder();

    match config.backend.mode {
        BackendMode::Monitoring => {
            let monitoring = config.backend.monitoring.as_ref().ok_or_else(|| {
                BeancounterError::Configuration(
                    "backend.monitoring section required for monitoring mode".to_string(),
                )
            })?;
            let token = secrets.token("monitoring").ok_or_else(|| {
                BeancounterError::Configuration(
                    "no monitoring credential in secrets or BEANCOUNTER_MONITORING_TOKEN"
                        .to_string(),
                )
            })?;

            builder = builder.monitoring(&monitoring.project_id, token);
            if let Some(ref namespace) = monitoring.namespace {
                builder = builder.namespace(namespace);
            }
            if let Some(ref base_url) = monitoring.base_url {
                builder = builder.monitoring_base_url(base_url);
            }
        }
        BackendMode::Otel => {
            let otel = config.backend.otel.clone().unwrap_or_default();
            builder = builder.export_interval(otel.export_interval_secs);

            match otel.exporter {
                OtelExporter::Stdout => {
                    builder = builder.otel_stdout();
                }
                OtelExporter::Collector => {
                    let endpoint = otel.endpoint.ok_or_else(|| {
                        BeancounterError::Configuration(
                            "backend.otel.endpoint required for collector exporter".to_string(),
                        )
                    })?;
                    let token = secrets.token("collector").ok_or_else(|| {
                        BeancounterError::Configuration(
                            "no collector credential in secrets or BEANCOUNTER_COLLECTOR_TOKEN"
                                .to_string(),
                        )
                    })?;
                    if let Some(audience) = otel.audience {
                        info!(audience, "collector credential audience");
                    }
                    builder = builder
                        .otel_collector(endpoint, token)
                        .export_timeout(otel.timeout_secs);
                }
            }
        }
    }

    builder.build()
}

/// Resolve on ctrl-c, letting in-flight requests drain.
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}
