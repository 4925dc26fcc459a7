//! Beancounter - HTTP event recorder for single-point metrics
//!
//! This crate maps inbound HTTP requests to single timeseries points and
//! funnels them through exactly one of two interchangeable emission
//! backends: a direct monitoring-API push or an OpenTelemetry instrument
//! pipeline (stdout or authenticated remote OTLP exporter). There is no
//! batching, retrying, or aggregation of its own — one request produces at
//! most one point.
//!
//! # Example
//!
//! ```rust,no_run
//! use beancounter::Beancounter;
//!
//! #[tokio::main]
//! async fn main() -> beancounter::Result<()> {
//!     let app = Beancounter::builder()
//!         .monitoring("my-project", "ya29.token")
//!         .build_router()?;
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8160").await
//!         .map_err(|e| beancounter::BeancounterError::Configuration(e.to_string()))?;
//!     axum::serve(listener, app).await
//!         .map_err(|e| beancounter::BeancounterError::Http(e.to_string()))?;
//!     Ok(())
//! }
//! ```

pub mod emitters;
pub mod error;
pub mod gateway;
#[cfg(feature = "server")]
pub mod server;
pub mod telemetry;
pub mod types;
pub mod version;

// Re-export main types at crate root
pub use emitters::{CollectorSettings, MonitoringApiEmitter, OtelEmitter, PointEmitter};
pub use error::{BeancounterError, Result};
pub use gateway::{Beancounter, BeancounterBuilder, build_router};
pub use telemetry::EventMetric;
pub use types::{LabelSet, MetricPoint, PointValue};
pub use version::{PKG_VERSION, version_string};
