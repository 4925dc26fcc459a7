//! Emitter trait for backend-specific implementations.
//!
//! Exactly one emitter is active per process, selected at startup and shared
//! read-only by all concurrent handler invocations. Implementations must be
//! safe for concurrent use; each `record` call forwards exactly one point,
//! with no batching, retries, or queueing of its own.
//!
//! A write failure is an ordinary error returned to the caller. The serving
//! process never terminates because a single metric write failed.

use async_trait::async_trait;

use crate::Result;
use crate::telemetry::EventMetric;
use crate::types::{LabelSet, MetricPoint};

/// A sink for single metric points.
#[async_trait]
pub trait PointEmitter: Send + Sync + std::fmt::Debug {
    /// Emitter name for logging/debugging.
    fn name(&self) -> &str;

    /// Push exactly one data point to the backend.
    ///
    /// The point carries one metric identity, zero or one label dimension,
    /// and one numeric value.
    async fn record(
        &self,
        metric: &EventMetric,
        labels: &LabelSet,
        point: MetricPoint,
    ) -> Result<()>;

    /// Flush buffered data and release backend resources.
    ///
    /// Default is a no-op; the OpenTelemetry emitter flushes its pipeline
    /// here.
    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }
}
