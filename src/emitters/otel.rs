//! OpenTelemetry instrument emitter.
//!
//! Records increments on named counter instruments obtained lazily from a
//! process-wide meter. The SDK pipeline buffers recorded values and exports
//! them asynchronously on its own schedule; `record` never waits for export
//! completion.
//!
//! Two pipelines are supported: a periodic reader with a text exporter
//! writing to stdout, and an OTLP exporter targeting a remote collector with
//! a bearer credential and a fixed per-call timeout configured at
//! initialization.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use opentelemetry::KeyValue;
use opentelemetry::metrics::{Counter, Meter, MeterProvider as _};
use opentelemetry_otlp::{WithExportConfig, WithHttpConfig};
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::metrics::{PeriodicReader, SdkMeterProvider};
use tracing::debug;

use super::traits::PointEmitter;
use crate::telemetry::EventMetric;
use crate::types::{LabelSet, MetricPoint, PointValue};
use crate::{BeancounterError, Result};

/// Meter name instrumenting the event counters.
const METER_NAME: &str = "beancounter";

/// Default export interval for the periodic reader.
pub const DEFAULT_EXPORT_INTERVAL: Duration = Duration::from_secs(60);

/// Default per-call timeout for the collector exporter.
pub const DEFAULT_EXPORT_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings for the remote collector pipeline.
#[derive(Debug, Clone)]
pub struct CollectorSettings {
    /// Full OTLP metrics endpoint, e.g. `https://collector.example.com/v1/metrics`.
    pub endpoint: String,
    /// Bearer credential attached to every export call. Minting the token
    /// (including any audience claim) happens outside this process.
    pub token: String,
    /// Fixed per-call export timeout, set once at initialization.
    pub timeout: Duration,
    /// Export interval for the periodic reader.
    pub interval: Duration,
}

/// Emitter recording increments on OpenTelemetry counter instruments.
#[derive(Debug)]
pub struct OtelEmitter {
    provider: SdkMeterProvider,
    meter: Meter,
    int_counters: DashMap<&'static str, Counter<u64>>,
    double_counters: DashMap<&'static str, Counter<f64>>,
}

impl OtelEmitter {
    /// Build a pipeline that exports to stdout on the given interval.
    pub fn stdout(interval: Duration) -> Self {
        let exporter = opentelemetry_stdout::MetricExporter::default();
        let reader = PeriodicReader::builder(exporter)
            .with_interval(interval)
            .build();
        let provider = SdkMeterProvider::builder()
            .with_reader(reader)
            .with_resource(Self::resource())
            .build();
        Self::with_provider(provider)
    }

    /// Build a pipeline that exports to a remote OTLP collector.
    pub fn collector(settings: &CollectorSettings) -> Result<Self> {
        let mut headers = HashMap::new();
        headers.insert(
            "authorization".to_string(),
            format!("Bearer {}", settings.token),
        );

        let exporter = opentelemetry_otlp::MetricExporter::builder()
            .with_http()
            .with_endpoint(settings.endpoint.clone())
            .with_timeout(settings.timeout)
            .with_headers(headers)
            .build()
            .map_err(|e| BeancounterError::Pipeline(e.to_string()))?;

        let reader = PeriodicReader::builder(exporter)
            .with_interval(settings.interval)
            .build();
        let provider = SdkMeterProvider::builder()
            .with_reader(reader)
            .with_resource(Self::resource())
            .build();
        Ok(Self::with_provider(provider))
    }

    /// Wrap an already-built meter provider.
    ///
    /// Useful for custom pipelines and for tests with an in-memory exporter.
    pub fn with_provider(provider: SdkMeterProvider) -> Self {
        let meter = provider.meter(METER_NAME);
        Self {
            provider,
            meter,
            int_counters: DashMap::new(),
            double_counters: DashMap::new(),
        }
    }

    fn resource() -> Resource {
        Resource::builder()
            .with_attributes(vec![
                KeyValue::new("service.name", METER_NAME),
                KeyValue::new("service.version", crate::version::PKG_VERSION),
            ])
            .build()
    }

    /// Attribute list for a label set (zero or one entry in practice).
    fn attributes(labels: &LabelSet) -> Vec<KeyValue> {
        labels
            .iter()
            .map(|(k, v)| KeyValue::new(k.to_string(), v.to_string()))
            .collect()
    }
}

#[async_trait]
impl PointEmitter for OtelEmitter {
    fn name(&self) -> &str {
        "otel"
    }

    async fn record(
        &self,
        metric: &EventMetric,
        labels: &LabelSet,
        point: MetricPoint,
    ) -> Result<()> {
        let attrs = Self::attributes(labels);

        match point.value() {
            PointValue::Int64(v) => {
                let amount = u64::try_from(v).map_err(|_| {
                    BeancounterError::InvalidInput(format!(
                        "counter increment must be non-negative: {v}"
                    ))
                })?;
                let counter = self
                    .int_counters
                    .entry(metric.name)
                    .or_insert_with(|| self.meter.u64_counter(metric.name).build())
                    .clone();
                counter.add(amount, &attrs);
            }
            PointValue::Double(v) => {
                let counter = self
                    .double_counters
                    .entry(metric.name)
                    .or_insert_with(|| self.meter.f64_counter(metric.name).build())
                    .clone();
                counter.add(v, &attrs);
            }
        }

        debug!(metric = metric.name, "increment recorded");
        Ok(())
    }

    async fn shutdown(&self) -> Result<()> {
        self.provider
            .shutdown()
            .map_err(|e| BeancounterError::Pipeline(e.to_string()))
    }
}
