//! Builder for configuring the active emitter.
//!
//! Exactly one backend is selected at startup: the direct monitoring-API
//! push, the OpenTelemetry stdout pipeline, or the OpenTelemetry collector
//! pipeline. Configuring none is an error, as is configuring more than one.

use std::sync::Arc;
use std::time::Duration;

use super::routes;
use crate::emitters::{
    CollectorSettings, DEFAULT_EXPORT_INTERVAL, DEFAULT_EXPORT_TIMEOUT, MonitoringApiEmitter,
    OtelEmitter, PointEmitter,
};
use crate::{BeancounterError, Result};

/// Main entry point for creating a configured recorder.
pub struct Beancounter;

impl Beancounter {
    /// Create a new builder for selecting and configuring the backend.
    pub fn builder() -> BeancounterBuilder {
        BeancounterBuilder::new()
    }
}

/// Builder selecting exactly one metric-emission backend.
pub struct BeancounterBuilder {
    monitoring: Option<MonitoringSettings>,
    otel_stdout: bool,
    collector: Option<(String, String)>,
    export_timeout: Duration,
    export_interval: Duration,
}

struct MonitoringSettings {
    project_id: String,
    token: String,
    namespace: Option<String>,
    base_url: Option<String>,
}

impl BeancounterBuilder {
    pub fn new() -> Self {
        Self {
            monitoring: None,
            otel_stdout: false,
            collector: None,
            export_timeout: DEFAULT_EXPORT_TIMEOUT,
            export_interval: DEFAULT_EXPORT_INTERVAL,
        }
    }

    /// Configure the direct monitoring-API backend.
    pub fn monitoring(mut self, project_id: impl Into<String>, token: impl Into<String>) -> Self {
        self.monitoring = Some(MonitoringSettings {
            project_id: project_id.into(),
            token: token.into(),
            namespace: None,
            base_url: None,
        });
        self
    }

    /// Override the namespace prefix for the monitoring backend.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        if let Some(settings) = self.monitoring.as_mut() {
            settings.namespace = Some(namespace.into());
        }
        self
    }

    /// Override the monitoring API base URL (for testing).
    pub fn monitoring_base_url(mut self, base_url: impl Into<String>) -> Self {
        if let Some(settings) = self.monitoring.as_mut() {
            settings.base_url = Some(base_url.into());
        }
        self
    }

    /// Configure the OpenTelemetry pipeline with the stdout exporter.
    pub fn otel_stdout(mut self) -> Self {
        self.otel_stdout = true;
        self
    }

    /// Configure the OpenTelemetry pipeline with a remote OTLP collector.
    pub fn otel_collector(mut self, endpoint: impl Into<String>, token: impl Into<String>) -> Self {
        self.collector = Some((endpoint.into(), token.into()));
        self
    }

    /// Fixed per-call export timeout for the collector pipeline (seconds).
    pub fn export_timeout(mut self, secs: u64) -> Self {
        self.export_timeout = Duration::from_secs(secs);
        self
    }

    /// Export interval for the OpenTelemetry pipelines (seconds).
    pub fn export_interval(mut self, secs: u64) -> Self {
        self.export_interval = Duration::from_secs(secs);
        self
    }

    /// Build the configured emitter.
    pub fn build(self) -> Result<Arc<dyn PointEmitter>> {
        let configured = usize::from(self.monitoring.is_some())
            + usize::from(self.otel_stdout)
            + usize::from(self.collector.is_some());
        if configured > 1 {
            return Err(BeancounterError::Configuration(
                "exactly one backend may be configured".to_string(),
            ));
        }

        if let Some(settings) = self.monitoring {
            let mut emitter = match settings.base_url {
                Some(url) => MonitoringApiEmitter::with_base_url(
                    settings.project_id,
                    settings.token,
                    url,
                ),
                None => MonitoringApiEmitter::new(settings.project_id, settings.token),
            };
            if let Some(namespace) = settings.namespace {
                emitter = emitter.namespace(namespace);
            }
            return Ok(Arc::new(emitter));
        }

        if let Some((endpoint, token)) = self.collector {
            let emitter = OtelEmitter::collector(&CollectorSettings {
                endpoint,
                token,
                timeout: self.export_timeout,
                interval: self.export_interval,
            })?;
            return Ok(Arc::new(emitter));
        }

        if self.otel_stdout {
            return Ok(Arc::new(OtelEmitter::stdout(self.export_interval)));
        }

        Err(BeancounterError::NoBackend)
    }

    /// Build the emitter and wrap it in the event router.
    pub fn build_router(self) -> Result<axum::Router> {
        Ok(routes::build_router(self.build()?))
    }
}

impl Default for BeancounterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_backend_is_an_error() {
        let err = Beancounter::builder().build().unwrap_err();
        assert!(matches!(err, BeancounterError::NoBackend));
    }

    #[test]
    fn two_backends_are_an_error() {
        let err = Beancounter::builder()
            .monitoring("proj", "token")
            .otel_stdout()
            .build()
            .unwrap_err();
        assert!(matches!(err, BeancounterError::Configuration(_)));
    }

    #[test]
    fn monitoring_backend_builds() {
        let emitter = Beancounter::builder()
            .monitoring("proj", "token")
            .build()
            .unwrap();
        assert_eq!(emitter.name(), "monitoring-api");
    }

    #[test]
    fn stdout_backend_builds() {
        let emitter = Beancounter::builder().otel_stdout().build().unwrap();
        assert_eq!(emitter.name(), "otel");
    }
}
