//! Direct monitoring-API emitter.
//!
//! Pushes each point as a single-timeseries create request against the
//! monitoring backend's REST surface, scoped to a configured project id.
//! The metric type is the namespace prefix joined with the metric identity
//! path (e.g. `custom.googleapis.com/beancounter/changes`).

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat};
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use super::traits::PointEmitter;
use crate::telemetry::EventMetric;
use crate::types::{LabelSet, MetricPoint, PointValue};
use crate::{BeancounterError, Result};

/// Default base URL for the monitoring API.
const DEFAULT_BASE_URL: &str = "https://monitoring.googleapis.com";

/// Default namespace prefix for custom metric types.
const DEFAULT_NAMESPACE: &str = "custom.googleapis.com";

/// Request timeout for timeseries writes.
const WRITE_TIMEOUT_SECS: u64 = 30;

/// Emitter that writes one timeseries point per call to the monitoring API.
#[derive(Clone, Debug)]
pub struct MonitoringApiEmitter {
    project_id: String,
    token: String,
    namespace: String,
    http: Client,
    base_url: String,
}

impl MonitoringApiEmitter {
    /// Create a new emitter for the given project with a bearer credential.
    pub fn new(project_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self::with_base_url(project_id, token, DEFAULT_BASE_URL)
    }

    /// Create an emitter with a custom base URL (for testing with wiremock).
    pub fn with_base_url(
        project_id: impl Into<String>,
        token: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(WRITE_TIMEOUT_SECS))
            .build()
            .expect("failed to build HTTP client");

        Self {
            project_id: project_id.into(),
            token: token.into(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            http,
            base_url: base_url.into(),
        }
    }

    /// Override the namespace prefix joined onto metric identity paths.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Full metric type for an identity path.
    fn metric_type(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.namespace.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Serialize a point into the API's wire shape.
    fn to_api_point(point: &MetricPoint) -> Result<ApiPoint> {
        let end_time = DateTime::from_timestamp(point.end_time(), 0).ok_or_else(|| {
            BeancounterError::InvalidInput(format!(
                "timestamp out of range: {}",
                point.end_time()
            ))
        })?;

        let value = match point.value() {
            // The API's JSON mapping carries int64 as a decimal string.
            PointValue::Int64(v) => TypedValue {
                int64_value: Some(v.to_string()),
                double_value: None,
            },
            PointValue::Double(v) => TypedValue {
                int64_value: None,
                double_value: Some(v),
            },
        };

        Ok(ApiPoint {
            interval: TimeInterval {
                end_time: end_time.to_rfc3339_opts(SecondsFormat::Secs, true),
            },
            value,
        })
    }
}

#[async_trait]
impl PointEmitter for MonitoringApiEmitter {
    fn name(&self) -> &str {
        "monitoring-api"
    }

    async fn record(
        &self,
        metric: &EventMetric,
        labels: &LabelSet,
        point: MetricPoint,
    ) -> Result<()> {
        let url = format!(
            "{}/v3/projects/{}/timeSeries",
            self.base_url, self.project_id
        );

        let request = CreateTimeSeriesRequest {
            time_series: vec![TimeSeries {
                metric: Metric {
                    r#type: self.metric_type(metric.path),
                    labels: labels.clone(),
                },
                points: vec![Self::to_api_point(&point)?],
            }],
        };

        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .json(&request)
            .send()
            .await
            .map_err(|e| BeancounterError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(BeancounterError::Api {
                status: status.as_u16(),
                message,
            });
        }

        debug!(metric = metric.name, "timeseries point written");
        Ok(())
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateTimeSeriesRequest {
    time_series: Vec<TimeSeries>,
}

#[derive(Serialize)]
struct TimeSeries {
    metric: Metric,
    points: Vec<ApiPoint>,
}

#[derive(Serialize)]
struct Metric {
    r#type: String,
    #[serde(skip_serializing_if = "LabelSet::is_empty")]
    labels: LabelSet,
}

#[derive(Serialize)]
struct ApiPoint {
    interval: TimeInterval,
    value: TypedValue,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TimeInterval {
    end_time: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TypedValue {
    #[serde(skip_serializing_if = "Option::is_none")]
    int64_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    double_value: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_type_joins_namespace_and_path() {
        let emitter = MonitoringApiEmitter::new("proj", "token");
        assert_eq!(
            emitter.metric_type("/beancounter/changes"),
            "custom.googleapis.com/beancounter/changes"
        );
    }

    #[test]
    fn metric_type_handles_custom_namespace_slashes() {
        let emitter =
            MonitoringApiEmitter::new("proj", "token").namespace("example.com/metrics/");
        assert_eq!(
            emitter.metric_type("/beancounter/feedings"),
            "example.com/metrics/beancounter/feedings"
        );
    }

    #[test]
    fn int_point_serializes_as_string_value() {
        let point = MetricPoint::int64(1, Some(1_700_000_000));
        let api = MonitoringApiEmitter::to_api_point(&point).unwrap();
        let json = serde_json::to_value(&api).unwrap();
        assert_eq!(json["value"]["int64Value"], "1");
        assert_eq!(json["interval"]["endTime"], "2023-11-14T22:13:20Z");
    }

    #[test]
    fn double_point_serializes_as_number_value() {
        let point = MetricPoint::double(36.6, Some(1_700_000_000));
        let api = MonitoringApiEmitter::to_api_point(&point).unwrap();
        let json = serde_json::to_value(&api).unwrap();
        assert!(json["value"]["doubleValue"].is_f64());
        assert!(json["value"].get("int64Value").is_none());
    }
}
