//! Tests for the direct monitoring-API emitter against a wiremock server.

use chrono::Utc;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use beancounter::telemetry;
use beancounter::{BeancounterError, LabelSet, MetricPoint, MonitoringApiEmitter, PointEmitter};

async fn mock_backend(project: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/v3/projects/{project}/timeSeries")))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn writes_single_timeseries_point() {
    let server = mock_backend("test-project").await;
    let emitter =
        MonitoringApiEmitter::with_base_url("test-project", "test-token", server.uri());

    emitter
        .record(
            &telemetry::CHANGES,
            &LabelSet::new(),
            MetricPoint::int64(1, None),
        )
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1, "exactly one write expected");

    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let series = body["timeSeries"].as_array().unwrap();
    assert_eq!(series.len(), 1);
    assert_eq!(
        series[0]["metric"]["type"],
        "custom.googleapis.com/beancounter/changes"
    );
    assert!(
        series[0]["metric"].get("labels").is_none(),
        "empty label set is omitted"
    );

    let points = series[0]["points"].as_array().unwrap();
    assert_eq!(points.len(), 1);
    assert_eq!(points[0]["value"]["int64Value"], "1");
}

#[tokio::test]
async fn default_end_time_is_now() {
    let server = mock_backend("test-project").await;
    let emitter =
        MonitoringApiEmitter::with_base_url("test-project", "test-token", server.uri());

    emitter
        .record(
            &telemetry::FEEDINGS,
            &LabelSet::new(),
            MetricPoint::int64(1, None),
        )
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let end_time = body["timeSeries"][0]["points"][0]["interval"]["endTime"]
        .as_str()
        .unwrap();

    let parsed = chrono::DateTime::parse_from_rfc3339(end_time).unwrap();
    let delta = (Utc::now().timestamp() - parsed.timestamp()).abs();
    assert!(delta <= 2, "end time should default to now, delta {delta}s");
}

#[tokio::test]
async fn explicit_end_time_is_kept() {
    let server = mock_backend("test-project").await;
    let emitter =
        MonitoringApiEmitter::with_base_url("test-project", "test-token", server.uri());

    emitter
        .record(
            &telemetry::FEEDINGS,
            &LabelSet::new(),
            MetricPoint::int64(1, Some(1_700_000_000)),
        )
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(
        body["timeSeries"][0]["points"][0]["interval"]["endTime"],
        "2023-11-14T22:13:20Z"
    );
}

#[tokio::test]
async fn status_label_is_attached() {
    let server = mock_backend("test-project").await;
    let emitter =
        MonitoringApiEmitter::with_base_url("test-project", "test-token", server.uri());

    emitter
        .record(
            &telemetry::STATUS,
            &LabelSet::single("status", "happy"),
            MetricPoint::int64(1, None),
        )
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let metric = &body["timeSeries"][0]["metric"];
    assert_eq!(
        metric["type"],
        "custom.googleapis.com/beancounter/status-label"
    );
    assert_eq!(metric["labels"]["status"], "happy");
}

#[tokio::test]
async fn custom_namespace_is_used() {
    let server = mock_backend("test-project").await;
    let emitter =
        MonitoringApiEmitter::with_base_url("test-project", "test-token", server.uri())
            .namespace("example.com/metrics");

    emitter
        .record(
            &telemetry::CHANGES,
            &LabelSet::new(),
            MetricPoint::int64(1, None),
        )
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(
        body["timeSeries"][0]["metric"]["type"],
        "example.com/metrics/beancounter/changes"
    );
}

#[tokio::test]
async fn rejected_write_maps_to_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("backend unavailable"))
        .mount(&server)
        .await;

    let emitter =
        MonitoringApiEmitter::with_base_url("test-project", "test-token", server.uri());
    let err = emitter
        .record(
            &telemetry::CHANGES,
            &LabelSet::new(),
            MetricPoint::int64(1, None),
        )
        .await
        .unwrap_err();

    match err {
        BeancounterError::Api { status, message } => {
            assert_eq!(status, 503);
            assert!(message.contains("backend unavailable"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_backend_maps_to_http_error() {
    // Nothing listens on port 1
    let emitter =
        MonitoringApiEmitter::with_base_url("test-project", "test-token", "http://127.0.0.1:1");
    let err = emitter
        .record(
            &telemetry::CHANGES,
            &LabelSet::new(),
            MetricPoint::int64(1, None),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, BeancounterError::Http(_)));
}
