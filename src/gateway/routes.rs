//! Axum router and request handlers.
//!
//! Each handler is a single-shot, stateless request/response transformation:
//! extract at most one query parameter, build one point, hand it to the
//! configured emitter, translate the outcome into a status code. Routes are
//! method-agnostic.

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use serde::Deserialize;
use tracing::error;

use crate::emitters::PointEmitter;
use crate::telemetry::{self, EventMetric};
use crate::types::{LabelSet, MetricPoint};

/// Shared state handed to every handler invocation.
///
/// Built once at startup; read-only thereafter.
#[derive(Clone)]
pub struct AppState {
    emitter: Arc<dyn PointEmitter>,
}

/// Build the router serving the event endpoints.
pub fn build_router(emitter: Arc<dyn PointEmitter>) -> Router {
    Router::new()
        .route("/change-event", any(change_event))
        .route("/feed-event", any(feed_event))
        .route("/mood-event", any(mood_event))
        .route("/healthz", get(healthz))
        .with_state(AppState { emitter })
}

/// Records a diaper-change event: metric `changes`, value 1, no labels.
async fn change_event(State(state): State<AppState>) -> Response {
    record_event(&state, "change-event", &telemetry::CHANGES, LabelSet::new()).await
}

/// Records a feeding event: metric `feedings`, value 1, no labels.
async fn feed_event(State(state): State<AppState>) -> Response {
    record_event(&state, "feed-event", &telemetry::FEEDINGS, LabelSet::new()).await
}

#[derive(Deserialize)]
struct MoodParams {
    status: Option<String>,
}

/// Records a mood event labeled with the required `status` query parameter.
///
/// A missing or empty `status` is rejected with 400 before any backend call.
async fn mood_event(State(state): State<AppState>, Query(params): Query<MoodParams>) -> Response {
    let status = match params.status {
        Some(s) if !s.is_empty() => s,
        _ => {
            record_request("mood-event", Instant::now(), false);
            return (
                StatusCode::BAD_REQUEST,
                "could not read status from query string.",
            )
                .into_response();
        }
    };

    record_event(
        &state,
        "mood-event",
        &telemetry::STATUS,
        LabelSet::single(telemetry::STATUS_LABEL, status),
    )
    .await
}

/// Liveness probe reporting the build version.
async fn healthz() -> Response {
    (StatusCode::OK, crate::version::version_string()).into_response()
}

/// Build one point with value 1 at the current time and push it.
async fn record_event(
    state: &AppState,
    endpoint: &'static str,
    metric: &EventMetric,
    labels: LabelSet,
) -> Response {
    let start = Instant::now();
    let point = MetricPoint::int64(1, None);

    match state.emitter.record(metric, &labels, point).await {
        Ok(()) => {
            metrics::counter!(telemetry::POINTS_TOTAL,
                "metric" => metric.name,
                "backend" => state.emitter.name().to_owned(),
            )
            .increment(1);
            record_request(endpoint, start, true);
            (StatusCode::CREATED, "Data point recorded.").into_response()
        }
        Err(e) => {
            error!(endpoint, error = %e, "failed to record data point");
            record_request(endpoint, start, false);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("failed to record data point: {e}"),
            )
                .into_response()
        }
    }
}

/// Record handler outcome metrics (counter + histogram).
fn record_request(endpoint: &'static str, start: Instant, ok: bool) {
    let status = if ok { "ok" } else { "error" };
    metrics::counter!(telemetry::REQUESTS_TOTAL,
        "endpoint" => endpoint,
        "status" => status,
    )
    .increment(1);
    metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS,
        "endpoint" => endpoint,
    )
    .record(start.elapsed().as_secs_f64());
}
