//! Metric identities and operational metric name constants.
//!
//! The [`EventMetric`] constants name the timeseries the handlers write to;
//! they are fixed per handler and never derived from request data.
//!
//! The `*_TOTAL`/`*_SECONDS` constants are operational metrics about the shim
//! itself, recorded through the `metrics` facade. Consumers install their own
//! recorder (e.g. prometheus, statsd); without a recorder installed, all
//! metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! Operational metrics are prefixed with `beancounter_`. Counters end in
//! `_total`, histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `endpoint` — handler route (e.g. "change-event")
//! - `status` — outcome: "ok" or "error"
//! - `metric` — event metric instrument name
//! - `backend` — active emitter name (e.g. "monitoring-api", "otel")

/// Identity of an event timeseries.
///
/// `name` is the instrument name used by the OpenTelemetry backend;
/// `path` is the timeseries path joined onto the namespace prefix by the
/// direct-API backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventMetric {
    pub name: &'static str,
    pub path: &'static str,
}

/// Diaper-change events.
pub const CHANGES: EventMetric = EventMetric {
    name: "changes",
    path: "/beancounter/changes",
};

/// Feeding events.
pub const FEEDINGS: EventMetric = EventMetric {
    name: "feedings",
    path: "/beancounter/feedings",
};

/// Mood events, labeled with the reported status.
pub const STATUS: EventMetric = EventMetric {
    name: "status",
    path: "/beancounter/status-label",
};

/// Label key carrying the mood status value.
pub const STATUS_LABEL: &str = "status";

/// Total handler invocations.
///
/// Labels: `endpoint`, `status` ("ok" | "error").
pub const REQUESTS_TOTAL: &str = "beancounter_requests_total";

/// Handler duration in seconds, including the backend write.
///
/// Labels: `endpoint`.
pub const REQUEST_DURATION_SECONDS: &str = "beancounter_request_duration_seconds";

/// Total points handed to the backend.
///
/// Labels: `metric`, `backend`.
pub const POINTS_TOTAL: &str = "beancounter_points_total";
