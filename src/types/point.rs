//! Single-point measurement values.
//!
//! A [`MetricPoint`] is built per request and discarded after emission. The
//! value is either an integer or a double, never both; the end time defaults
//! to the current wall clock (seconds resolution) when unset.

use chrono::Utc;

/// Numeric value of a point. Integer and floating-point are mutually
/// exclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointValue {
    Int64(i64),
    Double(f64),
}

/// A single timestamped measurement, immutable once constructed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricPoint {
    value: PointValue,
    end_time: i64,
}

impl MetricPoint {
    /// Create an integer point.
    ///
    /// A `None` or zero timestamp substitutes the current wall-clock time.
    /// No further validation: negative values and future timestamps are
    /// accepted as-is.
    pub fn int64(value: i64, timestamp: Option<i64>) -> Self {
        Self {
            value: PointValue::Int64(value),
            end_time: resolve_timestamp(timestamp),
        }
    }

    /// Create a floating-point point.
    ///
    /// Timestamp semantics match [`MetricPoint::int64`].
    pub fn double(value: f64, timestamp: Option<i64>) -> Self {
        Self {
            value: PointValue::Double(value),
            end_time: resolve_timestamp(timestamp),
        }
    }

    /// The point's numeric value.
    pub fn value(&self) -> PointValue {
        self.value
    }

    /// Epoch seconds of the measurement end time.
    pub fn end_time(&self) -> i64 {
        self.end_time
    }
}

/// Zero and unset both mean "now".
fn resolve_timestamp(timestamp: Option<i64>) -> i64 {
    match timestamp {
        Some(ts) if ts != 0 => ts,
        _ => Utc::now().timestamp(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_timestamp_is_kept() {
        let point = MetricPoint::int64(1, Some(1_700_000_000));
        assert_eq!(point.end_time(), 1_700_000_000);
        assert_eq!(point.value(), PointValue::Int64(1));
    }

    #[test]
    fn unset_timestamp_defaults_to_now() {
        let before = Utc::now().timestamp();
        let point = MetricPoint::int64(1, None);
        let after = Utc::now().timestamp();
        assert!(point.end_time() >= before && point.end_time() <= after + 2);
    }

    #[test]
    fn zero_timestamp_defaults_to_now() {
        let before = Utc::now().timestamp();
        let point = MetricPoint::double(0.5, Some(0));
        assert!(point.end_time() >= before);
        assert_eq!(point.value(), PointValue::Double(0.5));
    }

    #[test]
    fn negative_values_are_accepted() {
        let point = MetricPoint::int64(-3, Some(42));
        assert_eq!(point.value(), PointValue::Int64(-3));
    }

    #[test]
    fn future_timestamps_are_accepted() {
        let future = Utc::now().timestamp() + 86_400;
        let point = MetricPoint::int64(1, Some(future));
        assert_eq!(point.end_time(), future);
    }
}
