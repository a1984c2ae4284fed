//! Cell normalization.
//!
//! The statistical office marks empty cells with `-` (nothing recorded) and
//! `.` (value withheld). Both load as zero; this is a known data-quality
//! compromise and the only place values are silently replaced.

use polars::prelude::AnyValue;

use crate::options::IngestOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CountCell {
    Value(u64),
    Placeholder,
}

/// Parses a non-negative integer count, accepting float renderings such as
/// `1234.0`. Returns `None` for anything else.
pub(crate) fn parse_count(raw: &str, options: &IngestOptions) -> Option<CountCell> {
    let trimmed = raw.trim();
    if options.is_placeholder(trimmed) {
        return Some(CountCell::Placeholder);
    }
    if let Ok(value) = trimmed.parse::<u64>() {
        return Some(CountCell::Value(value));
    }
    let value = trimmed.parse::<f64>().ok()?;
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u64::MAX as f64 {
        Some(CountCell::Value(value as u64))
    } else {
        None
    }
}

/// Parses a non-negative finite weight.
pub(crate) fn parse_weight(raw: &str) -> Option<f64> {
    let value = raw.trim().parse::<f64>().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

/// Renders a polars cell as text for [`parse_count`].
pub(crate) fn cell_text(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::UInt64(v) => v.to_string(),
        AnyValue::Float32(v) => f64::from(v).to_string(),
        AnyValue::Float64(v) => v.to_string(),
        other => other.to_string(),
    }
}
