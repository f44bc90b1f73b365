//! Display formatting keyed by [`ValueKind`].
//!
//! Three registers are used across the views:
//!
//! * [`compact`] for the legend and hover popup (precision from the
//!   descriptor, percentages usually whole numbers),
//! * [`detailed`] for lollipop labels and tooltips (one decimal for
//!   percentages, raw counts),
//! * [`summary`] for the headline statistics (grouped counts).
//!
//! Non-finite or absent values always render as [`NOT_AVAILABLE`].

use tract_explorer_metrics_models::{MetricDescriptor, ValueKind};

/// Sentinel shown for degenerate or missing statistics.
pub const NOT_AVAILABLE: &str = "N/A";

/// Formats a value for the legend and popup.
#[must_use]
pub fn compact(descriptor: &MetricDescriptor, value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    match descriptor.kind {
        ValueKind::Percentage => {
            format!("{value:.prec$}%", prec = usize::from(descriptor.precision))
        }
        ValueKind::Currency => format!("${}", thousands(value)),
        ValueKind::Count | ValueKind::Rank => thousands(value),
    }
}

/// Formats a value for lollipop labels and tooltips.
#[must_use]
pub fn detailed(kind: ValueKind, value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    match kind {
        ValueKind::Percentage => format!("{value:.1}%"),
        ValueKind::Currency => format!("${}", thousands(value)),
        ValueKind::Count | ValueKind::Rank => format!("{value:.0}"),
    }
}

/// Formats a value for the headline statistics.
#[must_use]
pub fn summary(kind: ValueKind, value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    match kind {
        ValueKind::Count | ValueKind::Rank => thousands(value),
        ValueKind::Percentage | ValueKind::Currency => detailed(kind, value),
    }
}

/// Applies `format` to a present value, or returns [`NOT_AVAILABLE`].
#[must_use]
pub fn optional(value: Option<f64>, format: impl FnOnce(f64) -> String) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), format)
}

/// Formats a coefficient of determination for the scatter-plot label.
#[must_use]
pub fn r_squared(r2: f64) -> String {
    if r2.is_finite() {
        format!("R\u{b2} = {r2:.3}")
    } else {
        format!("R\u{b2} = {NOT_AVAILABLE}")
    }
}

/// Rounds to the nearest integer and inserts `,` thousands separators.
#[must_use]
pub fn thousands(value: f64) -> String {
    let rounded = format!("{:.0}", value.round());
    let (sign, digits) = rounded
        .strip_prefix('-')
        .map_or(("", rounded.as_str()), |rest| ("-", rest));

    if digits == "0" {
        return "0".to_string();
    }

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{sign}{grouped}")
}
