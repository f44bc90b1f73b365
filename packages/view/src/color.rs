//! Map and bubble coloring.
//!
//! Both the map fill and the scatter bubbles bucket a value into the
//! metric's color ramp over the metric's `[min, max]` extent. The map
//! uses a linear interpolation with one stop per ramp color; bubbles use
//! discrete buckets.

use tract_explorer_metrics_models::Color;
use tract_explorer_view_models::{ColorExpression, ColorStop};

/// Used when a ramp is empty.
pub const FALLBACK_COLOR: &str = "#cccccc";

/// Bucket of `value` in a ramp of `k` colors over `extent`.
///
/// `floor((value - min) / (max - min) * k)`, clamped to `0..k`. A zero
/// width extent maps everything to the middle bucket `k / 2`.
#[must_use]
pub fn bucket_index(value: f64, extent: (f64, f64), k: usize) -> usize {
    if k == 0 {
        return 0;
    }
    let (min, max) = extent;
    #[allow(clippy::float_cmp)]
    let flat = min == max;
    if flat {
        return k / 2;
    }

    #[allow(clippy::cast_precision_loss)]
    let scaled = ((value - min) / (max - min) * k as f64).floor();
    if !scaled.is_finite() || scaled <= 0.0 {
        return 0;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let idx = scaled as usize;
    idx.min(k - 1)
}

/// Ramp color of `value`.
#[must_use]
pub fn bucket_color(ramp: &[Color], extent: (f64, f64), value: f64) -> Color {
    ramp.get(bucket_index(value, extent, ramp.len()))
        .cloned()
        .unwrap_or_else(|| Color(FALLBACK_COLOR.to_string()))
}

/// Evenly spaced stop values `min + step * i` for a ramp of `k` colors.
/// The last stop is exactly `max`.
#[must_use]
pub fn stop_values(extent: (f64, f64), k: usize) -> Vec<f64> {
    let (min, max) = extent;
    if k <= 1 {
        return vec![min; k];
    }
    #[allow(clippy::cast_precision_loss)]
    let step = (max - min) / (k - 1) as f64;
    (0..k)
        .map(|i| {
            if i == k - 1 {
                return max;
            }
            #[allow(clippy::cast_precision_loss)]
            let i = i as f64;
            step.mul_add(i, min)
        })
        .collect()
}

/// Fill expression for the map.
///
/// Interpolation stops must strictly increase, so a zero-width extent
/// collapses to a single stop carrying the middle color.
#[must_use]
pub fn fill_expression(metric: &str, ramp: &[Color], extent: (f64, f64)) -> ColorExpression {
    #[allow(clippy::float_cmp)]
    let stops = if extent.0 == extent.1 {
        vec![ColorStop {
            value: extent.0,
            color: bucket_color(ramp, extent, extent.0),
        }]
    } else {
        stop_values(extent, ramp.len())
            .into_iter()
            .zip(ramp)
            .map(|(value, color)| ColorStop {
                value,
                color: color.clone(),
            })
            .collect()
    };

    ColorExpression {
        metric: metric.to_string(),
        stops,
    }
}
