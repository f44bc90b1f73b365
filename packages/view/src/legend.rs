//! Map legend for the active metric.

use tract_explorer_metrics::format;
use tract_explorer_metrics_models::MetricDescriptor;
use tract_explorer_view_models::{LegendEntry, LegendSpec};

use crate::color::stop_values;
use crate::state::DataContext;

/// Builds the legend: one row per ramp color at the same values as the
/// map's interpolation stops, highest first, plus the metric median.
#[must_use]
pub fn build_legend(data: &DataContext, descriptor: &MetricDescriptor) -> LegendSpec {
    let ramp = data.deployment.colors.for_descriptor(descriptor);
    let distribution = data.stats.distribution(&data.dataset, &descriptor.key);

    let entries = stop_values(distribution.extent(), ramp.len())
        .into_iter()
        .zip(ramp)
        .rev()
        .map(|(value, color)| LegendEntry {
            value,
            label: format::compact(descriptor, value),
            color: color.clone(),
        })
        .collect();

    LegendSpec {
        title: descriptor.label.clone(),
        entries,
        median_label: format::optional(distribution.median, |v| format::compact(descriptor, v)),
    }
}
