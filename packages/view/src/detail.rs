//! Detail panel: headline stats, race composition, and lollipop charts.
//!
//! The panel describes either a tract or the whole jurisdiction. Both
//! are read through the same `value(metric)` lookup so every chart is
//! built the same way; ranks only exist for tracts.

use tract_explorer_dataset::Tract;
use tract_explorer_metrics::format;
use tract_explorer_metrics_models::{MetricCategory, MetricDescriptor};
use tract_explorer_view_models::{
    DetailPanelSpec, DetailSubject, DetailTab, LollipopSpec, RaceSegment, RankLabel, SummaryStat,
};

use crate::color::bucket_color;
use crate::state::DataContext;

/// What the panel is about.
#[derive(Debug, Clone, Copy)]
pub enum Subject<'a> {
    /// The jurisdiction totals.
    Jurisdiction,
    /// One tract.
    Tract(&'a Tract),
}

impl Subject<'_> {
    fn value(&self, data: &DataContext, metric: &str) -> Option<f64> {
        match self {
            Self::Jurisdiction => data.stats.totals.value(metric),
            Self::Tract(tract) => tract.metric(metric),
        }
    }

    fn describe(&self, data: &DataContext) -> DetailSubject {
        match self {
            Self::Jurisdiction => DetailSubject::Jurisdiction {
                name: data.deployment.jurisdiction_name.clone(),
            },
            Self::Tract(tract) => DetailSubject::Tract {
                geoid: tract.geoid().to_string(),
                name: tract.name().to_string(),
            },
        }
    }
}

/// Builds the whole panel with the charts of `active_tab`.
#[must_use]
pub fn build_panel(
    data: &DataContext,
    subject: Subject<'_>,
    active_tab: MetricCategory,
) -> DetailPanelSpec {
    let tabs = data
        .deployment
        .tabs
        .iter()
        .map(|tab| DetailTab {
            category: tab.category,
            title: tab.category.title().to_string(),
            active: tab.category == active_tab,
        })
        .collect();

    DetailPanelSpec {
        subject: subject.describe(data),
        summary: summary_stats(data, subject),
        race: race_segments(data, subject),
        tabs,
        charts: tab_charts(data, subject, active_tab),
    }
}

/// Headline statistics with tract ranks.
#[must_use]
pub fn summary_stats(data: &DataContext, subject: Subject<'_>) -> Vec<SummaryStat> {
    data.deployment
        .summary
        .iter()
        .map(|stat| {
            let value = subject.value(data, &stat.metric);
            let value_label = data.registry.get(&stat.metric).map_or_else(
                || format::optional(value, format::thousands),
                |d| format::optional(value, |v| format::summary(d.kind, v)),
            );
            let rank = match subject {
                Subject::Jurisdiction => None,
                Subject::Tract(tract) => data.stats.ranking.rank(tract.geoid(), &stat.metric),
            };

            SummaryStat {
                metric: stat.metric.clone(),
                label: stat.label.clone(),
                value_label,
                rank,
            }
        })
        .collect()
}

/// Race composition as shares of the charted categories' total. Missing
/// counts are zero; an all-zero total gives zero-width segments.
#[must_use]
pub fn race_segments(data: &DataContext, subject: Subject<'_>) -> Vec<RaceSegment> {
    let counts: Vec<f64> = data
        .deployment
        .race
        .iter()
        .map(|r| subject.value(data, &r.count_metric).unwrap_or(0.0))
        .collect();
    let total: f64 = counts.iter().sum();

    data.deployment
        .race
        .iter()
        .zip(counts)
        .map(|(category, count)| RaceSegment {
            label: category.label.clone(),
            count,
            share: if total > 0.0 { count / total } else { 0.0 },
            color: category.color.clone(),
        })
        .collect()
}

/// Lollipop charts for every metric of a tab.
#[must_use]
pub fn tab_charts(
    data: &DataContext,
    subject: Subject<'_>,
    category: MetricCategory,
) -> Vec<LollipopSpec> {
    let Some(tab) = data.deployment.tabs.iter().find(|t| t.category == category) else {
        return vec![];
    };

    tab.metrics
        .iter()
        .filter_map(|key| {
            let Some(descriptor) = data.registry.get(key) else {
                log::warn!("Skipping chart for unregistered metric {key}");
                return None;
            };
            Some(lollipop(data, subject, descriptor))
        })
        .collect()
}

/// One lollipop chart.
#[must_use]
pub fn lollipop(
    data: &DataContext,
    subject: Subject<'_>,
    descriptor: &MetricDescriptor,
) -> LollipopSpec {
    let distribution = data.stats.distribution(&data.dataset, &descriptor.key);
    let (min, max) = distribution.extent();
    let value = subject.value(data, &descriptor.key);
    let label = |v: Option<f64>| format::optional(v, |v| format::detailed(descriptor.kind, v));

    let rank = match (subject, value) {
        (Subject::Tract(_), Some(v)) => distribution.rank_of(v).map(|rank| RankLabel {
            rank,
            total: distribution.len(),
        }),
        _ => None,
    };

    let ramp = data.deployment.colors.for_descriptor(descriptor);

    LollipopSpec {
        metric: descriptor.key.clone(),
        title: descriptor.label.clone(),
        value,
        value_label: label(value),
        min,
        median: distribution.median,
        max,
        min_label: label(distribution.min),
        median_label: label(distribution.median),
        max_label: label(distribution.max),
        rank,
        is_median: matches!(subject, Subject::Jurisdiction),
        color: bucket_color(ramp, (min, max), value.unwrap_or(min)),
    }
}
