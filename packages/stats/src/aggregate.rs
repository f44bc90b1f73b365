//! Jurisdiction-wide aggregation.
//!
//! The totals record stands in for "the whole jurisdiction" when nothing
//! is selected. It answers [`JurisdictionTotals::value`] like a tract
//! does, with each metric resolved from one of three layers:
//!
//! 1. medians (explicit list), which win over everything else,
//! 2. derived values (population ratios, positive-only means, weighted
//!    shares),
//! 3. plain sums.

use std::collections::BTreeMap;

use tract_explorer_dataset::Dataset;
use tract_explorer_metrics_models::AggregationConfig;

use crate::median::median;

/// Aggregated statistics for the whole jurisdiction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JurisdictionTotals {
    tract_count: usize,
    population_metric: String,
    sums: BTreeMap<String, f64>,
    derived: BTreeMap<String, Option<f64>>,
    medians: BTreeMap<String, Option<f64>>,
}

impl JurisdictionTotals {
    /// Reads `metric` as if the totals were a tract. `None` means the
    /// metric is not aggregated or its aggregate is undefined.
    #[must_use]
    pub fn value(&self, metric: &str) -> Option<f64> {
        if let Some(value) = self.medians.get(metric) {
            return *value;
        }
        if let Some(value) = self.derived.get(metric) {
            return *value;
        }
        self.sums.get(metric).copied()
    }

    /// Summed value of `metric`, if it is summed.
    #[must_use]
    pub fn sum(&self, metric: &str) -> Option<f64> {
        self.sums.get(metric).copied()
    }

    /// Derived (ratio, mean, or weighted share) value of `metric`,
    /// ignoring any median override.
    #[must_use]
    pub fn derived(&self, metric: &str) -> Option<f64> {
        self.derived.get(metric).copied().flatten()
    }

    /// Median of `metric` across tracts, if it is in the median list.
    #[must_use]
    pub fn median(&self, metric: &str) -> Option<f64> {
        self.medians.get(metric).copied().flatten()
    }

    /// Total population.
    #[must_use]
    pub fn population(&self) -> f64 {
        self.sums
            .get(&self.population_metric)
            .copied()
            .unwrap_or_default()
    }

    /// Number of tracts aggregated.
    #[must_use]
    pub const fn tract_count(&self) -> usize {
        self.tract_count
    }
}

/// Computes the jurisdiction totals.
///
/// Missing values count as zero in sums; ratios over a zero population,
/// and means or shares with no contributors, are `None`.
#[must_use]
pub fn compute_totals(dataset: &Dataset, config: &AggregationConfig) -> JurisdictionTotals {
    let mut sums = BTreeMap::new();
    for metric in config.sums.iter().chain(std::iter::once(&config.population)) {
        let total: f64 = dataset.iter().map(|t| t.metric_or_zero(metric)).sum();
        sums.insert(metric.clone(), total);
    }

    let population = sums.get(&config.population).copied().unwrap_or_default();
    let mut derived = BTreeMap::new();

    for ratio in &config.ratios {
        let numerator: f64 = dataset.iter().map(|t| t.metric_or_zero(&ratio.numerator)).sum();
        let value = (population > 0.0).then(|| 100.0 * numerator / population);
        if value.is_none() {
            log::warn!("{} undefined: total population is zero", ratio.metric);
        }
        derived.insert(ratio.metric.clone(), value);
    }

    for metric in &config.positive_means {
        derived.insert(metric.clone(), positive_mean(dataset, metric));
    }

    for share in &config.weighted_shares {
        derived.insert(
            share.metric.clone(),
            weighted_share(dataset, &share.metric, &share.weight),
        );
    }

    let medians = config
        .medians
        .iter()
        .map(|metric| {
            let values: Vec<f64> = dataset.iter().filter_map(|t| t.metric(metric)).collect();
            (metric.clone(), median(&values))
        })
        .collect();

    log::info!(
        "Aggregated {} tracts: population {population}, {} sums, {} derived",
        dataset.len(),
        sums.len(),
        derived.len()
    );

    JurisdictionTotals {
        tract_count: dataset.len(),
        population_metric: config.population.clone(),
        sums,
        derived,
        medians,
    }
}

/// Mean over strictly positive values only.
fn positive_mean(dataset: &Dataset, metric: &str) -> Option<f64> {
    let (sum, count) = dataset
        .iter()
        .filter_map(|t| t.metric(metric))
        .filter(|v| *v > 0.0)
        .fold((0.0, 0_u32), |(sum, count), v| (sum + v, count + 1));

    (count > 0).then(|| sum / f64::from(count))
}

/// `sum(weight * pct) / sum(weight)` over tracts with positive weight.
fn weighted_share(dataset: &Dataset, metric: &str, weight: &str) -> Option<f64> {
    let (weighted, total) = dataset
        .iter()
        .filter_map(|t| {
            let units = t.metric(weight)?;
            (units > 0.0).then(|| (units * t.metric_or_zero(metric), units))
        })
        .fold((0.0, 0.0), |(weighted, total), (w, u)| (weighted + w, total + u));

    (total > 0.0).then(|| weighted / total)
}
