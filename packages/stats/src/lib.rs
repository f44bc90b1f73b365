#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Statistics derived from the tract dataset.
//!
//! Everything here is computed once after load and then only read:
//!
//! * [`aggregate`]: the jurisdiction-wide totals shown when nothing is
//!   selected.
//! * [`ranking`]: 1-based ranks of every tract for a fixed set of
//!   metrics.
//! * [`distribution`]: min / max / median and descending order per
//!   metric, backing the lollipop charts and "r of N" ranks.
//! * [`regression`]: scatter series and ordinary least squares fits.
//!
//! None of these functions panic on degenerate input (empty datasets,
//! all-missing metrics, zero denominators). Undefined results are
//! `None` or non-finite and are rendered as "N/A" by the views.

pub mod aggregate;
pub mod distribution;
pub mod median;
pub mod ranking;
pub mod regression;

use std::collections::BTreeMap;

use tract_explorer_dataset::Dataset;
use tract_explorer_metrics_models::{Deployment, ValueKind};

pub use aggregate::{JurisdictionTotals, compute_totals};
pub use distribution::MetricDistribution;
pub use ranking::RankingTable;
pub use regression::{Regression, SeriesPoint};

/// All precomputed statistics for one dataset and deployment.
#[derive(Debug, Clone)]
pub struct Statistics {
    /// Jurisdiction-wide aggregates.
    pub totals: JurisdictionTotals,
    /// Ranks for the deployment's ranked metrics.
    pub ranking: RankingTable,
    distributions: BTreeMap<String, MetricDistribution>,
}

impl Statistics {
    /// Computes totals, rankings, and per-metric distributions.
    #[must_use]
    pub fn compute(dataset: &Dataset, deployment: &Deployment) -> Self {
        let totals = compute_totals(dataset, &deployment.aggregation);
        let ranking = RankingTable::compute(dataset, &deployment.aggregation.ranked);

        let distributions: BTreeMap<String, MetricDistribution> = deployment
            .metrics
            .iter()
            .filter(|m| m.kind != ValueKind::Rank)
            .map(|m| (m.key.clone(), MetricDistribution::compute(dataset, &m.key)))
            .collect();

        log::info!(
            "Computed statistics for {} tracts ({} metrics, {} ranked)",
            dataset.len(),
            distributions.len(),
            deployment.aggregation.ranked.len()
        );

        Self {
            totals,
            ranking,
            distributions,
        }
    }

    /// Distribution of `metric`, computed on demand for metrics outside
    /// the deployment's registry.
    #[must_use]
    pub fn distribution(&self, dataset: &Dataset, metric: &str) -> MetricDistribution {
        self.distributions
            .get(metric)
            .cloned()
            .unwrap_or_else(|| MetricDistribution::compute(dataset, metric))
    }

    /// Precomputed distribution of `metric`, if registered.
    #[must_use]
    pub fn cached_distribution(&self, metric: &str) -> Option<&MetricDistribution> {
        self.distributions.get(metric)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn computes_every_registered_metric_distribution() {
        let deployment = test_deployment();
        let dataset = fixtures::dataset(vec![
            fixtures::tract("a", &[("Total_Population", Some(100.0)), ("v", Some(3.0))]),
            fixtures::tract("b", &[("Total_Population", Some(50.0)), ("v", Some(1.0))]),
        ]);

        let stats = Statistics::compute(&dataset, &deployment);
        assert!(stats.cached_distribution("v").is_some());
        assert!(stats.cached_distribution("rank").is_none());
        assert_eq!(stats.distribution(&dataset, "v").max, Some(3.0));
        assert_eq!(stats.distribution(&dataset, "unregistered").len(), 0);
        assert_eq!(stats.totals.value("Total_Population"), Some(150.0));
        assert_eq!(stats.ranking.rank("b", "Total_Population"), Some(2));
    }

    fn test_deployment() -> Deployment {
        use tract_explorer_metrics_models::{
            AggregationConfig, Color, ColorRamps, MapConfig, MetricCategory, MetricDescriptor,
            ViewDefaults,
        };

        let ramp: Vec<Color> = (0..8).map(|i| Color(format!("#00000{i}"))).collect();
        let descriptor = |key: &str, kind| MetricDescriptor {
            key: key.to_string(),
            label: key.to_string(),
            kind,
            category: MetricCategory::Other,
            precision: 0,
        };

        Deployment {
            id: "test".to_string(),
            title: "Test".to_string(),
            jurisdiction_name: "Test Parish".to_string(),
            data_path: "tracts.geojson".to_string(),
            map: MapConfig {
                style: String::new(),
                center: [0.0, 0.0],
                zoom: 10.0,
                fit_padding: 100,
                fit_max_zoom: 14.0,
                animation_ms: 1000,
                fill_opacity: 0.7,
                highlight_color: Color("#000000".to_string()),
            },
            defaults: ViewDefaults {
                metric: "v".to_string(),
                x_axis: "rank".to_string(),
            },
            colors: ColorRamps {
                counts: ramp.clone(),
                percentages: ramp.clone(),
                demographics: ramp.clone(),
                housing: ramp.clone(),
                health: ramp,
            },
            aggregation: AggregationConfig {
                population: "Total_Population".to_string(),
                sums: vec!["Total_Population".to_string()],
                ratios: vec![],
                positive_means: vec![],
                weighted_shares: vec![],
                medians: vec![],
                ranked: vec!["Total_Population".to_string()],
            },
            summary: vec![],
            race: vec![],
            tabs: vec![],
            metrics: vec![
                descriptor("Total_Population", ValueKind::Count),
                descriptor("v", ValueKind::Count),
                descriptor("rank", ValueKind::Rank),
            ],
        }
    }
}
