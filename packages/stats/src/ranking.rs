//! Per-tract ranks for a fixed set of metrics.

use std::collections::BTreeMap;

use tract_explorer_dataset::Dataset;

/// `GEOID -> metric -> rank`, where rank 1 is the highest value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankingTable {
    ranks: BTreeMap<String, BTreeMap<String, usize>>,
    metrics: Vec<String>,
    total: usize,
}

impl RankingTable {
    /// Ranks every tract for each of `metrics`.
    ///
    /// Values are sorted descending with missing treated as zero. Equal
    /// values are ordered by ascending `GEOID` so the result does not
    /// depend on load order.
    #[must_use]
    pub fn compute(dataset: &Dataset, metrics: &[String]) -> Self {
        let mut ranks: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();

        for metric in metrics {
            let mut ordered: Vec<(&str, f64)> = dataset
                .iter()
                .map(|t| (t.geoid(), t.metric_or_zero(metric)))
                .collect();
            ordered.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));

            for (position, (geoid, _)) in ordered.into_iter().enumerate() {
                ranks
                    .entry(geoid.to_string())
                    .or_default()
                    .insert(metric.clone(), position + 1);
            }
        }

        Self {
            ranks,
            metrics: metrics.to_vec(),
            total: dataset.len(),
        }
    }

    /// Rank of a tract for `metric`.
    #[must_use]
    pub fn rank(&self, geoid: &str, metric: &str) -> Option<usize> {
        self.ranks.get(geoid)?.get(metric).copied()
    }

    /// All ranks of a tract.
    #[must_use]
    pub fn ranks_of(&self, geoid: &str) -> Option<&BTreeMap<String, usize>> {
        self.ranks.get(geoid)
    }

    /// Whether `metric` is ranked.
    #[must_use]
    pub fn is_ranked(&self, metric: &str) -> bool {
        self.metrics.iter().any(|m| m == metric)
    }

    /// Ranked metrics in configuration order.
    #[must_use]
    pub fn metrics(&self) -> &[String] {
        &self.metrics
    }

    /// Number of ranked tracts (the "N" in "r of N").
    #[must_use]
    pub const fn total(&self) -> usize {
        self.total
    }
}
