//! Value distribution of one metric across all tracts.

use tract_explorer_dataset::Dataset;

use crate::median::median_of_sorted;

/// Min, max, median, and descending order of a metric's present values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricDistribution {
    /// Metric key.
    pub metric: String,
    /// Smallest present value.
    pub min: Option<f64>,
    /// Largest present value.
    pub max: Option<f64>,
    /// Median of present values.
    pub median: Option<f64>,
    sorted_desc: Vec<f64>,
}

impl MetricDistribution {
    /// Collects the present values of `metric`. Missing values are
    /// excluded, not treated as zero.
    #[must_use]
    pub fn compute(dataset: &Dataset, metric: &str) -> Self {
        let mut sorted_desc: Vec<f64> = dataset.iter().filter_map(|t| t.metric(metric)).collect();
        sorted_desc.sort_by(|a, b| b.total_cmp(a));

        Self {
            metric: metric.to_string(),
            min: sorted_desc.last().copied(),
            max: sorted_desc.first().copied(),
            median: median_of_sorted(&sorted_desc),
            sorted_desc,
        }
    }

    /// 1-based position of the first occurrence of `value` in descending
    /// order, so equal values share the best rank.
    #[must_use]
    pub fn rank_of(&self, value: f64) -> Option<usize> {
        let idx = self.sorted_desc.partition_point(|v| *v > value);
        #[allow(clippy::float_cmp)]
        let found = self.sorted_desc.get(idx).is_some_and(|v| *v == value);
        found.then_some(idx + 1)
    }

    /// `[min, max]` for color scaling, or `[0, 1]` when there are no
    /// values.
    #[must_use]
    pub fn extent(&self) -> (f64, f64) {
        match (self.min, self.max) {
            (Some(min), Some(max)) => (min, max),
            _ => (0.0, 1.0),
        }
    }

    /// Present values, largest first.
    #[must_use]
    pub fn sorted_desc(&self) -> &[f64] {
        &self.sorted_desc
    }

    /// Number of present values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sorted_desc.len()
    }

    /// Whether no tract has a value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sorted_desc.is_empty()
    }
}
