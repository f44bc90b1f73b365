#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Embedded deployment registry, metric lookup, and value formatting.
//!
//! Deployments are TOML files compiled into the binary (see
//! [`registry`]). A [`MetricRegistry`] indexes a deployment's metric
//! descriptors by key and groups them by category for the metric
//! pickers. The [`format`] module turns raw values into display strings
//! according to each metric's [`ValueKind`](tract_explorer_metrics_models::ValueKind).

pub mod format;
pub mod registry;

use std::collections::BTreeMap;

use thiserror::Error;
use tract_explorer_metrics_models::{Deployment, MetricCategory, MetricDescriptor, XAxis};

/// Errors that can occur when resolving metrics or deployments.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// No metric with this key is registered.
    #[error("Unknown metric: {key}")]
    UnknownMetric {
        /// The requested key.
        key: String,
    },

    /// No deployment with this id is embedded.
    #[error("Unknown deployment: {id}")]
    UnknownDeployment {
        /// The requested id.
        id: String,
    },

    /// The metric exists but cannot be used where it was requested.
    #[error("Metric {key} cannot be used as {usage}")]
    InvalidUsage {
        /// The metric key.
        key: String,
        /// Where it was requested (e.g. "the map metric").
        usage: &'static str,
    },
}

/// Metric descriptors of a deployment, indexed by key.
#[derive(Debug, Clone)]
pub struct MetricRegistry {
    ordered: Vec<MetricDescriptor>,
    by_key: BTreeMap<String, usize>,
}

impl MetricRegistry {
    /// Builds the registry for a deployment.
    #[must_use]
    pub fn new(deployment: &Deployment) -> Self {
        Self::from_descriptors(deployment.metrics.clone())
    }

    /// Builds a registry from descriptors in display order. Later
    /// duplicates of a key are ignored.
    #[must_use]
    pub fn from_descriptors(descriptors: Vec<MetricDescriptor>) -> Self {
        let mut ordered = Vec::with_capacity(descriptors.len());
        let mut by_key = BTreeMap::new();

        for descriptor in descriptors {
            if by_key.contains_key(&descriptor.key) {
                log::warn!("Ignoring duplicate metric descriptor {}", descriptor.key);
                continue;
            }
            by_key.insert(descriptor.key.clone(), ordered.len());
            ordered.push(descriptor);
        }

        Self { ordered, by_key }
    }

    /// Looks up a descriptor.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&MetricDescriptor> {
        self.by_key.get(key).map(|&idx| &self.ordered[idx])
    }

    /// Looks up a descriptor, failing on unknown keys.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::UnknownMetric`] if `key` is not registered.
    pub fn require(&self, key: &str) -> Result<&MetricDescriptor, MetricsError> {
        self.get(key).ok_or_else(|| MetricsError::UnknownMetric {
            key: key.to_string(),
        })
    }

    /// Validates a metric choice for the map / y-axis. The `rank`
    /// pseudo-metric is only meaningful as an x-axis.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError`] if the key is unknown or is a rank metric.
    pub fn require_map_metric(&self, key: &str) -> Result<&MetricDescriptor, MetricsError> {
        let descriptor = self.require(key)?;
        if descriptor.kind == tract_explorer_metrics_models::ValueKind::Rank {
            return Err(MetricsError::InvalidUsage {
                key: key.to_string(),
                usage: "the map metric",
            });
        }
        Ok(descriptor)
    }

    /// Validates an x-axis choice.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::UnknownMetric`] if a metric axis is not
    /// registered.
    pub fn require_x_axis(&self, axis: &XAxis) -> Result<(), MetricsError> {
        match axis {
            XAxis::Rank => Ok(()),
            XAxis::Metric(key) => self.require_map_metric(key).map(|_| ()),
        }
    }

    /// Display label for a key, falling back to the key itself.
    #[must_use]
    pub fn label<'a>(&'a self, key: &'a str) -> &'a str {
        self.get(key).map_or(key, |d| d.label.as_str())
    }

    /// All descriptors in registry order.
    #[must_use]
    pub fn all(&self) -> &[MetricDescriptor] {
        &self.ordered
    }

    /// Descriptors grouped by category for the metric pickers, in
    /// [`MetricCategory::all`] order. Empty groups are omitted.
    #[must_use]
    pub fn grouped(&self) -> Vec<(MetricCategory, Vec<&MetricDescriptor>)> {
        MetricCategory::all()
            .iter()
            .filter_map(|category| {
                let members: Vec<&MetricDescriptor> = self
                    .ordered
                    .iter()
                    .filter(|d| d.category == *category)
                    .collect();
                (!members.is_empty()).then_some((*category, members))
            })
            .collect()
    }

    /// Number of registered metrics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tract_explorer_metrics_models::{RANK_METRIC, ValueKind};

    fn registry() -> MetricRegistry {
        MetricRegistry::new(&registry::deployment("baton_rouge").unwrap())
    }

    #[test]
    fn lookup_and_labels() {
        let registry = registry();
        assert_eq!(registry.label("Percent_White"), "White %");
        assert_eq!(registry.label("not_a_metric"), "not_a_metric");
        assert!(registry.require("not_a_metric").is_err());
    }

    #[test]
    fn rank_is_only_an_x_axis() {
        let registry = registry();
        assert!(registry.require_map_metric(RANK_METRIC).is_err());
        assert!(registry.require_x_axis(&XAxis::Rank).is_ok());
        assert!(
            registry
                .require_x_axis(&XAxis::Metric("Percent_Black".to_string()))
                .is_ok()
        );
        assert!(
            registry
                .require_x_axis(&XAxis::Metric("missing".to_string()))
                .is_err()
        );
    }

    #[test]
    fn grouped_follows_category_order() {
        let registry = registry();
        let groups = registry.grouped();
        let categories: Vec<MetricCategory> = groups.iter().map(|(c, _)| *c).collect();
        assert_eq!(
            categories,
            vec![
                MetricCategory::Demographics,
                MetricCategory::Housing,
                MetricCategory::Health,
                MetricCategory::Other,
            ]
        );
        let total: usize = groups.iter().map(|(_, members)| members.len()).sum();
        assert_eq!(total, registry.len());
    }

    #[test]
    fn duplicate_descriptors_keep_first() {
        let first = MetricDescriptor {
            key: "a".to_string(),
            label: "First".to_string(),
            kind: ValueKind::Count,
            category: MetricCategory::Other,
            precision: 0,
        };
        let second = MetricDescriptor {
            label: "Second".to_string(),
            ..first.clone()
        };
        let registry = MetricRegistry::from_descriptors(vec![first, second]);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.label("a"), "First");
    }
}
