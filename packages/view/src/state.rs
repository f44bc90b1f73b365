//! Read-only data context and the mutable view state.

use tract_explorer_dataset::{Dataset, Tract, TractIndex};
use tract_explorer_metrics::MetricRegistry;
use tract_explorer_metrics_models::{Deployment, MetricCategory, XAxis};
use tract_explorer_stats::Statistics;
use tract_explorer_tract_models::LngLat;
use tract_explorer_view_models::CameraView;

use crate::ViewError;
use crate::selection::SelectionMachine;

/// Everything derived once at load time.
pub struct DataContext {
    /// Active deployment.
    pub deployment: Deployment,
    /// Its metric descriptors.
    pub registry: MetricRegistry,
    /// The loaded tracts.
    pub dataset: Dataset,
    /// Hit-testing index over the tracts.
    pub index: TractIndex,
    /// Totals, ranks, and distributions.
    pub stats: Statistics,
}

impl DataContext {
    /// Indexes the dataset and computes its statistics.
    #[must_use]
    pub fn new(deployment: Deployment, dataset: Dataset) -> Self {
        let registry = MetricRegistry::new(&deployment);
        let index = TractIndex::build(&dataset);
        let stats = Statistics::compute(&dataset, &deployment);

        Self {
            deployment,
            registry,
            dataset,
            index,
            stats,
        }
    }

    /// Looks up a tract, failing on unknown `GEOID`s.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::UnknownTract`] if no tract has this `GEOID`.
    pub fn tract(&self, geoid: &str) -> Result<&Tract, ViewError> {
        self.dataset
            .get(geoid)
            .ok_or_else(|| ViewError::UnknownTract {
                geoid: geoid.to_string(),
            })
    }

    /// Camera position the map starts at.
    #[must_use]
    pub fn home_view(&self) -> CameraView {
        let [lng, lat] = self.deployment.map.center;
        CameraView {
            center: LngLat::new(lng, lat),
            zoom: self.deployment.map.zoom,
        }
    }
}

/// The user's current metric choices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewConfig {
    /// Metric coloring the map and the sidebar scatter's y-axis.
    pub active_metric: String,
    /// Shared x-axis of every scatter plot.
    pub x_axis: XAxis,
}

/// Mutable state owned by the synchronizer.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Metric choices.
    pub config: ViewConfig,
    /// Hover / freeze state.
    pub selection: SelectionMachine,
    /// Visible detail tab.
    pub active_tab: MetricCategory,
}

impl AppState {
    /// Initial state from the deployment defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError`] if the default metric or x-axis is not
    /// usable.
    pub fn initial(data: &DataContext) -> Result<Self, ViewError> {
        let defaults = &data.deployment.defaults;
        data.registry.require_map_metric(&defaults.metric)?;
        let x_axis = XAxis::from_key(&defaults.x_axis);
        data.registry.require_x_axis(&x_axis)?;

        let active_tab = data
            .deployment
            .tabs
            .first()
            .map_or(MetricCategory::Demographics, |t| t.category);

        Ok(Self {
            config: ViewConfig {
                active_metric: defaults.metric.clone(),
                x_axis,
            },
            selection: SelectionMachine::new(),
            active_tab,
        })
    }
}
