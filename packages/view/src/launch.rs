//! Session startup: load the tracts once, then draw the initial views.

use tract_explorer_dataset::DatasetSource;
use tract_explorer_metrics_models::Deployment;
use tract_explorer_view_models::BannerSpec;

use crate::ViewError;
use crate::state::DataContext;
use crate::surfaces::{BannerSurface, Surfaces, report};
use crate::synchronizer::ViewSynchronizer;

/// Shown when the tract collection cannot be loaded.
pub const LOAD_FAILURE_MESSAGE: &str =
    "Failed to load demographics data. Please check your data file.";

/// How long the load-failure banner stays up.
pub const BANNER_DURATION_MS: u64 = 5000;

#[must_use]
pub fn load_failure_banner() -> BannerSpec {
    BannerSpec {
        message: LOAD_FAILURE_MESSAGE.to_string(),
        duration_ms: BANNER_DURATION_MS,
    }
}

/// Loads the dataset from `source`, computes its statistics, and draws
/// the initial map, legend, and detail panel. On a load failure the
/// banner is shown and nothing else is initialized.
///
/// # Errors
///
/// Returns [`ViewError::Dataset`] if loading fails, or [`ViewError`] if
/// the deployment defaults are invalid.
pub async fn launch(
    deployment: Deployment,
    source: &DatasetSource,
    surfaces: Surfaces,
    banner: &mut dyn BannerSurface,
) -> Result<ViewSynchronizer, ViewError> {
    let dataset = match tract_explorer_dataset::load(source).await {
        Ok(dataset) => dataset,
        Err(e) => {
            log::error!("Error loading data from {source}: {e}");
            report("Banner", banner.show_banner(&load_failure_banner()));
            return Err(e.into());
        }
    };

    let data = DataContext::new(deployment, dataset);
    log::info!(
        "Loaded {} tracts for {}",
        data.dataset.len(),
        data.deployment.jurisdiction_name
    );

    let mut synchronizer = ViewSynchronizer::new(data, surfaces)?;
    synchronizer.initialize();
    Ok(synchronizer)
}
