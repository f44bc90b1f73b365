//! Rendering collaborators.
//!
//! Each surface receives finished visual descriptions from
//! [`tract_explorer_view_models`] and draws them. Implementations live
//! with the host (a browser bridge, a terminal, a test recorder).

use thiserror::Error;
use tract_explorer_view_models::{
    BannerSpec, CameraView, ColorExpression, DetailPanelSpec, FitOptions, LegendSpec, PopupSpec,
    ScatterPlotSpec,
};

/// Errors reported by a surface.
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// The surface cannot draw right now (detached, not yet mounted).
    #[error("Surface unavailable: {0}")]
    Unavailable(String),

    /// Drawing failed.
    #[error("Render failed: {0}")]
    Render(String),

    /// Encoding the description for the renderer failed.
    #[error("Encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// The choropleth map.
pub trait MapSurface {
    /// Replaces the tract fill color.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError`] if the map cannot be updated.
    fn set_fill(&mut self, expression: &ColorExpression) -> Result<(), SurfaceError>;

    /// Outlines one tract, or clears the outline with `None`.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError`] if the map cannot be updated.
    fn set_highlight(&mut self, geoid: Option<&str>) -> Result<(), SurfaceError>;

    /// Animates the camera to fit a bounding box.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError`] if the camera cannot move.
    fn fit_bounds(&mut self, options: &FitOptions) -> Result<(), SurfaceError>;

    /// Animates the camera to a view.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError`] if the camera cannot move.
    fn fly_to(&mut self, view: &CameraView, duration_ms: u32) -> Result<(), SurfaceError>;

    /// Shows (or moves) the hover popup.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError`] if the popup cannot be drawn.
    fn show_popup(&mut self, popup: &PopupSpec) -> Result<(), SurfaceError>;

    /// Hides the hover popup.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError`] if the popup cannot be removed.
    fn hide_popup(&mut self) -> Result<(), SurfaceError>;
}

/// The map legend.
pub trait LegendSurface {
    /// Replaces the legend.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError`] if the legend cannot be drawn.
    fn render_legend(&mut self, legend: &LegendSpec) -> Result<(), SurfaceError>;
}

/// The tract detail panel.
pub trait DetailSurface {
    /// Replaces the panel contents.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError`] if the panel cannot be drawn.
    fn render_detail(&mut self, panel: &DetailPanelSpec) -> Result<(), SurfaceError>;
}

/// One scatter plot instance.
pub trait ScatterSurface {
    /// Replaces the plotted series.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError`] if the plot cannot be drawn.
    fn bind(&mut self, plot: &ScatterPlotSpec) -> Result<(), SurfaceError>;

    /// Emphasizes one bubble and raises it above the others, or clears
    /// the emphasis with `None`.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError`] if the plot cannot be updated.
    fn highlight(&mut self, geoid: Option<&str>) -> Result<(), SurfaceError>;

    /// Restores the resting draw order (`GEOID`s, first drawn first).
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError`] if the plot cannot be updated.
    fn reorder(&mut self, order: &[String]) -> Result<(), SurfaceError>;
}

/// Transient error messages.
pub trait BannerSurface {
    /// Shows a banner for its duration.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError`] if the banner cannot be shown.
    fn show_banner(&mut self, banner: &BannerSpec) -> Result<(), SurfaceError>;
}

/// The single-instance surfaces driven by the synchronizer.
pub struct Surfaces {
    /// Choropleth map.
    pub map: Box<dyn MapSurface>,
    /// Map legend.
    pub legend: Box<dyn LegendSurface>,
    /// Detail panel.
    pub detail: Box<dyn DetailSurface>,
}

/// Logs a failed surface call. Failures never stop the other views from
/// updating.
pub(crate) fn report(surface: &str, result: Result<(), SurfaceError>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            log::error!("{surface} update failed: {e}");
            false
        }
    }
}
