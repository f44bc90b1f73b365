#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Interactive view layer of the tract explorer.
//!
//! The [`synchronizer::ViewSynchronizer`] owns the single mutable
//! [`state::AppState`] and fans every change out to the map, legend,
//! detail panel, and scatter plots through the traits in [`surfaces`].
//! Everything a surface draws is built by the pure functions in
//! [`color`], [`legend`], [`detail`], [`popup`], and [`scatter`].

pub mod color;
pub mod detail;
pub mod launch;
pub mod legend;
pub mod popup;
pub mod scale;
pub mod scatter;
pub mod selection;
pub mod state;
pub mod surfaces;
pub mod synchronizer;

use thiserror::Error;
use tract_explorer_dataset::DatasetError;
use tract_explorer_metrics::MetricsError;
use tract_explorer_metrics_models::MetricCategory;

pub use launch::launch;
pub use scatter::{ScatterInstance, YBinding};
pub use selection::{Selection, SelectionEffect, SelectionEvent, SelectionMachine};
pub use state::{AppState, DataContext, ViewConfig};
pub use surfaces::{
    BannerSurface, DetailSurface, LegendSurface, MapSurface, ScatterSurface, SurfaceError,
    Surfaces,
};
pub use synchronizer::{FanOutReport, ViewSynchronizer};

/// Errors raised by view operations.
#[derive(Debug, Error)]
pub enum ViewError {
    /// The dataset could not be loaded.
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    /// A metric or axis is not usable.
    #[error(transparent)]
    Metrics(#[from] MetricsError),

    /// A surface rejected an update.
    #[error(transparent)]
    Surface(#[from] SurfaceError),

    /// No tract has this `GEOID`.
    #[error("Unknown tract: {geoid}")]
    UnknownTract {
        /// The requested identifier.
        geoid: String,
    },

    /// No scatter instance at this index.
    #[error("Unknown scatter plot: {index}")]
    UnknownScatter {
        /// The requested index.
        index: usize,
    },

    /// The deployment has no tab for this category.
    #[error("No detail tab for {category}")]
    UnknownTab {
        /// The requested category.
        category: MetricCategory,
    },
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! A three-tract parish and recording surfaces.

    use std::cell::RefCell;
    use std::rc::Rc;

    use tract_explorer_dataset::{Dataset, Tract};
    use tract_explorer_tract_models::{PropertyValue, TractProperties};
    use tract_explorer_view_models::{
        BannerSpec, CameraView, ColorExpression, DetailPanelSpec, FitOptions, LegendSpec,
        PopupSpec, ScatterPlotSpec,
    };

    use crate::state::DataContext;
    use crate::surfaces::{
        BannerSurface, DetailSurface, LegendSurface, MapSurface, ScatterSurface, SurfaceError,
        Surfaces,
    };

    pub const A: &str = "22033000100";
    pub const B: &str = "22033000200";
    pub const C: &str = "22033000300";

    const METRICS: [&str; 10] = [
        "Total_Population",
        "White_Alone",
        "Black_Alone",
        "Hispanic_Latino",
        "Asian_Alone",
        "Median_Household_Income",
        "Percent_Below_Poverty",
        "Below_Poverty_Level",
        "ASTHMA",
        "DEPRESSION",
    ];

    fn tract(geoid: &str, name: &str, x: f64, values: [Option<f64>; 10]) -> Tract {
        let properties: TractProperties = METRICS
            .iter()
            .zip(values)
            .map(|(key, value)| {
                (
                    (*key).to_string(),
                    value.map_or(PropertyValue::Missing, PropertyValue::Number),
                )
            })
            .collect();
        let square = geo::Rect::new(geo::coord! { x: x, y: 0.0 }, geo::coord! { x: x + 1.0, y: 1.0 });
        Tract::new(
            geoid,
            name,
            geo::MultiPolygon(vec![square.to_polygon()]),
            properties,
        )
    }

    /// Tracts `1`, `2`, `3` as unit squares at x = 0, 1, 2.
    pub fn dataset() -> Dataset {
        Dataset::new(vec![
            tract(
                A,
                "1",
                0.0,
                [
                    Some(1000.0),
                    Some(600.0),
                    Some(300.0),
                    Some(50.0),
                    Some(50.0),
                    Some(40_000.0),
                    Some(20.0),
                    Some(200.0),
                    Some(10.0),
                    None,
                ],
            ),
            tract(
                B,
                "2",
                1.0,
                [
                    Some(3000.0),
                    Some(900.0),
                    Some(1800.0),
                    Some(200.0),
                    Some(100.0),
                    Some(60_000.0),
                    Some(10.0),
                    Some(300.0),
                    Some(12.0),
                    None,
                ],
            ),
            tract(
                C,
                "3",
                2.0,
                [
                    Some(2000.0),
                    Some(1000.0),
                    Some(800.0),
                    Some(100.0),
                    Some(100.0),
                    None,
                    Some(30.0),
                    Some(600.0),
                    None,
                    None,
                ],
            ),
        ])
        .unwrap()
    }

    pub fn context() -> DataContext {
        DataContext::new(
            tract_explorer_metrics::registry::deployment("baton_rouge").unwrap(),
            dataset(),
        )
    }

    /// Shared call log.
    #[derive(Debug, Clone, Default)]
    pub struct Log(Rc<RefCell<Vec<String>>>);

    impl Log {
        pub fn push(&self, entry: String) {
            self.0.borrow_mut().push(entry);
        }

        pub fn entries(&self) -> Vec<String> {
            self.0.borrow().clone()
        }

        pub fn count(&self, prefix: &str) -> usize {
            self.0
                .borrow()
                .iter()
                .filter(|e| e.starts_with(prefix))
                .count()
        }

        pub fn last(&self, prefix: &str) -> Option<String> {
            self.0
                .borrow()
                .iter()
                .rev()
                .find(|e| e.starts_with(prefix))
                .cloned()
        }
    }

    fn rejected(name: &str) -> SurfaceError {
        SurfaceError::Render(format!("{name} is broken"))
    }

    pub struct RecordingScatter {
        name: String,
        log: Log,
        fail: bool,
    }

    impl RecordingScatter {
        pub fn new(name: &str, log: &Log) -> Self {
            Self {
                name: name.to_string(),
                log: log.clone(),
                fail: false,
            }
        }

        pub fn failing(name: &str, log: &Log) -> Self {
            Self {
                fail: true,
                ..Self::new(name, log)
            }
        }

        fn record(&self, entry: String) -> Result<(), SurfaceError> {
            if self.fail {
                return Err(rejected(&self.name));
            }
            self.log.push(format!("{}:{entry}", self.name));
            Ok(())
        }
    }

    impl ScatterSurface for RecordingScatter {
        fn bind(&mut self, plot: &ScatterPlotSpec) -> Result<(), SurfaceError> {
            self.record(format!("bind:{}", plot.subtitle))
        }

        fn highlight(&mut self, geoid: Option<&str>) -> Result<(), SurfaceError> {
            self.record(format!("highlight:{}", geoid.unwrap_or("none")))
        }

        fn reorder(&mut self, order: &[String]) -> Result<(), SurfaceError> {
            self.record(format!("reorder:{}", order.join(",")))
        }
    }

    pub struct RecordingMap(pub Log);

    impl MapSurface for RecordingMap {
        fn set_fill(&mut self, expression: &ColorExpression) -> Result<(), SurfaceError> {
            self.0.push(format!("map:fill:{}", expression.metric));
            Ok(())
        }

        fn set_highlight(&mut self, geoid: Option<&str>) -> Result<(), SurfaceError> {
            self.0
                .push(format!("map:highlight:{}", geoid.unwrap_or("none")));
            Ok(())
        }

        fn fit_bounds(&mut self, options: &FitOptions) -> Result<(), SurfaceError> {
            let b = options.bounds;
            self.0.push(format!(
                "map:fit:{},{},{},{}",
                b.west, b.south, b.east, b.north
            ));
            Ok(())
        }

        fn fly_to(&mut self, view: &CameraView, _duration_ms: u32) -> Result<(), SurfaceError> {
            self.0.push(format!("map:fly:{}", view.zoom));
            Ok(())
        }

        fn show_popup(&mut self, popup: &PopupSpec) -> Result<(), SurfaceError> {
            self.0.push(format!("map:popup:{}", popup.title));
            Ok(())
        }

        fn hide_popup(&mut self) -> Result<(), SurfaceError> {
            self.0.push("map:popup-hide".to_string());
            Ok(())
        }
    }

    pub struct RecordingLegend(pub Log);

    impl LegendSurface for RecordingLegend {
        fn render_legend(&mut self, legend: &LegendSpec) -> Result<(), SurfaceError> {
            self.0.push(format!("legend:{}", legend.title));
            Ok(())
        }
    }

    pub struct RecordingDetail(pub Log);

    impl DetailSurface for RecordingDetail {
        fn render_detail(&mut self, panel: &DetailPanelSpec) -> Result<(), SurfaceError> {
            let tab = panel
                .active_tab()
                .map_or_else(String::new, |c| c.to_string());
            self.0
                .push(format!("detail:{}:{tab}", panel.subject.heading()));
            Ok(())
        }
    }

    pub struct RecordingBanner(pub Log);

    impl BannerSurface for RecordingBanner {
        fn show_banner(&mut self, banner: &BannerSpec) -> Result<(), SurfaceError> {
            self.0.push(format!("banner:{}", banner.message));
            Ok(())
        }
    }

    pub fn surfaces(log: &Log) -> Surfaces {
        Surfaces {
            map: Box::new(RecordingMap(log.clone())),
            legend: Box::new(RecordingLegend(log.clone())),
            detail: Box::new(RecordingDetail(log.clone())),
        }
    }
}
