//! Scatter plot instances.
//!
//! Every instance plots one y metric against the shared x-axis. The
//! series and its regression are cached per `(y, x)` pair, so resizing
//! or re-highlighting never refits; only a change of either metric does.

use tract_explorer_metrics::format;
use tract_explorer_metrics_models::{MetricDescriptor, XAxis};
use tract_explorer_stats::regression::{self, Regression, SeriesPoint};
use tract_explorer_view_models::{
    AxisSpec, PlotSize, ScatterPlotSpec, ScatterPointSpec, TrendLine,
};

use crate::color::bucket_color;
use crate::scale::{self, LinearScale, SqrtScale};
use crate::state::{DataContext, ViewConfig};
use crate::surfaces::{ScatterSurface, SurfaceError};

/// Smallest plot-area width.
pub const MIN_PLOT_WIDTH: f64 = 250.0;
/// Smallest plot-area height.
pub const MIN_PLOT_HEIGHT: f64 = 120.0;
/// Caption of the rank x-axis.
pub const RANK_AXIS_LABEL: &str = "Rank (Highest to Lowest)";

// top, right, bottom, left
const MARGIN: (f64, f64, f64, f64) = (15.0, 15.0, 40.0, 55.0);
const CONTAINER_PADDING: f64 = 20.0;
const BUBBLE_RADIUS: (f64, f64) = (2.0, 8.0);
const TICK_COUNT: usize = 4;

/// Plot area for a container of the given pixel size, after margins,
/// never smaller than [`MIN_PLOT_WIDTH`] x [`MIN_PLOT_HEIGHT`].
#[must_use]
pub fn plot_area(container_width: f64, container_height: f64) -> PlotSize {
    let (top, right, bottom, left) = MARGIN;
    PlotSize {
        width: (container_width - left - right - CONTAINER_PADDING).max(MIN_PLOT_WIDTH),
        height: (container_height - top - bottom - CONTAINER_PADDING).max(MIN_PLOT_HEIGHT),
    }
}

/// Which metric a scatter instance plots on its y-axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum YBinding {
    /// Follows the active map metric (the sidebar plot).
    Active,
    /// Always plots this metric (a grid cell).
    Fixed(String),
}

impl YBinding {
    /// The y metric under `config`.
    #[must_use]
    pub fn metric<'a>(&'a self, config: &'a ViewConfig) -> &'a str {
        match self {
            Self::Active => &config.active_metric,
            Self::Fixed(metric) => metric,
        }
    }
}

struct CachedFit {
    y: String,
    x: XAxis,
    points: Vec<SeriesPoint>,
    regression: Regression,
}

/// One live scatter plot and its surface.
pub struct ScatterInstance {
    binding: YBinding,
    surface: Box<dyn ScatterSurface>,
    size: PlotSize,
    cache: Option<CachedFit>,
    recomputes: usize,
    plot: Option<ScatterPlotSpec>,
}

impl ScatterInstance {
    /// Creates an instance at the minimum plot size. Nothing is drawn
    /// until [`ScatterInstance::refresh`].
    #[must_use]
    pub fn new(binding: YBinding, surface: Box<dyn ScatterSurface>) -> Self {
        Self {
            binding,
            surface,
            size: PlotSize {
                width: MIN_PLOT_WIDTH,
                height: MIN_PLOT_HEIGHT,
            },
            cache: None,
            recomputes: 0,
            plot: None,
        }
    }

    /// Y-axis binding.
    #[must_use]
    pub const fn binding(&self) -> &YBinding {
        &self.binding
    }

    /// Current plot-area size.
    #[must_use]
    pub const fn size(&self) -> PlotSize {
        self.size
    }

    /// How many times the series and regression were computed.
    #[must_use]
    pub const fn recompute_count(&self) -> usize {
        self.recomputes
    }

    /// The last plot handed to the surface.
    #[must_use]
    pub const fn plot(&self) -> Option<&ScatterPlotSpec> {
        self.plot.as_ref()
    }

    /// Regression of the cached series.
    #[must_use]
    pub fn regression(&self) -> Option<Regression> {
        self.cache.as_ref().map(|c| c.regression)
    }

    /// Lays out and binds the plot for `config`, refitting only if the
    /// `(y, x)` pair changed.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError`] if the surface rejects the plot.
    pub fn refresh(&mut self, data: &DataContext, config: &ViewConfig) -> Result<(), SurfaceError> {
        self.ensure_fit(data, config);
        let Some(fit) = &self.cache else {
            return Ok(());
        };
        let plot = layout(data, fit, self.size);
        self.surface.bind(&plot)?;
        self.plot = Some(plot);
        Ok(())
    }

    /// Changes the plot-area size and relays out the cached series.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError`] if the surface rejects the plot.
    pub fn resize(
        &mut self,
        data: &DataContext,
        config: &ViewConfig,
        size: PlotSize,
    ) -> Result<(), SurfaceError> {
        self.size = PlotSize {
            width: size.width.max(MIN_PLOT_WIDTH),
            height: size.height.max(MIN_PLOT_HEIGHT),
        };
        self.refresh(data, config)
    }

    /// Emphasizes (and raises) one bubble, or clears emphasis.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError`] if the surface rejects the update.
    pub fn highlight(&mut self, geoid: Option<&str>) -> Result<(), SurfaceError> {
        self.surface.highlight(geoid)
    }

    /// Clears emphasis and restores the resting draw order.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError`] if the surface rejects the update.
    pub fn clear(&mut self) -> Result<(), SurfaceError> {
        self.surface.highlight(None)?;
        let order: Vec<String> = self
            .cache
            .as_ref()
            .map(|c| c.points.iter().map(|p| p.geoid.clone()).collect())
            .unwrap_or_default();
        self.surface.reorder(&order)
    }

    fn ensure_fit(&mut self, data: &DataContext, config: &ViewConfig) {
        let y = self.binding.metric(config);
        if self
            .cache
            .as_ref()
            .is_some_and(|c| c.y == y && c.x == config.x_axis)
        {
            return;
        }

        let points = regression::series(
            &data.dataset,
            y,
            &config.x_axis,
            &data.deployment.aggregation.population,
        );
        let regression = Regression::fit(&points);
        log::debug!(
            "Fitted {y} by {}: slope={} r2={}",
            config.x_axis,
            regression.slope,
            regression.r2
        );

        self.recomputes += 1;
        self.cache = Some(CachedFit {
            y: y.to_string(),
            x: config.x_axis.clone(),
            points,
            regression,
        });
    }
}

fn layout(data: &DataContext, fit: &CachedFit, size: PlotSize) -> ScatterPlotSpec {
    let y_descriptor = data.registry.get(&fit.y);
    let x_descriptor = match &fit.x {
        XAxis::Rank => None,
        XAxis::Metric(key) => data.registry.get(key),
    };

    let x_extent = scale::extent(fit.points.iter().map(|p| p.x)).unwrap_or((0.0, 1.0));
    let y_extent = scale::extent(fit.points.iter().map(|p| p.y)).unwrap_or((0.0, 1.0));
    let population_extent =
        scale::extent(fit.points.iter().map(|p| p.population)).unwrap_or((0.0, 1.0));

    let x_scale = LinearScale::new(x_extent, (0.0, size.width));
    let y_scale = LinearScale::new(y_extent, (size.height, 0.0));
    let radius = SqrtScale::new(population_extent, BUBBLE_RADIUS);

    let ramp = y_descriptor.map_or(&[][..], |d| data.deployment.colors.for_descriptor(d));
    let color_extent = data.stats.distribution(&data.dataset, &fit.y).extent();

    let points = fit
        .points
        .iter()
        .map(|p| ScatterPointSpec {
            geoid: p.geoid.clone(),
            x: p.x,
            y: p.y,
            cx: x_scale.apply(p.x),
            cy: y_scale.apply(p.y),
            radius: radius.apply(p.population),
            color: bucket_color(ramp, color_extent, p.y),
        })
        .collect();

    let line = fit.regression;
    let trend = (line.slope.is_finite() && line.intercept.is_finite()).then(|| TrendLine {
        x1: x_scale.apply(x_extent.0),
        y1: y_scale.apply(line.predict(x_extent.0)),
        x2: x_scale.apply(x_extent.1),
        y2: y_scale.apply(line.predict(x_extent.1)),
    });

    let y_label = data.registry.label(&fit.y).to_string();
    let (x_label, x_short) = match &fit.x {
        XAxis::Rank => (RANK_AXIS_LABEL.to_string(), "Rank".to_string()),
        XAxis::Metric(key) => {
            let label = data.registry.label(key).to_string();
            (label.clone(), label)
        }
    };

    ScatterPlotSpec {
        subtitle: format!("{y_label} by {x_short}"),
        size,
        x_axis: AxisSpec {
            label: x_label,
            domain: x_extent,
            ticks: tick_labels(x_extent, x_descriptor),
        },
        y_axis: AxisSpec {
            label: y_label,
            domain: y_extent,
            ticks: tick_labels(y_extent, y_descriptor),
        },
        points,
        trend,
        r2_label: format::r_squared(line.r2),
    }
}

fn tick_labels(domain: (f64, f64), descriptor: Option<&MetricDescriptor>) -> Vec<String> {
    scale::ticks(domain, TICK_COUNT)
        .into_iter()
        .map(|v| descriptor.map_or_else(|| format!("{v:.0}"), |d| format::compact(d, v)))
        .collect()
}
