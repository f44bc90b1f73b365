//! Scatter series and ordinary least squares regression.

use tract_explorer_dataset::Dataset;
use tract_explorer_metrics_models::XAxis;

/// One tract plotted on a scatter chart.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    /// Tract `GEOID`.
    pub geoid: String,
    /// Tract display name.
    pub name: String,
    /// Horizontal value (a metric, or a 1-based rank).
    pub x: f64,
    /// Vertical value.
    pub y: f64,
    /// Population, used for bubble size.
    pub population: f64,
}

/// Builds the scatter series for `y_metric` against `x_axis`.
///
/// Missing values are plotted as zero. With [`XAxis::Rank`] each tract's
/// x is its 1-based position after sorting descending by y (ties by
/// `GEOID`). The returned points are in draw order: ascending y, so the
/// largest values are drawn last.
#[must_use]
pub fn series(
    dataset: &Dataset,
    y_metric: &str,
    x_axis: &XAxis,
    population_metric: &str,
) -> Vec<SeriesPoint> {
    let mut points: Vec<SeriesPoint> = dataset
        .iter()
        .map(|t| SeriesPoint {
            geoid: t.geoid().to_string(),
            name: t.name().to_string(),
            x: match x_axis {
                XAxis::Rank => 0.0,
                XAxis::Metric(key) => t.metric_or_zero(key),
            },
            y: t.metric_or_zero(y_metric),
            population: t.metric_or_zero(population_metric),
        })
        .collect();

    if *x_axis == XAxis::Rank {
        points.sort_by(|a, b| b.y.total_cmp(&a.y).then_with(|| a.geoid.cmp(&b.geoid)));
        for (position, point) in points.iter_mut().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let rank = (position + 1) as f64;
            point.x = rank;
        }
    }

    sort_draw_order(&mut points);
    points
}

/// Sorts points ascending by y (ties by `GEOID`), the resting draw
/// order of a scatter chart.
pub fn sort_draw_order(points: &mut [SeriesPoint]) {
    points.sort_by(|a, b| a.y.total_cmp(&b.y).then_with(|| a.geoid.cmp(&b.geoid)));
}

/// A fitted line `y = slope * x + intercept` with its coefficient of
/// determination.
///
/// Degenerate input (fewer than two distinct x values, or constant y)
/// yields non-finite fields rather than an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Regression {
    /// Slope of the fitted line.
    pub slope: f64,
    /// Intercept of the fitted line.
    pub intercept: f64,
    /// `1 - SS_res / SS_tot`.
    pub r2: f64,
}

impl Regression {
    /// Fits the series by ordinary least squares.
    #[must_use]
    pub fn fit(points: &[SeriesPoint]) -> Self {
        let pairs: Vec<(f64, f64)> = points.iter().map(|p| (p.x, p.y)).collect();
        Self::fit_pairs(&pairs)
    }

    /// Fits `(x, y)` pairs by ordinary least squares.
    #[must_use]
    pub fn fit_pairs(pairs: &[(f64, f64)]) -> Self {
        #[allow(clippy::cast_precision_loss)]
        let n = pairs.len() as f64;

        let (sum_x, sum_y, sum_xy, sum_x2) = pairs.iter().fold(
            (0.0, 0.0, 0.0, 0.0),
            |(sx, sy, sxy, sx2), &(x, y)| (sx + x, sy + y, x.mul_add(y, sxy), x.mul_add(x, sx2)),
        );

        let slope = n.mul_add(sum_xy, -(sum_x * sum_y)) / n.mul_add(sum_x2, -(sum_x * sum_x));
        let intercept = slope.mul_add(-sum_x, sum_y) / n;
        let y_mean = sum_y / n;

        let (ss_total, ss_residual) = pairs.iter().fold((0.0_f64, 0.0_f64), |(tot, res), &(x, y)| {
            let deviation = y - y_mean;
            let residual = y - slope.mul_add(x, intercept);
            (
                deviation.mul_add(deviation, tot),
                residual.mul_add(residual, res),
            )
        });

        let r2 = 1.0 - ss_residual / ss_total;

        log::trace!("Fitted {n} points: slope={slope} intercept={intercept} r2={r2}");

        Self {
            slope,
            intercept,
            r2,
        }
    }

    /// Value of the fitted line at `x`.
    #[must_use]
    pub fn predict(&self, x: f64) -> f64 {
        self.slope.mul_add(x, self.intercept)
    }

    /// Whether every field is a finite number.
    #[must_use]
    pub const fn is_finite(&self) -> bool {
        self.slope.is_finite() && self.intercept.is_finite() && self.r2.is_finite()
    }
}
