#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Visual descriptions produced by the view layer.
//!
//! Every type here is plain data: what a surface should draw, with all
//! values already formatted. Surfaces render these; they never compute
//! statistics themselves.

use serde::{Deserialize, Serialize};
use tract_explorer_metrics_models::{Color, MetricCategory};
use tract_explorer_tract_models::{Bounds, LngLat};

/// One stop of an interpolated fill color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    /// Metric value at this stop.
    pub value: f64,
    /// Color at this stop.
    pub color: Color,
}

/// Linear interpolation of a tract property over color stops. Tracts
/// without the property are colored as if their value were zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorExpression {
    /// Property the fill is driven by.
    pub metric: String,
    /// Stops in ascending value order.
    pub stops: Vec<ColorStop>,
}

impl ColorExpression {
    /// Renders the expression in the Mapbox GL style-spec form:
    /// `["interpolate", ["linear"], ["coalesce", ["get", m], 0], v0, c0, ...]`.
    #[must_use]
    pub fn to_style_json(&self) -> serde_json::Value {
        let mut expr = vec![
            serde_json::json!("interpolate"),
            serde_json::json!(["linear"]),
            serde_json::json!(["coalesce", ["get", self.metric], 0]),
        ];
        for stop in &self.stops {
            expr.push(serde_json::json!(stop.value));
            expr.push(serde_json::json!(stop.color.as_str()));
        }
        serde_json::Value::Array(expr)
    }
}

/// One row of the map legend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendEntry {
    /// Value at this row.
    pub value: f64,
    /// Formatted value.
    pub label: String,
    /// Swatch color.
    pub color: Color,
}

/// The map legend for the active metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendSpec {
    /// Metric label.
    pub title: String,
    /// Rows from the highest value down.
    pub entries: Vec<LegendEntry>,
    /// Formatted median, `"N/A"` if no tract has a value.
    pub median_label: String,
}

/// A position out of a total, displayed as `"r of N"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankLabel {
    /// 1-based rank.
    pub rank: usize,
    /// Number of ranked items.
    pub total: usize,
}

impl std::fmt::Display for RankLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} of {}", self.rank, self.total)
    }
}

/// A headline statistic at the top of the detail panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryStat {
    /// Metric key.
    pub metric: String,
    /// Caption (e.g. "Total Population").
    pub label: String,
    /// Formatted value.
    pub value_label: String,
    /// Rank among tracts; absent for the jurisdiction view.
    pub rank: Option<usize>,
}

/// One segment of the race composition bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceSegment {
    /// Category label.
    pub label: String,
    /// Head count.
    pub count: f64,
    /// Share of the charted total in `0.0..=1.0`.
    pub share: f64,
    /// Segment color.
    pub color: Color,
}

/// A horizontal lollipop placing one value against the metric's
/// min / median / max across all tracts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LollipopSpec {
    /// Metric key.
    pub metric: String,
    /// Chart title.
    pub title: String,
    /// Value being placed, if present.
    pub value: Option<f64>,
    /// Formatted value.
    pub value_label: String,
    /// Smallest value across tracts.
    pub min: f64,
    /// Median across tracts.
    pub median: Option<f64>,
    /// Largest value across tracts.
    pub max: f64,
    /// Formatted minimum.
    pub min_label: String,
    /// Formatted median.
    pub median_label: String,
    /// Formatted maximum.
    pub max_label: String,
    /// Rank of the value among tracts with a value.
    pub rank: Option<RankLabel>,
    /// The value describes the whole jurisdiction, so it is labeled
    /// "(Median)" instead of ranked.
    pub is_median: bool,
    /// Marker color.
    pub color: Color,
}

impl LollipopSpec {
    /// Position of `v` along the axis in `0.0..=1.0`. A zero-width axis
    /// puts everything in the middle.
    #[must_use]
    pub fn position(&self, v: f64) -> f64 {
        let span = self.max - self.min;
        if span <= 0.0 || !span.is_finite() {
            return 0.5;
        }
        ((v - self.min) / span).clamp(0.0, 1.0)
    }
}

/// What the detail panel describes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DetailSubject {
    /// The whole jurisdiction.
    Jurisdiction {
        /// Jurisdiction display name.
        name: String,
    },
    /// A single tract.
    Tract {
        /// Tract `GEOID`.
        geoid: String,
        /// Tract display name.
        name: String,
    },
}

impl DetailSubject {
    /// Heading shown above the panel.
    #[must_use]
    pub fn heading(&self) -> String {
        match self {
            Self::Jurisdiction { name } => name.clone(),
            Self::Tract { name, .. } => format!("Census Tract {name}"),
        }
    }

    /// `GEOID` of the tract, if a tract is described.
    #[must_use]
    pub fn geoid(&self) -> Option<&str> {
        match self {
            Self::Jurisdiction { .. } => None,
            Self::Tract { geoid, .. } => Some(geoid),
        }
    }
}

/// A tab header in the detail panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailTab {
    /// Category charted by this tab.
    pub category: MetricCategory,
    /// Tab caption.
    pub title: String,
    /// Whether this is the visible tab.
    pub active: bool,
}

/// Everything the detail panel shows for one subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailPanelSpec {
    /// Described tract or jurisdiction.
    pub subject: DetailSubject,
    /// Headline statistics.
    pub summary: Vec<SummaryStat>,
    /// Race composition bar.
    pub race: Vec<RaceSegment>,
    /// Tab headers.
    pub tabs: Vec<DetailTab>,
    /// Charts of the active tab.
    pub charts: Vec<LollipopSpec>,
}

impl DetailPanelSpec {
    /// Category of the visible tab.
    #[must_use]
    pub fn active_tab(&self) -> Option<MetricCategory> {
        self.tabs.iter().find(|t| t.active).map(|t| t.category)
    }
}

/// One metric line in the hover popup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopupLine {
    /// Metric label.
    pub label: String,
    /// Formatted value.
    pub value_label: String,
    /// Rank among tracts, `None` when it cannot be determined.
    pub rank: Option<RankLabel>,
}

/// The small popup following the pointer over a hovered tract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopupSpec {
    /// Anchor position.
    pub position: LngLat,
    /// Title (e.g. "Census Tract 40.02").
    pub title: String,
    /// Active metric first, then the x-axis metric when it is not rank.
    pub lines: Vec<PopupLine>,
}

/// An axis of a scatter plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisSpec {
    /// Axis caption.
    pub label: String,
    /// `(low, high)` data domain.
    pub domain: (f64, f64),
    /// Formatted tick values.
    pub ticks: Vec<String>,
}

/// A bubble on a scatter plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterPointSpec {
    /// Tract `GEOID`.
    pub geoid: String,
    /// Data x value.
    pub x: f64,
    /// Data y value.
    pub y: f64,
    /// Pixel x inside the plot area.
    pub cx: f64,
    /// Pixel y inside the plot area.
    pub cy: f64,
    /// Bubble radius in pixels, by population.
    pub radius: f64,
    /// Fill color, bucketed like the map.
    pub color: Color,
}

/// The dashed regression line, in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendLine {
    /// Start x.
    pub x1: f64,
    /// Start y.
    pub y1: f64,
    /// End x.
    pub x2: f64,
    /// End y.
    pub y2: f64,
}

/// Plot-area dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotSize {
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

/// A full scatter plot of one metric against the shared x-axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterPlotSpec {
    /// `"<y label> by <x label>"`.
    pub subtitle: String,
    /// Plot-area size the pixel coordinates were laid out for.
    pub size: PlotSize,
    /// Horizontal axis.
    pub x_axis: AxisSpec,
    /// Vertical axis.
    pub y_axis: AxisSpec,
    /// Bubbles in draw order.
    pub points: Vec<ScatterPointSpec>,
    /// Regression line, absent when the fit is not finite.
    pub trend: Option<TrendLine>,
    /// `"R² = 0.123"` or `"R² = N/A"`.
    pub r2_label: String,
}

/// A transient error message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BannerSpec {
    /// Message text.
    pub message: String,
    /// How long to show it.
    pub duration_ms: u64,
}

/// A map camera position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraView {
    /// Center coordinate.
    pub center: LngLat,
    /// Zoom level.
    pub zoom: f64,
}

/// Options for fitting the camera to a tract.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitOptions {
    /// Target area.
    pub bounds: Bounds,
    /// Padding in pixels.
    pub padding: u32,
    /// Maximum zoom.
    pub max_zoom: f64,
    /// Animation length.
    pub duration_ms: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_json_shape() {
        let expr = ColorExpression {
            metric: "Percent_White".to_string(),
            stops: vec![
                ColorStop {
                    value: 0.0,
                    color: Color("#ffffff".to_string()),
                },
                ColorStop {
                    value: 50.0,
                    color: Color("#000000".to_string()),
                },
            ],
        };
        assert_eq!(
            expr.to_style_json(),
            serde_json::json!([
                "interpolate",
                ["linear"],
                ["coalesce", ["get", "Percent_White"], 0],
                0.0,
                "#ffffff",
                50.0,
                "#000000"
            ])
        );
    }

    #[test]
    fn rank_label_display() {
        assert_eq!(RankLabel { rank: 3, total: 97 }.to_string(), "3 of 97");
    }

    #[test]
    fn subject_heading() {
        let tract = DetailSubject::Tract {
            geoid: "22033004002".to_string(),
            name: "40.02".to_string(),
        };
        assert_eq!(tract.heading(), "Census Tract 40.02");
        assert_eq!(tract.geoid(), Some("22033004002"));

        let all = DetailSubject::Jurisdiction {
            name: "East Baton Rouge Parish".to_string(),
        };
        assert_eq!(all.heading(), "East Baton Rouge Parish");
        assert_eq!(all.geoid(), None);
    }

    #[test]
    fn lollipop_position_clamps() {
        let spec = LollipopSpec {
            metric: "m".to_string(),
            title: "M".to_string(),
            value: Some(5.0),
            value_label: "5".to_string(),
            min: 0.0,
            median: Some(4.0),
            max: 10.0,
            min_label: "0".to_string(),
            median_label: "4".to_string(),
            max_label: "10".to_string(),
            rank: None,
            is_median: false,
            color: Color("#000000".to_string()),
        };
        assert_eq!(spec.position(5.0), 0.5);
        assert_eq!(spec.position(-3.0), 0.0);
        assert_eq!(spec.position(30.0), 1.0);

        let flat = LollipopSpec {
            max: 0.0,
            ..spec
        };
        assert_eq!(flat.position(0.0), 0.5);
    }
}
