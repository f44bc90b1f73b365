#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Metric descriptor, color ramp, and deployment configuration types.
//!
//! A deployment describes one study area: which metrics exist, how they
//! are labeled and formatted, which ones are aggregated, ranked, or shown
//! in the detail panel, and the color ramps and camera defaults used by
//! the map. Deployments are deserialized from TOML files embedded at
//! compile time.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Key of the `rank` pseudo-metric, usable only as a scatter-plot x-axis.
pub const RANK_METRIC: &str = "rank";

/// Number of colors in every ramp.
pub const RAMP_STEPS: usize = 8;

/// How the values of a metric are interpreted and formatted.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ValueKind {
    /// Plain counts (population, incidents, permits).
    Count,
    /// Percentage points on a 0-100 scale.
    Percentage,
    /// Dollar amounts.
    Currency,
    /// A 1-based position.
    Rank,
}

/// Grouping of metrics for pickers, detail tabs, and color ramps.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MetricCategory {
    /// Population, income, race/ethnicity, households.
    Demographics,
    /// Tenure, housing stock, rents, conditions.
    Housing,
    /// Health outcome prevalence.
    Health,
    /// Pseudo-metrics and anything uncategorized.
    Other,
}

impl MetricCategory {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Demographics, Self::Housing, Self::Health, Self::Other]
    }

    /// Human-readable title used for picker groups and tab headers.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Demographics => "Demographics",
            Self::Housing => "Housing",
            Self::Health => "Health",
            Self::Other => "Other",
        }
    }
}

/// Static registry entry for one metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricDescriptor {
    /// Property key in the tract records (e.g. `"Percent_Below_Poverty"`).
    pub key: String,
    /// Display label (e.g. `"Below Poverty %"`).
    pub label: String,
    /// Value interpretation.
    pub kind: ValueKind,
    /// Picker/tab/ramp grouping.
    pub category: MetricCategory,
    /// Decimal places for compact (map legend, popup) formatting.
    #[serde(default)]
    pub precision: u8,
}

/// A CSS hex color (e.g. `"#fff5f0"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub String);

impl Color {
    /// Returns the color as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the color is a `#rrggbb` hex triplet.
    #[must_use]
    pub fn is_hex(&self) -> bool {
        self.0.len() == 7
            && self.0.starts_with('#')
            && self.0[1..].chars().all(|c| c.is_ascii_hexdigit())
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The ordered color ramps of a deployment, lightest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorRamps {
    /// Fallback ramp for count-like metrics.
    pub counts: Vec<Color>,
    /// Fallback ramp for uncategorized percentages.
    pub percentages: Vec<Color>,
    /// Ramp for [`MetricCategory::Demographics`].
    pub demographics: Vec<Color>,
    /// Ramp for [`MetricCategory::Housing`].
    pub housing: Vec<Color>,
    /// Ramp for [`MetricCategory::Health`].
    pub health: Vec<Color>,
}

impl ColorRamps {
    /// Picks the ramp for a metric: its category ramp when it has one,
    /// otherwise the percentage or count fallback by value kind.
    #[must_use]
    pub fn for_descriptor(&self, descriptor: &MetricDescriptor) -> &[Color] {
        match descriptor.category {
            MetricCategory::Demographics => &self.demographics,
            MetricCategory::Housing => &self.housing,
            MetricCategory::Health => &self.health,
            MetricCategory::Other => match descriptor.kind {
                ValueKind::Percentage => &self.percentages,
                ValueKind::Count | ValueKind::Currency | ValueKind::Rank => &self.counts,
            },
        }
    }

    /// Iterates over `(name, ramp)` pairs.
    pub fn named(&self) -> impl Iterator<Item = (&'static str, &[Color])> {
        [
            ("counts", self.counts.as_slice()),
            ("percentages", self.percentages.as_slice()),
            ("demographics", self.demographics.as_slice()),
            ("housing", self.housing.as_slice()),
            ("health", self.health.as_slice()),
        ]
        .into_iter()
    }
}

/// Map camera defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    /// Basemap style URL.
    pub style: String,
    /// Initial center as `[lng, lat]`.
    pub center: [f64; 2],
    /// Initial zoom level.
    pub zoom: f64,
    /// Padding in pixels when fitting a frozen tract.
    pub fit_padding: u32,
    /// Maximum zoom when fitting a frozen tract.
    pub fit_max_zoom: f64,
    /// Camera animation duration in milliseconds.
    pub animation_ms: u32,
    /// Fill opacity of the choropleth layer.
    pub fill_opacity: f64,
    /// Highlight outline color.
    pub highlight_color: Color,
}

/// Initial view selections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewDefaults {
    /// Metric encoded on the map at startup.
    pub metric: String,
    /// Scatter-plot x-axis at startup (a metric key or `"rank"`).
    pub x_axis: String,
}

/// A percentage derived as `numerator / population` over the whole area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatioSpec {
    /// Key the result is stored under.
    pub metric: String,
    /// Count attribute summed for the numerator.
    pub numerator: String,
}

/// A units-weighted average of a per-tract percentage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedShareSpec {
    /// Percentage attribute to average (also the result key).
    pub metric: String,
    /// Weight attribute (e.g. `"Total_Housing_Units"`).
    pub weight: String,
}

/// Which attributes are aggregated how.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationConfig {
    /// Population attribute used as the ratio denominator.
    pub population: String,
    /// Additive attributes summed across tracts.
    pub sums: Vec<String>,
    /// Percentages derived from summed numerators.
    #[serde(default)]
    pub ratios: Vec<RatioSpec>,
    /// Income-like attributes averaged over strictly positive values.
    #[serde(default)]
    pub positive_means: Vec<String>,
    /// Units-weighted percentage averages.
    #[serde(default)]
    pub weighted_shares: Vec<WeightedShareSpec>,
    /// Attributes whose jurisdiction value is the median tract value.
    #[serde(default)]
    pub medians: Vec<String>,
    /// Attributes ranked per tract.
    #[serde(default)]
    pub ranked: Vec<String>,
}

/// A headline statistic at the top of the detail panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryStatConfig {
    /// Metric key.
    pub metric: String,
    /// Label under the value.
    pub label: String,
}

/// One segment of the race/ethnicity composition bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceCategoryConfig {
    /// Segment label (e.g. `"White"`).
    pub label: String,
    /// Count attribute for the segment.
    pub count_metric: String,
    /// Segment color.
    pub color: Color,
}

/// A tab of lollipop charts in the detail panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailTabConfig {
    /// Tab grouping.
    pub category: MetricCategory,
    /// Metrics charted in this tab, in display order.
    pub metrics: Vec<String>,
}

/// Everything that describes one study area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deployment {
    /// Unique deployment identifier (e.g. `"baton_rouge"`).
    pub id: String,
    /// Application title.
    pub title: String,
    /// Name shown for the jurisdiction-wide view.
    pub jurisdiction_name: String,
    /// Relative path of the tract `GeoJSON`.
    pub data_path: String,
    /// Camera and map styling.
    pub map: MapConfig,
    /// Initial picker selections.
    pub defaults: ViewDefaults,
    /// Color ramps.
    pub colors: ColorRamps,
    /// Aggregation lists.
    pub aggregation: AggregationConfig,
    /// Headline statistics.
    pub summary: Vec<SummaryStatConfig>,
    /// Race/ethnicity bar segments, in display order.
    pub race: Vec<RaceCategoryConfig>,
    /// Detail panel tabs, in display order.
    pub tabs: Vec<DetailTabConfig>,
    /// Metric registry.
    pub metrics: Vec<MetricDescriptor>,
}

/// The scatter-plot x-axis choice.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum XAxis {
    /// Position after sorting tracts by the y metric, highest first.
    Rank,
    /// A stored metric.
    Metric(String),
}

impl XAxis {
    /// Parses an x-axis key, mapping `"rank"` to [`XAxis::Rank`].
    #[must_use]
    pub fn from_key(key: &str) -> Self {
        if key == RANK_METRIC {
            Self::Rank
        } else {
            Self::Metric(key.to_string())
        }
    }

    /// Returns the key of this axis.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Rank => RANK_METRIC,
            Self::Metric(key) => key,
        }
    }
}

impl From<String> for XAxis {
    fn from(value: String) -> Self {
        Self::from_key(&value)
    }
}

impl From<XAxis> for String {
    fn from(value: XAxis) -> Self {
        value.key().to_string()
    }
}

impl std::fmt::Display for XAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}
