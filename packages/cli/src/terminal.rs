//! Surfaces that print what they are asked to draw.
//!
//! Every description is also logged as JSON at `trace` level, which is what a
//! browser bridge would forward to the renderer.

use std::fmt::Write as _;

use serde::Serialize;
use tract_explorer_view::{
    BannerSurface, DetailSurface, LegendSurface, MapSurface, ScatterSurface, SurfaceError,
    Surfaces,
};
use tract_explorer_view_models::{
    BannerSpec, CameraView, ColorExpression, DetailPanelSpec, FitOptions, LegendSpec, PopupSpec,
    ScatterPlotSpec,
};

const BAR_WIDTH: usize = 30;

fn trace<T: Serialize>(surface: &str, spec: &T) -> Result<(), SurfaceError> {
    if log::log_enabled!(log::Level::Trace) {
        log::trace!("{surface}: {}", serde_json::to_string(spec)?);
    }
    Ok(())
}

/// A horizontal bar `share` (0..=1) of [`BAR_WIDTH`] wide, with the
/// percentage after it.
#[must_use]
pub fn share_bar(share: f64) -> String {
    let share = if share.is_finite() {
        share.clamp(0.0, 1.0)
    } else {
        0.0
    };
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let filled = (share * BAR_WIDTH as f64).round() as usize;
    format!(
        "{}{} {:.1}%",
        "#".repeat(filled),
        ".".repeat(BAR_WIDTH - filled),
        share * 100.0
    )
}

#[must_use]
pub fn render_legend(legend: &LegendSpec) -> String {
    let mut out = format!("{}\n", legend.title);
    for entry in &legend.entries {
        let _ = writeln!(out, "  {}  {}", entry.color.as_str(), entry.label);
    }
    let _ = writeln!(out, "  median {}", legend.median_label);
    out
}

/// Text rendition of the detail panel.
#[must_use]
pub fn render_detail(panel: &DetailPanelSpec) -> String {
    let mut out = format!("== {} ==\n", panel.subject.heading());

    for stat in &panel.summary {
        let rank = stat
            .rank
            .map_or_else(String::new, |r| format!("  (rank {r})"));
        let _ = writeln!(out, "  {:<28} {}{rank}", stat.label, stat.value_label);
    }

    out.push_str("  Race\n");
    for segment in &panel.race {
        let _ = writeln!(out, "    {:<8} {}", segment.label, share_bar(segment.share));
    }

    let tabs: Vec<String> = panel
        .tabs
        .iter()
        .map(|t| {
            if t.active {
                format!("[{}]", t.title)
            } else {
                t.title.clone()
            }
        })
        .collect();
    let _ = writeln!(out, "  {}", tabs.join(" | "));

    for chart in &panel.charts {
        let rank = if chart.is_median {
            "  (Median)".to_string()
        } else {
            chart.rank.map_or_else(String::new, |r| format!("  {r}"))
        };
        let _ = writeln!(
            out,
            "    {:<36} {:>12}{rank}   [{} .. {} .. {}]",
            chart.title, chart.value_label, chart.min_label, chart.median_label, chart.max_label
        );
    }
    out
}

#[must_use]
pub fn render_popup(popup: &PopupSpec) -> String {
    let mut out = format!("{}\n", popup.title);
    for line in &popup.lines {
        let rank = line
            .rank
            .map_or_else(String::new, |r| format!(" ({r})"));
        let _ = writeln!(out, "  {}: {}{rank}", line.label, line.value_label);
    }
    out
}

pub struct TerminalMap;

impl MapSurface for TerminalMap {
    fn set_fill(&mut self, expression: &ColorExpression) -> Result<(), SurfaceError> {
        trace("map fill", &expression.to_style_json())?;
        println!(
            "Map colored by {} ({} stops)",
            expression.metric,
            expression.stops.len()
        );
        Ok(())
    }

    fn set_highlight(&mut self, geoid: Option<&str>) -> Result<(), SurfaceError> {
        match geoid {
            Some(geoid) => println!("Map outline on {geoid}"),
            None => log::debug!("Map outline cleared"),
        }
        Ok(())
    }

    fn fit_bounds(&mut self, options: &FitOptions) -> Result<(), SurfaceError> {
        trace("map fit", options)?;
        let b = options.bounds;
        println!(
            "Camera fit to [{:.4}, {:.4}, {:.4}, {:.4}]",
            b.west, b.south, b.east, b.north
        );
        Ok(())
    }

    fn fly_to(&mut self, view: &CameraView, duration_ms: u32) -> Result<(), SurfaceError> {
        println!(
            "Camera back to ({:.4}, {:.4}) zoom {:.2} over {duration_ms}ms",
            view.center.lng, view.center.lat, view.zoom
        );
        Ok(())
    }

    fn show_popup(&mut self, popup: &PopupSpec) -> Result<(), SurfaceError> {
        trace("popup", popup)?;
        print!("{}", render_popup(popup));
        Ok(())
    }

    fn hide_popup(&mut self) -> Result<(), SurfaceError> {
        log::debug!("Popup hidden");
        Ok(())
    }
}

pub struct TerminalLegend;

impl LegendSurface for TerminalLegend {
    fn render_legend(&mut self, legend: &LegendSpec) -> Result<(), SurfaceError> {
        trace("legend", legend)?;
        print!("{}", render_legend(legend));
        Ok(())
    }
}

pub struct TerminalDetail;

impl DetailSurface for TerminalDetail {
    fn render_detail(&mut self, panel: &DetailPanelSpec) -> Result<(), SurfaceError> {
        trace("detail", panel)?;
        print!("{}", render_detail(panel));
        Ok(())
    }
}

/// A named scatter plot that prints a one-line summary per bind.
pub struct TerminalScatter {
    name: String,
}

impl TerminalScatter {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl ScatterSurface for TerminalScatter {
    fn bind(&mut self, plot: &ScatterPlotSpec) -> Result<(), SurfaceError> {
        trace(&self.name, plot)?;
        println!(
            "[{}] {}: {} points, {}, {:.0}x{:.0}",
            self.name,
            plot.subtitle,
            plot.points.len(),
            plot.r2_label,
            plot.size.width,
            plot.size.height
        );
        Ok(())
    }

    fn highlight(&mut self, geoid: Option<&str>) -> Result<(), SurfaceError> {
        if let Some(geoid) = geoid {
            println!("[{}] bubble {geoid} raised", self.name);
        }
        Ok(())
    }

    fn reorder(&mut self, order: &[String]) -> Result<(), SurfaceError> {
        log::debug!("[{}] restored draw order of {} bubbles", self.name, order.len());
        Ok(())
    }
}

pub struct TerminalBanner;

impl BannerSurface for TerminalBanner {
    fn show_banner(&mut self, banner: &BannerSpec) -> Result<(), SurfaceError> {
        eprintln!("!! {}", banner.message);
        Ok(())
    }
}

#[must_use]
pub fn surfaces() -> Surfaces {
    Surfaces {
        map: Box::new(TerminalMap),
        legend: Box::new(TerminalLegend),
        detail: Box::new(TerminalDetail),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tract_explorer_metrics_models::Color;
    use tract_explorer_metrics_models::MetricCategory;
    use tract_explorer_view_models::{
        DetailSubject, DetailTab, LegendEntry, LollipopSpec, PopupLine, RankLabel,
    };
    use tract_explorer_tract_models::LngLat;

    #[test]
    fn share_bar_width_is_fixed() {
        assert_eq!(share_bar(0.5), format!("{}{} 50.0%", "#".repeat(15), ".".repeat(15)));
        assert_eq!(share_bar(0.0), format!("{} 0.0%", ".".repeat(30)));
        assert_eq!(share_bar(f64::NAN), format!("{} 0.0%", ".".repeat(30)));
        assert!(share_bar(2.0).starts_with(&"#".repeat(30)));
    }

    #[test]
    fn legend_lists_entries_then_median() {
        let legend = LegendSpec {
            title: "Below Poverty %".to_string(),
            entries: vec![
                LegendEntry {
                    value: 30.0,
                    label: "30%".to_string(),
                    color: Color("#a50f15".to_string()),
                },
                LegendEntry {
                    value: 10.0,
                    label: "10%".to_string(),
                    color: Color("#fff5f0".to_string()),
                },
            ],
            median_label: "20%".to_string(),
        };

        assert_eq!(
            render_legend(&legend),
            "Below Poverty %\n  #a50f15  30%\n  #fff5f0  10%\n  median 20%\n"
        );
    }

    #[test]
    fn popup_shows_ranks() {
        let popup = PopupSpec {
            position: LngLat::new(0.0, 0.0),
            title: "Census Tract 1".to_string(),
            lines: vec![PopupLine {
                label: "Total Population".to_string(),
                value_label: "1,000".to_string(),
                rank: Some(RankLabel { rank: 2, total: 3 }),
            }],
        };

        assert_eq!(
            render_popup(&popup),
            "Census Tract 1\n  Total Population: 1,000 (2 of 3)\n"
        );
    }

    fn chart(rank: Option<RankLabel>, is_median: bool) -> LollipopSpec {
        LollipopSpec {
            metric: "Percent_Below_Poverty".to_string(),
            title: "Below Poverty %".to_string(),
            value: Some(20.0),
            value_label: "20.0%".to_string(),
            min: 10.0,
            median: Some(20.0),
            max: 30.0,
            min_label: "10.0%".to_string(),
            median_label: "20.0%".to_string(),
            max_label: "30.0%".to_string(),
            rank,
            is_median,
            color: Color("#fb6a4a".to_string()),
        }
    }

    fn panel(charts: Vec<LollipopSpec>) -> DetailPanelSpec {
        DetailPanelSpec {
            subject: DetailSubject::Jurisdiction {
                name: "East Baton Rouge Parish".to_string(),
            },
            summary: vec![],
            race: vec![],
            tabs: vec![DetailTab {
                category: MetricCategory::Demographics,
                title: "Demographics".to_string(),
                active: true,
            }],
            charts,
        }
    }

    #[test]
    fn jurisdiction_charts_are_labeled_median() {
        let text = render_detail(&panel(vec![chart(None, true)]));
        assert!(text.contains("20.0%  (Median)"));

        let text = render_detail(&panel(vec![chart(Some(RankLabel { rank: 2, total: 3 }), false)]));
        assert!(text.contains("20.0%  2 of 3"));
        assert!(!text.contains("(Median)"));
    }

    #[test]
    fn fill_traces_style_expression() {
        let expression = ColorExpression {
            metric: "ASTHMA".to_string(),
            stops: vec![],
        };
        assert!(TerminalMap.set_fill(&expression).is_ok());
        assert_eq!(
            expression.to_style_json()[2],
            serde_json::json!(["coalesce", ["get", "ASTHMA"], 0])
        );
    }
}
