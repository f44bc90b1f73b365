//! Hover popup content.

use tract_explorer_dataset::Tract;
use tract_explorer_metrics::format;
use tract_explorer_metrics_models::XAxis;
use tract_explorer_tract_models::LngLat;
use tract_explorer_view_models::{PopupLine, PopupSpec, RankLabel};

use crate::state::{DataContext, ViewConfig};

/// Builds the popup for `tract` at `position`: the active metric, then
/// the x-axis metric unless the x-axis is rank. Ranks are out of every
/// tract in the dataset.
#[must_use]
pub fn build_popup(
    data: &DataContext,
    tract: &Tract,
    config: &ViewConfig,
    position: LngLat,
) -> PopupSpec {
    let mut lines = vec![line(data, tract, &config.active_metric)];

    if let XAxis::Metric(key) = &config.x_axis
        && tract.metric(key).is_some()
    {
        lines.push(line(data, tract, key));
    }

    PopupSpec {
        position,
        title: format!("Census Tract {}", tract.name()),
        lines,
    }
}

fn line(data: &DataContext, tract: &Tract, metric: &str) -> PopupLine {
    let value = tract.metric(metric);
    let value_label = data.registry.get(metric).map_or_else(
        || format::optional(value, format::thousands),
        |d| format::optional(value, |v| format::compact(d, v)),
    );

    let rank = value.and_then(|v| {
        let distribution = data.stats.distribution(&data.dataset, metric);
        distribution.rank_of(v).map(|rank| RankLabel {
            rank,
            total: data.dataset.len(),
        })
    });

    PopupLine {
        label: data.registry.label(metric).to_string(),
        value_label,
        rank,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    fn config(x_axis: XAxis) -> ViewConfig {
        ViewConfig {
            active_metric: "Percent_Below_Poverty".to_string(),
            x_axis,
        }
    }

    #[test]
    fn rank_axis_shows_one_line() {
        let data = fixtures::context();
        let tract = data.dataset.get(fixtures::A).unwrap();
        let popup = build_popup(&data, tract, &config(XAxis::Rank), LngLat::new(0.5, 0.5));

        assert_eq!(popup.title, "Census Tract 1");
        assert_eq!(popup.lines.len(), 1);
        assert_eq!(popup.lines[0].rank, Some(RankLabel { rank: 2, total: 3 }));
        assert_eq!(popup.position, LngLat::new(0.5, 0.5));
    }

    #[test]
    fn metric_axis_adds_second_line() {
        let data = fixtures::context();
        let tract = data.dataset.get(fixtures::A).unwrap();
        let popup = build_popup(
            &data,
            tract,
            &config(XAxis::Metric("Median_Household_Income".to_string())),
            LngLat::new(0.5, 0.5),
        );

        assert_eq!(popup.lines.len(), 2);
        assert_eq!(popup.lines[1].value_label, "$40,000");
        assert_eq!(popup.lines[1].rank, Some(RankLabel { rank: 2, total: 3 }));
    }

    #[test]
    fn missing_x_value_is_omitted() {
        let data = fixtures::context();
        let tract = data.dataset.get(fixtures::C).unwrap();
        let popup = build_popup(
            &data,
            tract,
            &config(XAxis::Metric("Median_Household_Income".to_string())),
            LngLat::new(2.5, 0.5),
        );
        assert_eq!(popup.lines.len(), 1);
    }

    #[test]
    fn missing_active_value_has_no_rank() {
        let data = fixtures::context();
        let tract = data.dataset.get(fixtures::C).unwrap();
        let popup = build_popup(
            &data,
            tract,
            &ViewConfig {
                active_metric: "ASTHMA".to_string(),
                x_axis: XAxis::Rank,
            },
            LngLat::new(2.5, 0.5),
        );
        assert_eq!(popup.lines[0].value_label, "N/A");
        assert_eq!(popup.lines[0].rank, None);
    }
}
