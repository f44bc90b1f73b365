//! One-shot subcommands.

use tract_explorer_dataset::{DatasetError, DatasetSource, Tract};
use tract_explorer_metrics::{MetricsError, format, registry};
use tract_explorer_metrics_models::{Deployment, XAxis};
use tract_explorer_stats::{Regression, regression};
use tract_explorer_view::DataContext;
use tract_explorer_view::detail::{self, Subject};
use tract_explorer_view::legend::build_legend;
use tract_explorer_view_models::RankLabel;

use crate::terminal;

/// Loads the dataset and derives its statistics.
///
/// # Errors
///
/// Returns [`DatasetError`] if the data cannot be loaded.
pub async fn load_context(
    deployment: Deployment,
    source: &DatasetSource,
) -> Result<DataContext, DatasetError> {
    let dataset = tract_explorer_dataset::load(source).await?;
    Ok(DataContext::new(deployment, dataset))
}

pub fn deployments() {
    for deployment in registry::all_deployments() {
        println!(
            "{:<16} {} ({})",
            deployment.id, deployment.title, deployment.jurisdiction_name
        );
    }
}

/// Prints the jurisdiction totals panel.
pub fn summary(data: &DataContext) {
    println!(
        "{} ({} tracts)",
        data.deployment.jurisdiction_name,
        data.dataset.len()
    );
    println!();

    for stat in detail::summary_stats(data, Subject::Jurisdiction) {
        println!("  {:<28} {}", stat.label, stat.value_label);
    }
    println!();

    println!("Race composition");
    for segment in detail::race_segments(data, Subject::Jurisdiction) {
        println!(
            "  {:<10} {:>10}  {}",
            segment.label,
            format::thousands(segment.count),
            terminal::share_bar(segment.share)
        );
    }
}

/// Tracts with a value for `metric`, highest first (ties by `GEOID`),
/// with their rank among all tracts that have a value.
pub fn top_tracts<'a>(
    data: &'a DataContext,
    metric: &str,
    limit: usize,
) -> Vec<(RankLabel, &'a Tract, f64)> {
    let distribution = data.stats.distribution(&data.dataset, metric);

    let mut rows: Vec<(&Tract, f64)> = data
        .dataset
        .iter()
        .filter_map(|t| t.metric(metric).map(|v| (t, v)))
        .collect();
    rows.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.geoid().cmp(b.0.geoid())));

    rows.into_iter()
        .take(limit)
        .filter_map(|(tract, value)| {
            let rank = distribution.rank_of(value)?;
            Some((
                RankLabel {
                    rank,
                    total: distribution.len(),
                },
                tract,
                value,
            ))
        })
        .collect()
}

/// Prints the top `limit` tracts for `metric`.
///
/// # Errors
///
/// Returns [`MetricsError`] if the metric is not registered.
pub fn rank(data: &DataContext, metric: &str, limit: usize) -> Result<(), MetricsError> {
    let descriptor = data.registry.require(metric)?;
    println!("{}", descriptor.label);

    for (rank, tract, value) in top_tracts(data, metric, limit) {
        println!(
            "  {:>12}  Census Tract {:<10} {}",
            rank.to_string(),
            tract.name(),
            format::detailed(descriptor.kind, value)
        );
    }
    Ok(())
}

/// Fits `y` against `x` (a metric key or `rank`).
///
/// # Errors
///
/// Returns [`MetricsError`] if either metric is unknown or not plottable.
pub fn fit(data: &DataContext, y: &str, x: &str) -> Result<(XAxis, Regression), MetricsError> {
    data.registry.require_map_metric(y)?;
    let axis = XAxis::from_key(x);
    data.registry.require_x_axis(&axis)?;

    let points = regression::series(
        &data.dataset,
        y,
        &axis,
        &data.deployment.aggregation.population,
    );
    Ok((axis, Regression::fit(&points)))
}

/// Prints the least-squares fit of `y` against `x`.
///
/// # Errors
///
/// Returns [`MetricsError`] if either metric is unknown or not plottable.
pub fn regress(data: &DataContext, y: &str, x: &str) -> Result<(), MetricsError> {
    let (axis, line) = fit(data, y, x)?;
    let x_label = match &axis {
        XAxis::Rank => tract_explorer_view::scatter::RANK_AXIS_LABEL,
        XAxis::Metric(key) => data.registry.label(key),
    };

    println!("{} by {x_label}", data.registry.label(y));
    println!("  tracts     {}", data.dataset.len());
    println!("  slope      {}", coefficient(line.slope));
    println!("  intercept  {}", coefficient(line.intercept));
    println!("  {}", format::r_squared(line.r2));
    Ok(())
}

fn coefficient(value: f64) -> String {
    format::optional(value.is_finite().then_some(value), |v| format!("{v:.4}"))
}

/// Prints the map legend for `metric`.
///
/// # Errors
///
/// Returns [`MetricsError`] if the metric is unknown or not plottable.
pub fn legend(data: &DataContext, metric: &str) -> Result<(), MetricsError> {
    let descriptor = data.registry.require_map_metric(metric)?;
    print!("{}", terminal::render_legend(&build_legend(data, descriptor)));
    Ok(())
}
