//! Interactive exploration.
//!
//! Menu choices stand in for the browser's pointer and picker events and
//! are fed to the same [`ViewSynchronizer`] a web host would drive.

use dialoguer::{Input, Select};
use geo::InteriorPoint;
use tract_explorer_dataset::{DatasetSource, Tract};
use tract_explorer_metrics_models::{Deployment, ValueKind, XAxis};
use tract_explorer_tract_models::LngLat;
use tract_explorer_view::scatter::plot_area;
use tract_explorer_view::{FanOutReport, SelectionEvent, ViewSynchronizer, YBinding};

use crate::terminal::{self, TerminalBanner, TerminalScatter};

/// Actions offered in the explore menu.
enum Action {
    Metric,
    XAxis,
    HoverTract,
    ClickTract,
    ClickEmpty,
    LeaveMap,
    HoverBubble,
    ClickBubble,
    Tab,
    Resize,
    Quit,
}

impl Action {
    const ALL: &[Self] = &[
        Self::Metric,
        Self::XAxis,
        Self::HoverTract,
        Self::ClickTract,
        Self::ClickEmpty,
        Self::LeaveMap,
        Self::HoverBubble,
        Self::ClickBubble,
        Self::Tab,
        Self::Resize,
        Self::Quit,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Metric => "Change map metric",
            Self::XAxis => "Change scatter x-axis",
            Self::HoverTract => "Hover a tract on the map",
            Self::ClickTract => "Click a tract on the map",
            Self::ClickEmpty => "Click empty map",
            Self::LeaveMap => "Move pointer off the map",
            Self::HoverBubble => "Hover a scatter bubble",
            Self::ClickBubble => "Click a scatter bubble",
            Self::Tab => "Switch detail tab",
            Self::Resize => "Resize scatter plots",
            Self::Quit => "Quit",
        }
    }
}

/// Loads the data, draws the initial views, and runs the menu loop until
/// the user quits.
///
/// # Errors
///
/// Returns an error if loading fails (after the banner is shown) or a
/// prompt fails.
pub async fn run(
    deployment: Deployment,
    source: &DatasetSource,
) -> Result<(), Box<dyn std::error::Error>> {
    let grid: Vec<String> = deployment
        .summary
        .iter()
        .map(|s| s.metric.clone())
        .collect();

    let mut banner = TerminalBanner;
    let mut sync =
        tract_explorer_view::launch(deployment, source, terminal::surfaces(), &mut banner).await?;

    sync.add_scatter(YBinding::Active, Box::new(TerminalScatter::new("sidebar")))?;
    for metric in grid {
        let surface = Box::new(TerminalScatter::new(format!("grid {metric}")));
        sync.add_scatter(YBinding::Fixed(metric), surface)?;
    }

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();

    loop {
        println!();
        let idx = Select::new()
            .with_prompt(format!("Selection: {:?}", sync.selection()))
            .items(&labels)
            .default(0)
            .interact()?;

        let fan_out = match Action::ALL[idx] {
            Action::Metric => {
                let Some(metric) = pick_metric(&sync, "Map metric", false)? else {
                    continue;
                };
                sync.set_active_metric(&metric)?
            }
            Action::XAxis => {
                let Some(key) = pick_metric(&sync, "Scatter x-axis", true)? else {
                    continue;
                };
                sync.set_x_axis(XAxis::from_key(&key))?
            }
            Action::HoverTract => {
                let position = pick_position(&sync)?;
                sync.pointer_moved(position)
            }
            Action::ClickTract => {
                let position = pick_position(&sync)?;
                sync.pointer_clicked(position)
            }
            Action::ClickEmpty => sync.dispatch(SelectionEvent::ClickEmpty),
            Action::LeaveMap => sync.pointer_left(),
            Action::HoverBubble => {
                let geoid = pick_tract(&sync)?.geoid().to_string();
                sync.bubble_hovered(&geoid)?
            }
            Action::ClickBubble => {
                let geoid = pick_tract(&sync)?.geoid().to_string();
                sync.bubble_clicked(&geoid)?
            }
            Action::Tab => {
                pick_tab(&mut sync)?;
                FanOutReport::default()
            }
            Action::Resize => {
                let width: f64 = Input::new()
                    .with_prompt("Container width (px)")
                    .default(600.0)
                    .interact_text()?;
                let height: f64 = Input::new()
                    .with_prompt("Container height (px)")
                    .default(400.0)
                    .interact_text()?;
                sync.resize_all(plot_area(width, height))
            }
            Action::Quit => break,
        };

        if !fan_out.is_clean() {
            println!(
                "{} of {} scatter plots failed to update",
                fan_out.failures.len(),
                fan_out.attempted
            );
        }
    }

    Ok(())
}

/// Picks a metric grouped by category. With `with_rank`, "Rank" is
/// offered first. Returns `None` when the current choice is kept.
fn pick_metric(
    sync: &ViewSynchronizer,
    prompt: &str,
    with_rank: bool,
) -> Result<Option<String>, dialoguer::Error> {
    let mut keys = Vec::new();
    let mut labels = Vec::new();

    if with_rank {
        keys.push(XAxis::Rank.key().to_string());
        labels.push("Rank".to_string());
    }
    for (category, descriptors) in sync.data().registry.grouped() {
        for descriptor in descriptors {
            if descriptor.kind == ValueKind::Rank {
                continue;
            }
            keys.push(descriptor.key.clone());
            labels.push(format!("{}: {}", category.title(), descriptor.label));
        }
    }

    let current = if with_rank {
        sync.state().config.x_axis.key().to_string()
    } else {
        sync.state().config.active_metric.clone()
    };
    let default = keys.iter().position(|k| *k == current).unwrap_or(0);

    let idx = Select::new()
        .with_prompt(prompt)
        .items(&labels)
        .default(default)
        .interact()?;

    Ok((keys[idx] != current).then(|| keys[idx].clone()))
}

fn pick_tract(sync: &ViewSynchronizer) -> Result<&Tract, dialoguer::Error> {
    let tracts = sync.data().dataset.tracts();
    let labels: Vec<String> = tracts
        .iter()
        .map(|t| format!("Census Tract {} ({})", t.name(), t.geoid()))
        .collect();

    let idx = Select::new()
        .with_prompt("Tract")
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(&tracts[idx])
}

/// A point inside the chosen tract, so the map hit test resolves to it.
fn pick_position(sync: &ViewSynchronizer) -> Result<LngLat, dialoguer::Error> {
    let tract = pick_tract(sync)?;
    let position = tract
        .geometry()
        .interior_point()
        .map(|p| LngLat::new(p.x(), p.y()))
        .or_else(|| tract.bounds().map(|b| b.center()))
        .unwrap_or_else(|| sync.data().home_view().center);
    Ok(position)
}

fn pick_tab(sync: &mut ViewSynchronizer) -> Result<(), Box<dyn std::error::Error>> {
    let categories: Vec<_> = sync
        .data()
        .deployment
        .tabs
        .iter()
        .map(|t| t.category)
        .collect();
    let labels: Vec<&str> = categories.iter().map(|c| c.title()).collect();
    let current = categories
        .iter()
        .position(|c| *c == sync.state().active_tab)
        .unwrap_or(0);

    let idx = Select::new()
        .with_prompt("Detail tab")
        .items(&labels)
        .default(current)
        .interact()?;
    sync.select_tab(categories[idx])?;
    Ok(())
}
