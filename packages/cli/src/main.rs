#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Terminal host for the tract explorer.
//!
//! The one-shot subcommands print jurisdiction summaries, rankings,
//! regressions, and legends. `explore` drives the full view synchronizer
//! from `dialoguer` menus, with terminal surfaces standing in for the map,
//! legend, detail panel, and scatter plots.

mod commands;
mod interactive;
mod terminal;

use clap::{Parser, Subcommand};
use tract_explorer_dataset::DatasetSource;
use tract_explorer_metrics::registry::{self, DEFAULT_DEPLOYMENT};
use tract_explorer_metrics_models::Deployment;

/// Explore census tract demographics, housing, and health metrics.
#[derive(Parser)]
#[command(name = "tract_explorer")]
#[command(about = "Explore census tract demographics, housing, and health metrics")]
struct Cli {
    /// Deployment id (see `deployments`).
    #[arg(long, default_value = DEFAULT_DEPLOYMENT)]
    deployment: String,

    /// Tract `GeoJSON` file or URL. Defaults to the deployment's data path.
    #[arg(long)]
    data: Option<String>,

    /// Subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand)]
enum Commands {
    /// List the embedded deployments.
    Deployments,

    /// Print jurisdiction totals and race composition.
    Summary,

    /// Rank tracts by a metric, highest first.
    Rank {
        /// Metric key (e.g. `Percent_Below_Poverty`).
        metric: String,

        /// Number of tracts to print.
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Fit a least-squares line of one metric against another (or rank).
    Regress {
        /// Y metric key.
        y: String,

        /// X metric key, or `rank`.
        #[arg(long, default_value = "rank")]
        x: String,
    },

    /// Print the color legend for a metric.
    Legend {
        /// Metric key.
        metric: String,
    },

    /// Interactively explore the map, detail panel, and scatter plots.
    Explore,
}

fn source(cli: &Cli, deployment: &Deployment) -> DatasetSource {
    DatasetSource::from_location(cli.data.as_deref().unwrap_or(&deployment.data_path))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    if matches!(cli.command, Commands::Deployments) {
        commands::deployments();
        return Ok(());
    }

    let deployment = registry::deployment(&cli.deployment)?;
    let source = source(&cli, &deployment);

    if matches!(cli.command, Commands::Explore) {
        return interactive::run(deployment, &source).await;
    }

    let data = commands::load_context(deployment, &source).await?;

    match cli.command {
        Commands::Summary => commands::summary(&data),
        Commands::Rank { metric, limit } => commands::rank(&data, &metric, limit)?,
        Commands::Regress { y, x } => commands::regress(&data, &y, &x)?,
        Commands::Legend { metric } => commands::legend(&data, &metric)?,
        Commands::Deployments | Commands::Explore => {}
    }

    Ok(())
}
