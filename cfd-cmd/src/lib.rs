//! Command implementations for the damage dashboard CLI.
//!
//! Every command works offline: SQL and render specs are printed as the
//! dashboard would send them, and counts are computed against CSV fixtures
//! loaded into the local SQLite backend.

use anyhow::Context;
use cfd_core::DashboardConfig;
use clap::Subcommand;

pub mod args;
pub mod data;
pub mod fixtures;
pub mod headless;
pub mod inspect;
pub mod replay;

use args::ViewArgs;
use inspect::SqlKind;

#[derive(Subcommand)]
pub enum Command {
    /// Print the SQL for one of the dashboard queries
    Sql {
        #[arg(value_enum)]
        kind: SqlKind,

        #[command(flatten)]
        view: ViewArgs,
    },

    /// Print the Vega map spec for a view
    MapSpec {
        #[command(flatten)]
        view: ViewArgs,

        /// NDVI samples CSV; clamps the heatmap domain locally
        #[arg(long)]
        ndvi_csv: Option<String>,

        /// Hexagon width in pixels
        #[arg(long, default_value_t = 10.0)]
        hex_width: f64,
    },

    /// Print the Vega-Lite damage chart spec for a view
    ChartSpec {
        #[command(flatten)]
        view: ViewArgs,

        /// Damage points CSV
        #[arg(short = 'p', long)]
        points_csv: String,
    },

    /// Count damage per category inside a view
    Counts {
        #[command(flatten)]
        view: ViewArgs,

        /// Damage points CSV
        #[arg(short = 'p', long)]
        points_csv: String,

        /// Count inside the point-of-interest window instead of up to the cutoff
        #[arg(long)]
        poi: bool,
    },

    /// Summarize NDVI samples inside a view
    NdviStats {
        #[command(flatten)]
        view: ViewArgs,

        /// NDVI samples CSV
        #[arg(short = 'n', long)]
        ndvi_csv: String,
    },

    /// Replay the whole playback range and print the daily counter
    Replay {
        #[command(flatten)]
        view: ViewArgs,

        /// Damage points CSV
        #[arg(short = 'p', long)]
        points_csv: Option<String>,
    },
}

/// Read a JSON configuration file, or use the built-in defaults.
pub fn load_config(path: Option<&str>) -> anyhow::Result<DashboardConfig> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path).with_context(|| format!("read {}", path))?;
            Ok(DashboardConfig::from_json_str(&json)?)
        }
        None => Ok(DashboardConfig::default()),
    }
}

pub async fn run(command: Command, config: &DashboardConfig) -> anyhow::Result<()> {
    match command {
        Command::Sql { kind, view } => {
            let snapshot = view.snapshot(config)?;
            println!("{}", inspect::sql(kind, &snapshot, config));
        }
        Command::MapSpec {
            view,
            ndvi_csv,
            hex_width,
        } => {
            let snapshot = view.snapshot(config)?;
            println!(
                "{}",
                inspect::map_spec_json(&snapshot, config, ndvi_csv.as_deref(), hex_width)?
            );
        }
        Command::ChartSpec { view, points_csv } => {
            let snapshot = view.snapshot(config)?;
            println!("{}", inspect::chart_spec_json(&snapshot, config, &points_csv)?);
        }
        Command::Counts {
            view,
            points_csv,
            poi,
        } => {
            let snapshot = view.snapshot(config)?;
            let db = fixtures::load(Some(&points_csv), None)?;
            let counts = data::counts(&db, &snapshot, config, poi)?;
            print!("{}", data::format_counts(&counts, config));
        }
        Command::NdviStats { view, ndvi_csv } => {
            let snapshot = view.snapshot(config)?;
            print!("{}", data::ndvi_stats(&ndvi_csv, &snapshot, config)?);
        }
        Command::Replay { view, points_csv } => {
            let summary = replay::run_replay(&view, points_csv.as_deref(), config).await?;
            print!("{}", summary.report());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config_defaults_without_path() {
        let config = load_config(None).unwrap();
        assert_eq!(config.playback.ticks_per_day, 12);
    }

    #[test]
    fn test_load_config_reads_partial_json() {
        let path = std::env::temp_dir().join(format!("cfd-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"playback": {"timer_delay_ms": 250}}"#).unwrap();
        let config = load_config(path.to_str());
        std::fs::remove_file(&path).ok();
        assert_eq!(config.unwrap().playback.timer_delay_ms, 250);
    }

    #[test]
    fn test_load_config_missing_file() {
        assert!(load_config(Some("/nonexistent/cfd.json")).is_err());
    }
}
