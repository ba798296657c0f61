//! Print the SQL and render specs the dashboard would send.

use crate::fixtures;
use anyhow::Context;
use cfd_core::dates::format_chart_title;
use cfd_core::DashboardConfig;
use cfd_query::builder::{self, HexMark};
use cfd_query::CategoryCount;
use cfd_spec::{chart_spec, MapSpecBuilder, ViewSnapshot};
use clap::ValueEnum;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SqlKind {
    /// Damage counts per category up to the cutoff
    Counts,
    /// Damage counts inside the point-of-interest window
    Poi,
    /// Damage point layer
    Points,
    /// Residential parcel layer
    Parcels,
    /// Damaged building layer
    Buildings,
    /// Hex-binned NDVI heatmap layer
    Ndvi,
}

pub fn sql(kind: SqlKind, snapshot: &ViewSnapshot, config: &DashboardConfig) -> String {
    let viewport = &snapshot.viewport;
    match kind {
        SqlKind::Counts => builder::damage_counts_query(viewport, &snapshot.cutoff),
        SqlKind::Poi => builder::poi_damage_counts_query(
            viewport,
            &config.playback.poi_start,
            &config.playback.poi_end,
            &snapshot.filter,
        ),
        SqlKind::Points => builder::points_layer_query(viewport, &snapshot.cutoff, &snapshot.filter),
        SqlKind::Parcels => builder::parcels_layer_query(),
        SqlKind::Buildings => builder::buildings_layer_query(&snapshot.filter),
        SqlKind::Ndvi => builder::ndvi_heatmap_query(viewport, HexMark::default()),
    }
}

/// Map spec as pretty JSON. With NDVI samples the heatmap domain is clamped
/// locally instead of by the database.
pub fn map_spec_json(
    snapshot: &ViewSnapshot,
    config: &DashboardConfig,
    ndvi_csv: Option<&str>,
    hex_width: f64,
) -> anyhow::Result<String> {
    let mark = HexMark::with_width(hex_width);
    let stats = match ndvi_csv {
        Some(path) => {
            let db = fixtures::load(None, Some(path))?;
            db.query_ndvi_stats(&snapshot.viewport, mark)?
        }
        None => None,
    };
    let spec = MapSpecBuilder::new(snapshot, config)
        .hex_mark(mark)
        .heatmap_stats(stats)
        .build();
    serde_json::to_string_pretty(spec.as_json()).context("serialize map spec")
}

/// Chart spec for the counts found in `points_csv`.
pub fn chart_spec_json(
    snapshot: &ViewSnapshot,
    config: &DashboardConfig,
    points_csv: &str,
) -> anyhow::Result<String> {
    let db = fixtures::load(Some(points_csv), None)?;
    let rows = db.execute(&builder::damage_counts_query(&snapshot.viewport, &snapshot.cutoff))?;
    let counts = CategoryCount::from_rows(&rows)?;
    let spec = chart_spec(&counts, &format_chart_title(&snapshot.cutoff), config);
    serde_json::to_string_pretty(spec.as_json()).context("serialize chart spec")
}
