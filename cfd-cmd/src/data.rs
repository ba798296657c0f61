//! Counts and NDVI statistics computed from local fixtures.

use crate::fixtures;
use anyhow::anyhow;
use cfd_core::DashboardConfig;
use cfd_query::builder::{self, HexMark};
use cfd_query::{CategoryCount, Database};
use cfd_spec::map_spec::heatmap_color_scale;
use cfd_spec::ViewSnapshot;
use std::fmt::Write;

/// Category counts up to the cutoff, or inside the point-of-interest window
/// restricted by the damage filter when `poi` is set.
pub fn counts(
    db: &Database,
    snapshot: &ViewSnapshot,
    config: &DashboardConfig,
    poi: bool,
) -> anyhow::Result<Vec<CategoryCount>> {
    let sql = if poi {
        builder::poi_damage_counts_query(
            &snapshot.viewport,
            &config.playback.poi_start,
            &config.playback.poi_end,
            &snapshot.filter,
        )
    } else {
        builder::damage_counts_query(&snapshot.viewport, &snapshot.cutoff)
    };
    let rows = db.execute(&sql)?;
    Ok(CategoryCount::from_rows(&rows)?)
}

pub fn format_counts(counts: &[CategoryCount], config: &DashboardConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<8} {:<18} {:>8}", "label", "category", "count");
    for c in counts {
        let _ = writeln!(
            out,
            "{:<8} {:<18} {:>8}",
            config.label(c.category),
            c.category.key(),
            c.count
        );
    }
    out
}

/// NDVI summary for the viewport plus the clamped colour buckets.
pub fn ndvi_stats(
    ndvi_csv: &str,
    snapshot: &ViewSnapshot,
    config: &DashboardConfig,
) -> anyhow::Result<String> {
    let db = fixtures::load(None, Some(ndvi_csv))?;
    let stats = db
        .query_ndvi_stats(&snapshot.viewport, HexMark::default())?
        .ok_or_else(|| anyhow!("no NDVI samples inside the viewport"))?;
    let domain = stats.quantize_domain();
    let scale = heatmap_color_scale(domain, snapshot.viewport.zoom, config);

    let mut out = String::new();
    let _ = writeln!(out, "min:    {:.4}", stats.min);
    let _ = writeln!(out, "max:    {:.4}", stats.max);
    let _ = writeln!(out, "mean:   {:.4}", stats.mean);
    let _ = writeln!(out, "stddev: {:.4}", stats.stddev);
    let _ = writeln!(out, "domain: [{:.4}, {:.4}]", domain[0], domain[1]);
    let thresholds = scale.thresholds();
    for (i, color) in scale.range.iter().enumerate() {
        let lo = if i == 0 { domain[0] } else { thresholds[i - 1] };
        let hi = thresholds.get(i).copied().unwrap_or(domain[1]);
        let _ = writeln!(out, "  [{:.4}, {:.4})  {}", lo, hi, color);
    }
    Ok(out)
}
