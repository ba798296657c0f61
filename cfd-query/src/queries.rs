//! Query execution against the local SQLite backend.
//!
//! Results come back as JSON-object rows, the same shape the remote
//! database client returns.

use crate::builder::{bbox_clause, HexMark, NDVI_TABLE};
use crate::models::{HeatmapStats, Row};
use crate::Database;
use cfd_core::mercator::conv_4326_to_900913;
use cfd_core::{DashboardError, LngLat, Result, Viewport};
use std::collections::BTreeMap;
use rusqlite::types::ValueRef;

fn query_error(e: rusqlite::Error) -> DashboardError {
    DashboardError::QueryExecution(e.to_string())
}

fn to_json(value: ValueRef<'_>) -> serde_json::Value {
    match value {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Integer(i) => serde_json::Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Text(t) => serde_json::Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(_) => serde_json::Value::Null,
    }
}

impl Database {
    /// Run an arbitrary SQL string and collect every row.
    pub fn execute(&self, sql: &str) -> Result<Vec<Row>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(sql).map_err(query_error)?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();

        let mut rows = stmt.query([]).map_err(query_error)?;
        let mut results = Vec::new();
        while let Some(row) = rows.next().map_err(query_error)? {
            let mut object = Row::new();
            for (i, name) in columns.iter().enumerate() {
                let value = row.get_ref(i).map_err(query_error)?;
                object.insert(name.clone(), to_json(value));
            }
            results.push(object);
        }
        log::info!(
            "[CFD Debug] query: execute returned {} records",
            results.len()
        );
        Ok(results)
    }

    /// NDVI statistics over the hex-bin averages the heatmap layer draws;
    /// `None` when no samples fall inside the viewport.
    ///
    /// Samples are projected to container pixels and grouped into `mark`
    /// sized bins, matching `ndvi_heatmap_query`, so the domain agrees with
    /// the stats transform the database runs over the binned layer.
    pub fn query_ndvi_stats(&self, viewport: &Viewport, mark: HexMark) -> Result<Option<HeatmapStats>> {
        let conn = self.conn.borrow();
        let sql = format!(
            "SELECT ST_X(omnisci_geo), ST_Y(omnisci_geo), ndvi FROM {} WHERE {}",
            NDVI_TABLE,
            bbox_clause(viewport)
        );
        let mut stmt = conn.prepare(&sql).map_err(query_error)?;
        let samples = stmt
            .query_map([], |row| {
                Ok((row.get::<_, f64>(0)?, row.get::<_, f64>(1)?, row.get::<_, f64>(2)?))
            })
            .map_err(query_error)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(query_error)?;

        let mut bins: BTreeMap<(i64, i64), (f64, u32)> = BTreeMap::new();
        for (lng, lat, ndvi) in &samples {
            if ndvi.is_nan() {
                continue;
            }
            let (x, y) = pixel_position(viewport, LngLat::new(*lng, *lat));
            let bin = bins.entry(hex_bin(x, y, mark)).or_insert((0.0, 0));
            bin.0 += ndvi;
            bin.1 += 1;
        }
        let averages: Vec<f64> = bins.values().map(|(sum, n)| sum / f64::from(*n)).collect();
        log::info!(
            "[CFD Debug] query: query_ndvi_stats binned {} samples into {} hexes",
            samples.len(),
            averages.len()
        );
        Ok(HeatmapStats::from_values(&averages))
    }
}

/// Container pixel position of a point, y measured from the bottom edge.
fn pixel_position(viewport: &Viewport, point: LngLat) -> (f64, f64) {
    let (x_min, y_min, x_max, y_max) = viewport.bounds.projected();
    let (mx, my) = conv_4326_to_900913(point);
    (
        (mx - x_min) / (x_max - x_min) * f64::from(viewport.width),
        (my - y_min) / (y_max - y_min) * f64::from(viewport.height),
    )
}

/// Axial coordinates of the pointy-top hexagon containing `(x, y)`.
fn hex_bin(x: f64, y: f64, mark: HexMark) -> (i64, i64) {
    let size = mark.height / 2.0;
    let q = (3.0_f64.sqrt() / 3.0 * x - y / 3.0) / size;
    let r = (2.0 / 3.0 * y) / size;
    let s = -q - r;

    let (mut rq, mut rr, rs) = (q.round(), r.round(), s.round());
    let (dq, dr, ds) = ((rq - q).abs(), (rr - r).abs(), (rs - s).abs());
    if dq > dr && dq > ds {
        rq = -rr - rs;
    } else if dr > ds {
        rr = -rq - rs;
    }
    (rq as i64, rr as i64)
}
