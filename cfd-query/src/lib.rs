//! SQL query builders and a local SQLite backend for Camp Fire damage data.
//!
//! # Architecture
//!
//! - [`builder`]: pure functions turning a viewport, a time cutoff and a
//!   damage filter into SQL strings for the remote analytical database.
//! - [`Database`]: an in-memory SQLite database loaded from CSV fixtures.
//!   It registers `ST_X` / `ST_Y` so the generated SQL runs unchanged,
//!   which the CLI uses offline and the tests use to check query semantics.
//!
//! # Usage
//!
//! ```rust
//! use cfd_query::{builder, Database};
//! use cfd_core::{Bounds, LngLat, Viewport};
//! use chrono::NaiveDate;
//!
//! let db = Database::new().unwrap();
//! db.load_damage_points("DAMAGE,perDatTime,longitude,latitude\nOther,2018-11-08 10:00:00,-121.6,39.7\n").unwrap();
//!
//! let viewport = Viewport {
//!     bounds: Bounds::new(LngLat::new(-121.79, 39.63), LngLat::new(-121.34, 39.87)),
//!     zoom: 11.0, min_zoom: 11.0, max_zoom: 15.7, width: 800, height: 600,
//! };
//! let cutoff = NaiveDate::from_ymd_opt(2018, 11, 9).unwrap().and_hms_opt(0, 0, 0).unwrap();
//! let rows = db.execute(&builder::damage_counts_query(&viewport, &cutoff)).unwrap();
//! assert_eq!(rows.len(), 5);
//! ```

pub mod builder;
mod loader;
pub mod models;
mod queries;
pub mod schema;

pub use models::{CategoryCount, HeatmapStats, Row};

use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;
use std::cell::RefCell;
use std::rc::Rc;

/// In-memory SQLite database holding damage points and NDVI samples.
///
/// Cheaply cloneable (via `Rc`) for sharing in a single-threaded runtime.
#[derive(Clone, Debug)]
pub struct Database {
    conn: Rc<RefCell<Connection>>,
}

impl Database {
    /// Create a new in-memory database with the schema and geo functions.
    pub fn new() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(schema::create_schema())?;
        register_geo_functions(&conn)?;
        Ok(Self {
            conn: Rc::new(RefCell::new(conn)),
        })
    }
}

/// Parse a WKT `POINT(x y)` into its coordinates.
pub fn parse_wkt_point(wkt: &str) -> Option<(f64, f64)> {
    let inner = wkt
        .trim()
        .strip_prefix("POINT")?
        .trim()
        .strip_prefix('(')?
        .strip_suffix(')')?;
    let mut parts = inner.split_whitespace();
    let x = parts.next()?.parse().ok()?;
    let y = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((x, y))
}

fn register_geo_functions(conn: &Connection) -> rusqlite::Result<()> {
    let flags = FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC;
    conn.create_scalar_function("ST_X", 1, flags, |ctx| {
        let wkt: String = ctx.get(0)?;
        parse_wkt_point(&wkt)
            .map(|(x, _)| x)
            .ok_or_else(|| rusqlite::Error::UserFunctionError(format!("not a WKT point: {}", wkt).into()))
    })?;
    conn.create_scalar_function("ST_Y", 1, flags, |ctx| {
        let wkt: String = ctx.get(0)?;
        parse_wkt_point(&wkt)
            .map(|(_, y)| y)
            .ok_or_else(|| rusqlite::Error::UserFunctionError(format!("not a WKT point: {}", wkt).into()))
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_creates_successfully() {
        let db = Database::new();
        assert!(db.is_ok(), "Database should create without errors");
    }

    #[test]
    fn database_is_cloneable() {
        let db = Database::new().unwrap();
        let db2 = db.clone();
        db.load_damage_points(
            "DAMAGE,perDatTime,longitude,latitude\nOther,2018-11-08 10:00:00,-121.6,39.7\n",
        )
        .unwrap();
        let rows = db2.execute("SELECT COUNT(*) AS n FROM ca_butte_county_damaged_points_earliestdate").unwrap();
        assert_eq!(rows[0]["n"], 1, "Clone should see same data via shared Rc");
    }

    #[test]
    fn parses_wkt_points() {
        assert_eq!(parse_wkt_point("POINT(-121.6 39.7)"), Some((-121.6, 39.7)));
        assert_eq!(parse_wkt_point(" POINT ( 1 2 ) "), Some((1.0, 2.0)));
        assert_eq!(parse_wkt_point("POINT(1)"), None);
        assert_eq!(parse_wkt_point("POINT(1 2 3)"), None);
        assert_eq!(parse_wkt_point("LINESTRING(1 2, 3 4)"), None);
    }

    #[test]
    fn geo_functions_are_registered() {
        let db = Database::new().unwrap();
        let rows = db
            .execute("SELECT ST_X('POINT(-121.6 39.7)') AS x, ST_Y('POINT(-121.6 39.7)') AS y")
            .unwrap();
        assert_eq!(rows[0]["x"], -121.6);
        assert_eq!(rows[0]["y"], 39.7);
    }
}
