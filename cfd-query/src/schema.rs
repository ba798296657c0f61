//! SQL schema for the local SQLite backend.
//!
//! Table and column names mirror the remote analytical database so the
//! generated queries run unchanged. Geometries are stored as WKT text.

/// Returns the full SQL schema as a single batch string.
///
/// - `ca_butte_county_damaged_points_earliestdate`: damage inspection points
///   (category, earliest damage timestamp, point geometry)
/// - `fire_prefire_ndvi`: pre-fire vegetation index samples
pub fn create_schema() -> &'static str {
    r#"
    CREATE TABLE IF NOT EXISTS ca_butte_county_damaged_points_earliestdate (
        DAMAGE TEXT,
        perDatTime TEXT NOT NULL,
        omnisci_geo TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_points_time
        ON ca_butte_county_damaged_points_earliestdate(perDatTime);

    CREATE TABLE IF NOT EXISTS fire_prefire_ndvi (
        ndvi REAL NOT NULL,
        omnisci_geo TEXT NOT NULL
    );
    "#
}
