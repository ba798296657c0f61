//! CSV data loading functions for populating the local SQLite backend.
//!
//! # CSV Formats
//!
//! - **Damage points** (has headers): `DAMAGE,perDatTime,longitude,latitude`
//! - **NDVI samples** (has headers): `ndvi,longitude,latitude`
//!
//! Coordinates are stored as WKT `POINT(lng lat)` in `omnisci_geo`.

use crate::Database;
use cfd_core::dates::parse_cutoff;
use rusqlite::params;

impl Database {
    /// Load damage inspection points from a CSV string.
    ///
    /// An empty `DAMAGE` field is stored as NULL. Rows with unparsable
    /// coordinates or timestamps are skipped.
    ///
    /// # Example CSV
    /// ```text
    /// DAMAGE,perDatTime,longitude,latitude
    /// Destroyed (>50%),2018-11-08 10:00:00,-121.60,39.76
    /// ```
    pub fn load_damage_points(&self, csv_data: &str) -> anyhow::Result<usize> {
        let conn = self.conn.borrow();
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(csv_data.as_bytes());

        let mut count = 0usize;
        let mut skipped = 0usize;
        for result in rdr.records() {
            let r = result?;
            let damage = r.get(0).map(str::trim).filter(|s| !s.is_empty());
            let timestamp = r.get(1).unwrap_or("").trim();
            let lng = r.get(2).unwrap_or("").trim().parse::<f64>();
            let lat = r.get(3).unwrap_or("").trim().parse::<f64>();

            let (Ok(lng), Ok(lat)) = (lng, lat) else {
                skipped += 1;
                continue;
            };
            if parse_cutoff(timestamp).is_err() {
                skipped += 1;
                continue;
            }

            conn.execute(
                "INSERT INTO ca_butte_county_damaged_points_earliestdate (DAMAGE, perDatTime, omnisci_geo)
                 VALUES (?1, ?2, ?3)",
                params![damage, timestamp, format!("POINT({} {})", lng, lat)],
            )?;
            count += 1;
        }
        log::info!(
            "[CFD Debug] loader: Loaded {} damage points, skipped {} malformed",
            count,
            skipped
        );
        Ok(count)
    }

    /// Load pre-fire NDVI samples from a CSV string.
    ///
    /// # Example CSV
    /// ```text
    /// ndvi,longitude,latitude
    /// 0.62,-121.60,39.76
    /// ```
    pub fn load_ndvi(&self, csv_data: &str) -> anyhow::Result<usize> {
        let conn = self.conn.borrow();
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(csv_data.as_bytes());

        let mut count = 0usize;
        let mut skipped = 0usize;
        for result in rdr.records() {
            let r = result?;
            let parsed: Vec<Option<f64>> = (0..3)
                .map(|i| r.get(i).and_then(|s| s.trim().parse::<f64>().ok()))
                .collect();
            let (Some(ndvi), Some(lng), Some(lat)) = (parsed[0], parsed[1], parsed[2]) else {
                skipped += 1;
                continue;
            };

            conn.execute(
                "INSERT INTO fire_prefire_ndvi (ndvi, omnisci_geo) VALUES (?1, ?2)",
                params![ndvi, format!("POINT({} {})", lng, lat)],
            )?;
            count += 1;
        }
        log::info!(
            "[CFD Debug] loader: Loaded {} NDVI samples, skipped {} malformed",
            count,
            skipped
        );
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use crate::Database;

    #[test]
    fn load_damage_points_from_csv() {
        let db = Database::new().unwrap();
        let csv = "\
DAMAGE,perDatTime,longitude,latitude
Destroyed (>50%),2018-11-08 10:00:00,-121.60,39.76
Minor (10-25%),2018-11-09 12:00:00,-121.58,39.75
";
        assert_eq!(db.load_damage_points(csv).unwrap(), 2);

        let conn = db.conn.borrow();
        let geo: String = conn
            .query_row(
                "SELECT omnisci_geo FROM ca_butte_county_damaged_points_earliestdate WHERE DAMAGE = 'Minor (10-25%)'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(geo, "POINT(-121.58 39.75)");
    }

    #[test]
    fn load_damage_points_skips_malformed() {
        let db = Database::new().unwrap();
        let csv = "\
DAMAGE,perDatTime,longitude,latitude
Other,2018-11-08 10:00:00,-121.60,39.76
Other,yesterday,-121.60,39.76
Other,2018-11-08 10:00:00,west,39.76
,2018-11-08 11:00:00,-121.61,39.77
";
        assert_eq!(db.load_damage_points(csv).unwrap(), 2);

        let conn = db.conn.borrow();
        let nulls: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM ca_butte_county_damaged_points_earliestdate WHERE DAMAGE IS NULL",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(nulls, 1, "Empty DAMAGE should be stored as NULL");
    }

    #[test]
    fn load_ndvi_from_csv() {
        let db = Database::new().unwrap();
        let csv = "\
ndvi,longitude,latitude
0.62,-121.60,39.76
0.15,-121.58,39.75
n/a,-121.58,39.75
";
        assert_eq!(db.load_ndvi(csv).unwrap(), 2);
    }
}
