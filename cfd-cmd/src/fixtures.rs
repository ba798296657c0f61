//! Load CSV fixtures from disk into a fresh in-memory database.

use anyhow::Context;
use cfd_query::Database;
use log::info;

pub fn load(points_csv: Option<&str>, ndvi_csv: Option<&str>) -> anyhow::Result<Database> {
    let db = Database::new()?;
    if let Some(path) = points_csv {
        let data = std::fs::read_to_string(path).with_context(|| format!("read {}", path))?;
        let n = db.load_damage_points(&data)?;
        info!("Loaded {} damage points from {}", n, path);
    }
    if let Some(path) = ndvi_csv {
        let data = std::fs::read_to_string(path).with_context(|| format!("read {}", path))?;
        let n = db.load_ndvi(&data)?;
        info!("Loaded {} NDVI samples from {}", n, path);
    }
    Ok(db)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_an_error() {
        let err = load(Some("/nonexistent/points.csv"), None).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/points.csv"));
    }

    #[test]
    fn test_loads_nothing_without_paths() {
        let db = load(None, None).unwrap();
        assert!(db.execute("SELECT * FROM fire_prefire_ndvi").unwrap().is_empty());
    }
}
