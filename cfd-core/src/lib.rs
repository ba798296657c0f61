//! Core types for the Camp Fire damage dashboard.
//!
//! Everything the query and spec builders read lives here:
//! - `viewport`: map bounding box, zoom limits and container size
//! - `damage`: the fixed damage category enumeration
//! - `filter`: the time cutoff and damage category filters
//! - `config`: static dashboard configuration
//! - `error`: the failure taxonomy shared by every crate

pub mod config;
pub mod damage;
pub mod error;
pub mod filter;
pub mod viewport;

pub use config::DashboardConfig;
pub use damage::DamageCategory;
pub use error::{DashboardError, Result};
pub use filter::{DamageFilter, TimeFilter};
pub use viewport::{Bounds, LngLat, Viewport};

/// Date formatting shared by SQL predicates, chart titles and the slider.
pub mod dates {
    use chrono::NaiveDateTime;

    /// Format used for every timestamp sent to the database.
    pub const CUTOFF_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    /// Format a cutoff as "YYYY-MM-DD HH:MM:SS".
    pub fn format_cutoff(date: &NaiveDateTime) -> String {
        date.format(CUTOFF_FORMAT).to_string()
    }

    /// Parse a cutoff in "YYYY-MM-DD HH:MM:SS" format.
    pub fn parse_cutoff(s: &str) -> Result<NaiveDateTime, chrono::ParseError> {
        NaiveDateTime::parse_from_str(s, CUTOFF_FORMAT)
    }

    /// Chart title for a cutoff, e.g. "Nov 10, 2018 14:00".
    pub fn format_chart_title(date: &NaiveDateTime) -> String {
        date.format("%b %d, %Y %H:%M").to_string()
    }

    /// Short human label for the time slider thumb, e.g. "Nov 08 14:00".
    pub fn format_slider_label(date: &NaiveDateTime) -> String {
        date.format("%b %d %H:%M").to_string()
    }

}

/// Web Mercator (EPSG:900913) projection helpers.
pub mod mercator {
    use crate::viewport::LngLat;

    /// Half the equatorial circumference in meters.
    pub const ORIGIN_SHIFT: f64 = 20037508.34;

    /// Project a WGS84 longitude/latitude to Web Mercator meters.
    ///
    /// Matches the database's `conv_4326_900913_x` / `conv_4326_900913_y`.
    pub fn conv_4326_to_900913(point: LngLat) -> (f64, f64) {
        let x = point.lng * ORIGIN_SHIFT / 180.0;
        let y = ((90.0 + point.lat) * std::f64::consts::PI / 360.0)
            .tan()
            .ln()
            / (std::f64::consts::PI / 180.0);
        (x, y * ORIGIN_SHIFT / 180.0)
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_origin_projects_to_zero() {
            let (x, y) = conv_4326_to_900913(LngLat::new(0.0, 0.0));
            assert!(x.abs() < 1e-9);
            assert!(y.abs() < 1e-6);
        }

        #[test]
        fn test_antimeridian_is_origin_shift() {
            let (x, _) = conv_4326_to_900913(LngLat::new(180.0, 0.0));
            assert!((x - ORIGIN_SHIFT).abs() < 1e-6);
        }

        #[test]
        fn test_paradise_ca() {
            let (x, y) = conv_4326_to_900913(LngLat::new(-121.62, 39.70));
            assert!((x - -13_538_676.47).abs() < 0.1, "x was {}", x);
            assert!((y - 4_822_442.39).abs() < 0.1, "y was {}", y);
        }
    }
}
