//! Static dashboard configuration.
//!
//! `DashboardConfig::default()` carries the built-in Camp Fire (Butte County,
//! November 2018) settings. The CLI can override any of them from a JSON file.

use crate::damage::DamageCategory;
use crate::error::{DashboardError, Result};
use crate::filter::TimeFilter;
use crate::viewport::{Bounds, LngLat};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Fallback color for null or unmatched damage values.
pub const FALLBACK_COLOR: &str = "rgba(214, 215, 214, 0.6)";

/// Color and short label for one damage category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStyle {
    pub color: String,
    pub label: String,
}

/// Time slider and replay timer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Slider steps per day; only day ticks are labelled.
    pub ticks_per_day: u32,
    /// Replay timer delay in milliseconds.
    pub timer_delay_ms: u32,
    /// Point-of-interest window used by the POI count query.
    pub poi_start: NaiveDateTime,
    pub poi_end: NaiveDateTime,
}

/// Map widget settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub container: String,
    pub access_token: String,
    pub light_style: String,
    pub satellite_style: String,
    pub center: LngLat,
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub max_bounds: Bounds,
    /// Above this zoom the heatmap fades out and the satellite style is used.
    pub high_zoom_threshold: f64,
    /// NDVI heatmap opacity at or below the high zoom threshold.
    pub ndvi_opacity: f64,
    /// Point mark size range over `[min_zoom, max_zoom]`; `[0, 0]` hides points.
    pub point_size_range: [f64; 2],
}

/// Analytical database connection parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub protocol: String,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
}

/// Complete dashboard configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub playback: PlaybackConfig,
    pub map: MapConfig,
    pub server: ServerConfig,
    /// Overrides are merged onto the built-in palette.
    #[serde(deserialize_with = "merge_palette")]
    pub palette: BTreeMap<DamageCategory, CategoryStyle>,
}

fn merge_palette<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<DamageCategory, CategoryStyle>, D::Error>
where
    D: Deserializer<'de>,
{
    let overrides = BTreeMap::<DamageCategory, CategoryStyle>::deserialize(deserializer)?;
    let mut palette = default_palette();
    palette.extend(overrides);
    Ok(palette)
}

fn nov_2018(day: u32, hour: u32, min: u32, sec: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2018, 11, day)
        .and_then(|d| d.and_hms_opt(hour, min, sec))
        .unwrap_or_default()
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            start: nov_2018(8, 0, 0, 0),
            end: nov_2018(26, 0, 0, 0),
            ticks_per_day: 12,
            timer_delay_ms: 500,
            poi_start: nov_2018(8, 6, 30, 0),
            poi_end: nov_2018(25, 23, 59, 59),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            container: "map".to_string(),
            access_token: String::new(),
            light_style: "mapbox://styles/mapbox/light-v9".to_string(),
            satellite_style: "mapbox://styles/mapbox/satellite-v9".to_string(),
            center: LngLat::new(-121.62, 39.70),
            zoom: 11.0,
            min_zoom: 11.0,
            max_zoom: 15.7,
            max_bounds: Bounds::new(LngLat::new(-121.79, 39.63), LngLat::new(-121.34, 39.87)),
            high_zoom_threshold: 14.0,
            ndvi_opacity: 0.3,
            point_size_range: [0.0, 0.0],
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            protocol: "https".to_string(),
            host: "localhost".to_string(),
            port: 6273,
            database: "mapd".to_string(),
            username: "mapd".to_string(),
            password: String::new(),
        }
    }
}

fn default_palette() -> BTreeMap<DamageCategory, CategoryStyle> {
    [
        (DamageCategory::Destroyed, "rgba(216, 49, 49, 0.1)"),
        (DamageCategory::Major, "rgba(255, 110, 0, 1)"),
        (DamageCategory::Minor, "rgba(255, 204, 0, 1)"),
        (DamageCategory::Affected, "rgba(255, 249, 211, 1)"),
        (DamageCategory::Other, "rgba(255, 246, 165,1)"),
    ]
    .into_iter()
    .map(|(category, color)| {
        (
            category,
            CategoryStyle {
                color: color.to_string(),
                label: category.label().to_string(),
            },
        )
    })
    .collect()
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            playback: PlaybackConfig::default(),
            map: MapConfig::default(),
            server: ServerConfig::default(),
            palette: default_palette(),
        }
    }
}

impl DashboardConfig {
    /// Parse a JSON configuration; missing sections keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: DashboardConfig =
            serde_json::from_str(json).map_err(|e| DashboardError::Config(e.to_string()))?;
        config.validate()?;
        log::info!("[CFD Debug] config: loaded configuration for {}", config.server.host);
        Ok(config)
    }

    /// Check invariants that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        self.time_filter()?;
        if self.playback.poi_end < self.playback.poi_start {
            return Err(DashboardError::Config(
                "point-of-interest window ends before it starts".to_string(),
            ));
        }
        if self.map.min_zoom > self.map.max_zoom {
            return Err(DashboardError::Config(format!(
                "min zoom {} exceeds max zoom {}",
                self.map.min_zoom, self.map.max_zoom
            )));
        }
        Ok(())
    }

    /// A fresh time filter over the playback range, positioned at the start.
    pub fn time_filter(&self) -> Result<TimeFilter> {
        TimeFilter::new(
            self.playback.start,
            self.playback.end,
            self.playback.ticks_per_day,
        )
    }

    /// Configured color for a category, or the fallback color.
    pub fn color(&self, category: DamageCategory) -> &str {
        self.palette
            .get(&category)
            .map(|s| s.color.as_str())
            .unwrap_or(FALLBACK_COLOR)
    }

    /// Configured short label for a category.
    pub fn label(&self, category: DamageCategory) -> &str {
        self.palette
            .get(&category)
            .map(|s| s.label.as_str())
            .unwrap_or_else(|| category.label())
    }
}
