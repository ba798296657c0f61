//! Zoom-dependent map styling.
//!
//! Past the high zoom threshold the NDVI heatmap turns fully transparent
//! (it stays in the spec) and the base map switches to satellite imagery.

use cfd_core::DashboardConfig;

/// Pre-fire NDVI palette, low to high vegetation.
pub const NDVI_PALETTE: [(u8, u8, u8); 9] = [
    (242, 255, 246),
    (229, 252, 236),
    (201, 237, 212),
    (174, 226, 190),
    (150, 211, 168),
    (100, 173, 122),
    (60, 150, 86),
    (12, 127, 46),
    (0, 79, 23),
];

/// Heatmap color for values the quantize scale cannot place.
pub const NDVI_DEFAULT: (u8, u8, u8) = (13, 8, 135);
/// Heatmap color for null bins.
pub const NDVI_NULL: (u8, u8, u8) = (153, 153, 153);

/// Strictly above the configured threshold.
pub fn is_high_zoom(zoom: f64, config: &DashboardConfig) -> bool {
    zoom > config.map.high_zoom_threshold
}

/// Base map style URL for a zoom level.
pub fn base_style_for_zoom(zoom: f64, config: &DashboardConfig) -> &str {
    if is_high_zoom(zoom, config) {
        &config.map.satellite_style
    } else {
        &config.map.light_style
    }
}

/// Opacity applied to every heatmap color at this zoom.
pub fn heatmap_opacity(zoom: f64, config: &DashboardConfig) -> f64 {
    if is_high_zoom(zoom, config) {
        0.0
    } else {
        config.map.ndvi_opacity
    }
}

pub fn rgba((r, g, b): (u8, u8, u8), opacity: f64) -> String {
    format!("rgba({}, {}, {}, {})", r, g, b, opacity)
}
