//! Map viewport snapshot.
//!
//! The map widget owns the live viewport; builders only ever see a `Copy`
//! taken when a refresh is dispatched.

use crate::mercator::conv_4326_to_900913;
use serde::{Deserialize, Serialize};

/// A WGS84 longitude/latitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

/// Geographic bounding box of the visible map area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub south_west: LngLat,
    pub north_east: LngLat,
}

impl Bounds {
    pub const fn new(south_west: LngLat, north_east: LngLat) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    /// Bounds projected to Web Mercator as `(x_min, y_min, x_max, y_max)`.
    pub fn projected(&self) -> (f64, f64, f64, f64) {
        let (x_min, y_min) = conv_4326_to_900913(self.south_west);
        let (x_max, y_max) = conv_4326_to_900913(self.north_east);
        (x_min, y_min, x_max, y_max)
    }
}

/// Snapshot of the map state used by the query and spec builders.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub bounds: Bounds,
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Map container width in CSS pixels.
    pub width: u32,
    /// Map container height in CSS pixels.
    pub height: u32,
}

impl Viewport {
    pub fn south_west(&self) -> LngLat {
        self.bounds.south_west
    }

    pub fn north_east(&self) -> LngLat {
        self.bounds.north_east
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paradise() -> Bounds {
        Bounds::new(LngLat::new(-121.79, 39.63), LngLat::new(-121.34, 39.87))
    }

    #[test]
    fn test_projected_bounds_are_ordered() {
        let (x_min, y_min, x_max, y_max) = paradise().projected();
        assert!(x_min < x_max);
        assert!(y_min < y_max);
    }
}
