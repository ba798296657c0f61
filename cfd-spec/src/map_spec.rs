//! Vega spec for the server-rendered map overlay.
//!
//! The database compiles this spec into a PNG covering the viewport. Layers,
//! bottom to top: residential parcels, NDVI heatmap, damaged buildings,
//! damage points.

use crate::scale::{LinearScale, QuantizeScale};
use crate::style::{heatmap_opacity, rgba, NDVI_DEFAULT, NDVI_NULL, NDVI_PALETTE};
use crate::ViewSnapshot;
use cfd_core::config::FALLBACK_COLOR;
use cfd_core::{Bounds, DamageCategory, DashboardConfig, LngLat, Viewport};
use cfd_query::builder::{self, HexMark};
use cfd_query::HeatmapStats;
use serde::Serialize;
use serde_json::{json, Value};

const POINTS: &str = "pointmapLayer0";
const PARCELS: &str = "backendChoroplethLayer1";
const BUILDINGS: &str = "backendChoroplethLayer3";
const HEATMAP: &str = "heatmap_querygeoheatLayer4";
const HEATMAP_STATS: &str = "heatmap_querygeoheatLayer4_stats";
const HEAT_COLOR: &str = "heat_colorgeoheatLayer4";
const PROJECTION: &str = "mercator_map_projection";

/// Widest building outline, at minimum zoom.
const STROKE_WIDTH_ZOOMED_OUT: f64 = 6.0;
/// Narrowest building outline, at maximum zoom.
const STROKE_WIDTH_ZOOMED_IN: f64 = 1.0;
/// Parcel fill opacity at minimum and maximum zoom.
const PARCEL_OPACITY_RANGE: [f64; 2] = [0.05, 0.35];

/// A compiled-ready Vega map spec.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MapSpec(Value);

impl MapSpec {
    pub fn as_json(&self) -> &Value {
        &self.0
    }

    pub fn to_json_string(&self) -> String {
        self.0.to_string()
    }

    pub fn width(&self) -> u64 {
        self.0["width"].as_u64().unwrap_or(0)
    }

    pub fn height(&self) -> u64 {
        self.0["height"].as_u64().unwrap_or(0)
    }

    /// Geographic bounds covered by the rendered image, read back from the
    /// projection.
    pub fn bounds(&self) -> Option<Bounds> {
        let b = &self.0["projections"][0]["bounds"];
        Some(Bounds::new(
            LngLat::new(b["x"][0].as_f64()?, b["y"][0].as_f64()?),
            LngLat::new(b["x"][1].as_f64()?, b["y"][1].as_f64()?),
        ))
    }
}

/// Building outline width, wider when zoomed out.
pub fn stroke_width_scale(viewport: &Viewport) -> LinearScale {
    LinearScale::new(
        [viewport.min_zoom, viewport.max_zoom],
        [STROKE_WIDTH_ZOOMED_OUT, STROKE_WIDTH_ZOOMED_IN],
    )
}

/// Parcel choropleth fill opacity by zoom.
pub fn fill_opacity_scale(viewport: &Viewport) -> LinearScale {
    LinearScale::new([viewport.min_zoom, viewport.max_zoom], PARCEL_OPACITY_RANGE).clamped()
}

/// Damage point diameter by zoom.
pub fn point_size_scale(viewport: &Viewport, config: &DashboardConfig) -> LinearScale {
    LinearScale::new(
        [viewport.min_zoom, viewport.max_zoom],
        config.map.point_size_range,
    )
}

/// NDVI quantize scale at the given zoom, over a known domain.
pub fn heatmap_color_scale(domain: [f64; 2], zoom: f64, config: &DashboardConfig) -> QuantizeScale {
    let opacity = heatmap_opacity(zoom, config);
    QuantizeScale {
        domain,
        range: NDVI_PALETTE.iter().map(|c| rgba(*c, opacity)).collect(),
        default: rgba(NDVI_DEFAULT, opacity),
        null_value: rgba(NDVI_NULL, opacity),
    }
}

fn damage_color_scale(name: &str, config: &DashboardConfig) -> Value {
    let domain: Vec<&str> = DamageCategory::ALL.iter().map(|c| c.key()).collect();
    let range: Vec<&str> = DamageCategory::ALL.iter().map(|c| config.color(*c)).collect();
    json!({
        "name": name,
        "type": "ordinal",
        "domain": domain,
        "range": range,
        "default": FALLBACK_COLOR,
        "nullValue": FALLBACK_COLOR,
    })
}

/// Builds a [`MapSpec`] from a snapshot.
///
/// Without heatmap statistics the color domain is computed by the database
/// from the heatmap data itself; with them the clamped domain is inlined.
pub struct MapSpecBuilder<'a> {
    snapshot: &'a ViewSnapshot,
    config: &'a DashboardConfig,
    mark: HexMark,
    heatmap_stats: Option<HeatmapStats>,
}

impl<'a> MapSpecBuilder<'a> {
    pub fn new(snapshot: &'a ViewSnapshot, config: &'a DashboardConfig) -> Self {
        Self {
            snapshot,
            config,
            mark: HexMark::default(),
            heatmap_stats: None,
        }
    }

    pub fn hex_mark(mut self, mark: HexMark) -> Self {
        self.mark = mark;
        self
    }

    pub fn heatmap_stats(mut self, stats: Option<HeatmapStats>) -> Self {
        self.heatmap_stats = stats;
        self
    }

    fn data(&self) -> Value {
        let ViewSnapshot {
            viewport,
            cutoff,
            filter,
        } = self.snapshot;

        let mut data = vec![
            json!({
                "name": POINTS,
                "sql": builder::points_layer_query(viewport, cutoff, filter),
            }),
            json!({
                "name": PARCELS,
                "format": "polys",
                "geocolumn": "omnisci_geo",
                "sql": builder::parcels_layer_query(),
            }),
            json!({
                "name": BUILDINGS,
                "format": "polys",
                "geocolumn": "omnisci_geo",
                "sql": builder::buildings_layer_query(filter),
            }),
            json!({
                "name": HEATMAP,
                "sql": builder::ndvi_heatmap_query(viewport, self.mark),
            }),
        ];

        if self.heatmap_stats.is_none() {
            data.push(json!({
                "name": HEATMAP_STATS,
                "source": HEATMAP,
                "transform": [
                    {
                        "type": "aggregate",
                        "fields": ["color", "color", "color", "color"],
                        "ops": ["min", "max", "avg", "stddev"],
                        "as": ["minimum", "maximum", "mean", "deviation"]
                    },
                    {
                        "type": "formula",
                        "expr": "max(minimum, mean-2*deviation)",
                        "as": "mincolor"
                    },
                    {
                        "type": "formula",
                        "expr": "min(maximum, mean+2*deviation)",
                        "as": "maxcolor"
                    }
                ]
            }));
        }
        Value::Array(data)
    }

    fn heat_scale(&self) -> Value {
        let zoom = self.snapshot.viewport.zoom;
        let domain = self
            .heatmap_stats
            .map(|s| s.quantize_domain())
            .unwrap_or([0.0, 0.0]);
        let scale = heatmap_color_scale(domain, zoom, self.config);

        let domain = match self.heatmap_stats {
            Some(_) => json!(scale.domain),
            None => json!({ "data": HEATMAP_STATS, "fields": ["mincolor", "maxcolor"] }),
        };
        json!({
            "name": HEAT_COLOR,
            "type": "quantize",
            "domain": domain,
            "range": scale.range,
            "default": scale.default,
            "nullValue": scale.null_value,
        })
    }

    pub fn build(self) -> MapSpec {
        let viewport = &self.snapshot.viewport;
        let sw = viewport.south_west();
        let ne = viewport.north_east();
        let (x_min, y_min, x_max, y_max) = viewport.bounds.projected();
        let zoom = viewport.zoom;

        let stroke_width = stroke_width_scale(viewport).apply(zoom);
        let parcel_opacity = fill_opacity_scale(viewport).apply(zoom);
        let point_size = point_size_scale(viewport, self.config).apply(zoom);

        let spec = json!({
            "width": viewport.width,
            "height": viewport.height,
            "data": self.data(),
            "scales": [
                { "name": "x", "type": "linear", "domain": [x_min, x_max], "range": "width" },
                { "name": "y", "type": "linear", "domain": [y_min, y_max], "range": "height" },
                damage_color_scale("pointmapLayer0_fillColor", self.config),
                damage_color_scale("backendChoroplethLayer3_fillColor", self.config),
                self.heat_scale(),
            ],
            "projections": [
                {
                    "name": PROJECTION,
                    "type": "mercator",
                    "bounds": { "x": [sw.lng, ne.lng], "y": [sw.lat, ne.lat] }
                }
            ],
            "marks": [
                {
                    "type": "polys",
                    "from": { "data": PARCELS },
                    "properties": {
                        "x": { "field": "x" },
                        "y": { "field": "y" },
                        "fillColor": { "value": rgba((39, 174, 239), parcel_opacity) },
                        "strokeColor": "white",
                        "strokeWidth": 0,
                        "lineJoin": "miter",
                        "miterLimit": 10
                    },
                    "transform": { "projection": PROJECTION }
                },
                {
                    "type": "symbol",
                    "from": { "data": HEATMAP },
                    "properties": {
                        "shape": "hexagon-horiz",
                        "xc": { "field": "x" },
                        "yc": { "field": "y" },
                        "width": self.mark.width,
                        "height": self.mark.height,
                        "fillColor": { "scale": HEAT_COLOR, "field": "color" }
                    }
                },
                {
                    "type": "polys",
                    "from": { "data": BUILDINGS },
                    "properties": {
                        "x": { "field": "x" },
                        "y": { "field": "y" },
                        "fillColor": { "scale": "backendChoroplethLayer3_fillColor", "field": "color" },
                        "strokeColor": { "scale": "backendChoroplethLayer3_fillColor", "field": "color" },
                        "strokeWidth": stroke_width,
                        "lineJoin": "miter",
                        "miterLimit": 10
                    },
                    "transform": { "projection": PROJECTION }
                },
                {
                    "type": "symbol",
                    "from": { "data": POINTS },
                    "properties": {
                        "xc": { "scale": "x", "field": "x" },
                        "yc": { "scale": "y", "field": "y" },
                        "fillColor": { "scale": "pointmapLayer0_fillColor", "field": "color" },
                        "shape": "circle",
                        "width": point_size,
                        "height": point_size
                    }
                }
            ]
        });
        log::debug!(
            "[CFD Debug] spec: built map spec {}x{} at zoom {}",
            viewport.width,
            viewport.height,
            zoom
        );
        MapSpec(spec)
    }
}

/// Map spec with the data-driven heatmap domain.
pub fn map_spec(snapshot: &ViewSnapshot, config: &DashboardConfig) -> MapSpec {
    MapSpecBuilder::new(snapshot, config).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfd_core::DamageFilter;
    use chrono::NaiveDate;

    fn snapshot(zoom: f64, filter: DamageFilter) -> ViewSnapshot {
        ViewSnapshot {
            viewport: Viewport {
                bounds: Bounds::new(LngLat::new(-121.79, 39.63), LngLat::new(-121.34, 39.87)),
                zoom,
                min_zoom: 11.0,
                max_zoom: 15.7,
                width: 800,
                height: 600,
            },
            cutoff: NaiveDate::from_ymd_opt(2018, 11, 10)
                .unwrap()
                .and_hms_opt(14, 0, 0)
                .unwrap(),
            filter,
        }
    }

    fn find<'v>(spec: &'v MapSpec, section: &str, name: &str) -> &'v Value {
        spec.as_json()[section]
            .as_array()
            .unwrap()
            .iter()
            .find(|v| v["name"] == name)
            .unwrap()
    }

    fn mark<'v>(spec: &'v MapSpec, data: &str) -> &'v Value {
        spec.as_json()["marks"]
            .as_array()
            .unwrap()
            .iter()
            .find(|m| m["from"]["data"] == data)
            .unwrap()
    }

    #[test]
    fn building_twice_is_identical() {
        let config = DashboardConfig::default();
        let snap = snapshot(12.5, DamageFilter::only(DamageCategory::Major));
        assert_eq!(map_spec(&snap, &config), map_spec(&snap, &config));
    }

    #[test]
    fn position_scales_follow_projected_viewport() {
        let config = DashboardConfig::default();
        let snap = snapshot(12.0, DamageFilter::All);
        let spec = map_spec(&snap, &config);
        let (x_min, y_min, x_max, y_max) = snap.viewport.bounds.projected();

        assert_eq!(spec.width(), 800);
        assert_eq!(spec.height(), 600);
        assert_eq!(find(&spec, "scales", "x")["domain"], json!([x_min, x_max]));
        assert_eq!(find(&spec, "scales", "y")["domain"], json!([y_min, y_max]));
        assert_eq!(find(&spec, "scales", "x")["range"], "width");
    }

    #[test]
    fn stroke_width_narrows_with_zoom() {
        let config = DashboardConfig::default();
        let out = map_spec(&snapshot(11.0, DamageFilter::All), &config);
        let inn = map_spec(&snapshot(15.7, DamageFilter::All), &config);
        let width = |s: &MapSpec| mark(s, BUILDINGS)["properties"]["strokeWidth"].as_f64().unwrap();
        assert_eq!(width(&out), 6.0);
        assert!((width(&inn) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn damage_colors_align_with_domain() {
        let config = DashboardConfig::default();
        let spec = map_spec(&snapshot(12.0, DamageFilter::All), &config);
        let scale = find(&spec, "scales", "backendChoroplethLayer3_fillColor");
        let domain = scale["domain"].as_array().unwrap();
        let range = scale["range"].as_array().unwrap();
        assert_eq!(domain.len(), 5);
        for (key, color) in domain.iter().zip(range) {
            let category = DamageCategory::from_key(key.as_str().unwrap()).unwrap();
            assert_eq!(color, config.color(category));
        }
        assert_eq!(scale["nullValue"], FALLBACK_COLOR);
        assert_eq!(scale["default"], FALLBACK_COLOR);
    }

    #[test]
    fn heatmap_visible_at_threshold_and_transparent_above() {
        let config = DashboardConfig::default();
        let threshold = config.map.high_zoom_threshold;

        let at = map_spec(&snapshot(threshold, DamageFilter::All), &config);
        let above = map_spec(&snapshot(threshold + 0.5, DamageFilter::All), &config);

        let colors = |s: &MapSpec| find(s, "scales", HEAT_COLOR)["range"].clone();
        assert!(colors(&at).as_array().unwrap().iter().all(|c| c.as_str().unwrap().ends_with(", 0.3)")));
        assert!(colors(&above).as_array().unwrap().iter().all(|c| c.as_str().unwrap().ends_with(", 0)")));

        // Faded out, not removed
        assert!(find(&above, "data", HEATMAP).is_object());
        assert_eq!(mark(&above, HEATMAP)["type"], "symbol");
    }

    #[test]
    fn heatmap_domain_is_data_driven_without_stats() {
        let config = DashboardConfig::default();
        let spec = map_spec(&snapshot(12.0, DamageFilter::All), &config);
        let scale = find(&spec, "scales", HEAT_COLOR);
        assert_eq!(scale["domain"]["data"], HEATMAP_STATS);
        let stats = find(&spec, "data", HEATMAP_STATS);
        assert_eq!(stats["transform"][1]["expr"], "max(minimum, mean-2*deviation)");
        assert_eq!(stats["transform"][2]["expr"], "min(maximum, mean+2*deviation)");
    }

    #[test]
    fn heatmap_domain_is_clamped_with_stats() {
        let config = DashboardConfig::default();
        let snap = snapshot(12.0, DamageFilter::All);
        let stats = HeatmapStats {
            min: 0.0,
            max: 50.0,
            mean: 10.0,
            stddev: 1.0,
        };
        let spec = MapSpecBuilder::new(&snap, &config)
            .heatmap_stats(Some(stats))
            .build();
        assert_eq!(find(&spec, "scales", HEAT_COLOR)["domain"], json!([8.0, 12.0]));
        assert!(spec.as_json()["data"]
            .as_array()
            .unwrap()
            .iter()
            .all(|d| d["name"] != HEATMAP_STATS));
    }

    #[test]
    fn damage_filter_reaches_layer_sql() {
        let config = DashboardConfig::default();
        let all = map_spec(&snapshot(12.0, DamageFilter::All), &config);
        let buildings_sql = find(&all, "data", BUILDINGS)["sql"].as_str().unwrap().to_string();
        assert!(!buildings_sql.contains("WHERE"));

        let one = map_spec(
            &snapshot(12.0, DamageFilter::only(DamageCategory::Destroyed)),
            &config,
        );
        let points_sql = find(&one, "data", POINTS)["sql"].as_str().unwrap().to_string();
        assert!(points_sql.contains("DAMAGE = 'Destroyed (>50%)'"));
        assert!(points_sql.contains("perDatTime <= '2018-11-10 14:00:00'"));
    }

    #[test]
    fn parcel_opacity_tracks_zoom() {
        let config = DashboardConfig::default();
        let spec = map_spec(&snapshot(11.0, DamageFilter::All), &config);
        assert_eq!(
            mark(&spec, PARCELS)["properties"]["fillColor"]["value"],
            "rgba(39, 174, 239, 0.05)"
        );
    }

    #[test]
    fn bounds_read_back_from_projection() {
        let config = DashboardConfig::default();
        let snap = snapshot(12.0, DamageFilter::All);
        let spec = map_spec(&snap, &config);
        assert_eq!(spec.bounds(), Some(snap.viewport.bounds));
    }
}
