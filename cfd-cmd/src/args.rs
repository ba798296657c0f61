//! Shared view arguments: what the map would show.

use anyhow::{anyhow, Context};
use cfd_core::dates::parse_cutoff;
use cfd_core::{Bounds, DamageFilter, DashboardConfig, LngLat, Viewport};
use cfd_spec::ViewSnapshot;
use clap::Args;

#[derive(Args, Debug, Clone, Default)]
pub struct ViewArgs {
    /// Bounding box as "sw_lng,sw_lat,ne_lng,ne_lat" (default: configured max bounds)
    #[arg(long)]
    pub bbox: Option<String>,

    /// Map zoom level (default: configured minimum zoom)
    #[arg(long)]
    pub zoom: Option<f64>,

    #[arg(long, default_value_t = 800)]
    pub width: u32,

    #[arg(long, default_value_t = 600)]
    pub height: u32,

    /// Time cutoff "YYYY-MM-DD HH:MM:SS" (default: end of playback)
    #[arg(long)]
    pub cutoff: Option<String>,

    /// Damage category key, e.g. "Major (26-50%)", or "all"
    #[arg(long, default_value = "all")]
    pub damage: String,
}

impl ViewArgs {
    pub fn viewport(&self, config: &DashboardConfig) -> anyhow::Result<Viewport> {
        let bounds = match &self.bbox {
            Some(bbox) => parse_bbox(bbox)?,
            None => config.map.max_bounds,
        };
        Ok(Viewport {
            bounds,
            zoom: self.zoom.unwrap_or(config.map.min_zoom),
            min_zoom: config.map.min_zoom,
            max_zoom: config.map.max_zoom,
            width: self.width,
            height: self.height,
        })
    }

    pub fn filter(&self) -> anyhow::Result<DamageFilter> {
        DamageFilter::from_key(&self.damage).ok_or_else(|| anyhow!("unknown damage category '{}'", self.damage))
    }

    pub fn snapshot(&self, config: &DashboardConfig) -> anyhow::Result<ViewSnapshot> {
        let cutoff = match &self.cutoff {
            Some(s) => parse_cutoff(s).with_context(|| format!("invalid cutoff '{}'", s))?,
            None => config.playback.end,
        };
        Ok(ViewSnapshot {
            viewport: self.viewport(config)?,
            cutoff,
            filter: self.filter()?,
        })
    }
}

fn parse_bbox(bbox: &str) -> anyhow::Result<Bounds> {
    let coords = bbox
        .split(',')
        .map(|s| s.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("invalid bbox '{}'", bbox))?;
    match coords.as_slice() {
        [sw_lng, sw_lat, ne_lng, ne_lat] => Ok(Bounds::new(
            LngLat::new(*sw_lng, *sw_lat),
            LngLat::new(*ne_lng, *ne_lat),
        )),
        _ => Err(anyhow!("bbox needs four numbers, got {}", coords.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfd_core::DamageCategory;

    #[test]
    fn test_defaults_follow_config() {
        let config = DashboardConfig::default();
        let snapshot = ViewArgs {
            width: 800,
            height: 600,
            damage: "all".to_string(),
            ..Default::default()
        }
        .snapshot(&config)
        .unwrap();
        assert_eq!(snapshot.viewport.bounds, config.map.max_bounds);
        assert_eq!(snapshot.viewport.zoom, 11.0);
        assert_eq!(snapshot.cutoff, config.playback.end);
        assert!(snapshot.filter.is_all());
    }

    #[test]
    fn test_parses_bbox_cutoff_and_damage() {
        let config = DashboardConfig::default();
        let args = ViewArgs {
            bbox: Some("-121.7, 39.7, -121.5, 39.8".to_string()),
            zoom: Some(13.0),
            width: 400,
            height: 300,
            cutoff: Some("2018-11-10 14:00:00".to_string()),
            damage: "Minor (10-25%)".to_string(),
        };
        let snapshot = args.snapshot(&config).unwrap();
        assert_eq!(snapshot.viewport.south_west(), LngLat::new(-121.7, 39.7));
        assert_eq!(snapshot.viewport.width, 400);
        assert_eq!(snapshot.filter, DamageFilter::only(DamageCategory::Minor));
    }

    #[test]
    fn test_rejects_bad_input() {
        let config = DashboardConfig::default();
        assert!(parse_bbox("1,2,3").is_err());
        assert!(parse_bbox("a,b,c,d").is_err());
        let args = ViewArgs {
            damage: "Scorched".to_string(),
            ..Default::default()
        };
        assert!(args.snapshot(&config).is_err());
    }
}
