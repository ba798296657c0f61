//! Drive the view controller through a full replay without a browser.

use crate::args::ViewArgs;
use crate::fixtures;
use crate::headless::{HeadlessChart, HeadlessMap, LocalDataClient};
use anyhow::anyhow;
use cfd_core::dates::format_chart_title;
use cfd_core::DashboardConfig;
use cfd_spec::style::base_style_for_zoom;
use cfd_spec::CounterLabel;
use cfd_view::{ViewController, ViewEvent};
use chrono::NaiveDateTime;
use log::{info, warn};
use std::fmt::Write;
use std::rc::Rc;

#[derive(Debug, Clone)]
pub struct ReplaySummary {
    pub ticks: i64,
    pub chart_renders: usize,
    pub overlays: usize,
    /// Counter at the end of every replayed day
    pub days: Vec<(NaiveDateTime, Option<CounterLabel>)>,
}

impl ReplaySummary {
    pub fn report(&self) -> String {
        let mut out = String::new();
        for (cutoff, counter) in &self.days {
            let _ = match counter {
                Some(c) => writeln!(out, "{}  {:>8}  {}", format_chart_title(cutoff), c.count, c.label),
                None => writeln!(out, "{}  {:>8}", format_chart_title(cutoff), "-"),
            };
        }
        let _ = writeln!(
            out,
            "{} ticks, {} chart renders, {} overlays",
            self.ticks, self.chart_renders, self.overlays
        );
        out
    }
}

/// Replay from the start of the playback range until the timer halts.
pub async fn run_replay(
    view: &ViewArgs,
    points_csv: Option<&str>,
    config: &DashboardConfig,
) -> anyhow::Result<ReplaySummary> {
    let viewport = view.viewport(config)?;
    let filter = view.filter()?;
    let data = Rc::new(LocalDataClient::new(fixtures::load(points_csv, None)?));
    let map = Rc::new(HeadlessMap::new(viewport, base_style_for_zoom(viewport.zoom, config)));
    let chart = Rc::new(HeadlessChart::default());
    let controller = ViewController::new(config.clone(), data.clone(), map, chart.clone())?;

    if !filter.is_all() {
        controller.handle(ViewEvent::BarClicked(view.damage.clone())).await?;
    }
    controller.handle(ViewEvent::PlayToggled).await?;

    let ticks_per_day = i64::from(config.playback.ticks_per_day.max(1));
    let limit = controller.time_filter().total_ticks() + 1;
    let mut ticks = 0;
    let mut days = Vec::new();
    while controller.replay_state().is_playing() {
        if ticks >= limit {
            return Err(anyhow!("replay did not finish after {} ticks", ticks));
        }
        controller.handle(ViewEvent::ReplayTick).await?;
        ticks += 1;
        for note in controller.take_notifications() {
            warn!("[CFD Debug] replay: {}", note.message());
        }
        let time = controller.time_filter();
        if time.tick_index() % ticks_per_day == 0 {
            days.push((time.cutoff(), controller.counter_label()));
        }
    }
    info!("[CFD Debug] replay: finished after {} ticks", ticks);

    Ok(ReplaySummary {
        ticks,
        chart_renders: chart.renders(),
        overlays: data.specs().len(),
        days,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    const POINTS: &str = "DAMAGE,perDatTime,longitude,latitude
Destroyed (>50%),2018-11-08 10:00:00,-121.60,39.76
Destroyed (>50%),2018-11-09 09:00:00,-121.61,39.75
Minor (10-25%),2018-11-12 09:00:00,-121.59,39.74
";

    fn view() -> ViewArgs {
        ViewArgs {
            width: 800,
            height: 600,
            damage: "all".to_string(),
            ..Default::default()
        }
    }

    fn points_file(name: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("cfd-{}-{}.csv", name, std::process::id()));
        std::fs::write(&path, POINTS).unwrap();
        path
    }

    #[test]
    fn test_replay_covers_every_tick() {
        let path = points_file("replay");
        let config = DashboardConfig::default();
        let summary = block_on(run_replay(&view(), path.to_str(), &config)).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(summary.ticks, 216);
        assert_eq!(summary.chart_renders, 216);
        assert_eq!(summary.overlays, 216);
        assert_eq!(summary.days.len(), 18);

        let (first_day, first) = &summary.days[0];
        assert_eq!(format_chart_title(first_day), "Nov 09, 2018 00:00");
        assert_eq!(first.as_ref().unwrap().count, 1);
        let (_, last) = summary.days.last().unwrap();
        assert_eq!(last.as_ref().unwrap().count, 2);
        assert!(summary.report().ends_with("216 ticks, 216 chart renders, 216 overlays\n"));
    }

    #[test]
    fn test_replay_rejects_unknown_damage() {
        let config = DashboardConfig::default();
        let args = ViewArgs {
            damage: "Charred".to_string(),
            ..view()
        };
        assert!(block_on(run_replay(&args, None, &config)).is_err());
    }
}
