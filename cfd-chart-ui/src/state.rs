//! Application state managed via Dioxus context.
//!
//! `AppState` bundles all reactive signals into a single struct provided via
//! `use_context_provider`. Child components retrieve it with `use_context::<AppState>()`.
//! The view controller is the source of truth; `sync_from` copies its state
//! into the signals after every handled event.

use cfd_core::dates::{format_chart_title, format_slider_label};
use cfd_core::DashboardConfig;
use cfd_spec::CounterLabel;
use cfd_view::{ReplayState, ViewController};
use dioxus::prelude::*;

/// Most recent notifications kept on screen.
const MAX_NOTIFICATIONS: usize = 3;

/// Shared application state for the damage dashboard.
#[derive(Clone, Copy)]
pub struct AppState {
    /// Whether the map and database connection are still initializing
    pub loading: Signal<bool>,
    /// Fatal startup error
    pub error_msg: Signal<Option<String>>,
    /// Non-fatal refresh failures, newest last
    pub notifications: Signal<Vec<String>>,
    /// Slider position of the current cutoff
    pub tick: Signal<i64>,
    /// Number of slider steps over the playback range
    pub total_ticks: Signal<i64>,
    /// Day ticks labelled under the slider
    pub tick_labels: Signal<Vec<(i64, String)>>,
    /// Formatted current cutoff
    pub cutoff_label: Signal<String>,
    pub replay: Signal<ReplayState>,
    /// Largest damage count and its colour
    pub counter: Signal<Option<CounterLabel>>,
    /// Short label of the active damage filter
    pub filter_label: Signal<String>,
}

impl AppState {
    /// Create a new AppState positioned at the start of the playback range.
    pub fn new(config: &DashboardConfig) -> Self {
        let (total, labels, start_label) = match config.time_filter() {
            Ok(time) => (
                time.total_ticks(),
                day_tick_labels(config),
                format_chart_title(&time.start()),
            ),
            Err(_) => (0, Vec::new(), String::new()),
        };
        Self {
            loading: Signal::new(true),
            error_msg: Signal::new(None),
            notifications: Signal::new(Vec::new()),
            tick: Signal::new(0),
            total_ticks: Signal::new(total),
            tick_labels: Signal::new(labels),
            cutoff_label: Signal::new(start_label),
            replay: Signal::new(ReplayState::Idle),
            counter: Signal::new(None),
            filter_label: Signal::new("All".to_string()),
        }
    }

    /// Copy the controller's state into the signals.
    pub fn sync_from(&mut self, controller: &ViewController) {
        let time = controller.time_filter();
        self.tick.set(time.tick_index());
        self.cutoff_label.set(format_chart_title(&time.cutoff()));
        self.replay.set(controller.replay_state());
        self.counter.set(controller.counter_label());

        let filter = controller.damage_filter();
        let label = if filter.is_all() {
            "All".to_string()
        } else {
            filter
                .categories()
                .iter()
                .map(|c| controller.config().label(*c).to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        self.filter_label.set(label);

        let fresh = controller.take_notifications();
        if !fresh.is_empty() {
            let mut notes = self.notifications.write();
            notes.extend(fresh.iter().map(|n| n.message()));
            let excess = notes.len().saturating_sub(MAX_NOTIFICATIONS);
            notes.drain(..excess);
        }
    }
}

/// One label per day: `(tick index, "Nov 08 00:00")`.
fn day_tick_labels(config: &DashboardConfig) -> Vec<(i64, String)> {
    let Ok(mut time) = config.time_filter() else {
        return Vec::new();
    };
    let ticks_per_day = i64::from(config.playback.ticks_per_day);
    let total = time.total_ticks();
    (0..=total)
        .step_by(ticks_per_day.max(1) as usize)
        .map(|index| {
            time.set_tick_index(index);
            (index, format_slider_label(&time.cutoff()))
        })
        .collect()
}
