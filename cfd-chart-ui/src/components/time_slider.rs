//! Time slider with a replay button.
//!
//! The slider works in tick indices; only day ticks are labelled, but arrow
//! keys and clicks move one tick at a time.

use crate::state::AppState;
use cfd_core::DashboardConfig;
use cfd_view::{ReplayState, ViewEvent};
use dioxus::prelude::*;

#[derive(Props, Clone, PartialEq)]
pub struct TimeSliderProps {
    pub on_event: EventHandler<ViewEvent>,
}

#[component]
pub fn TimeSlider(props: TimeSliderProps) -> Element {
    let state = use_context::<AppState>();
    let config = use_context::<DashboardConfig>();
    let tick = (state.tick)();
    let total = (state.total_ticks)();
    let labels: Vec<(i64, String, f64)> = (state.tick_labels)()
        .into_iter()
        .map(|(index, label)| (index, day_part(&label).to_string(), tick_percent(index, total)))
        .collect();
    let cutoff_label = (state.cutoff_label)();
    let button_label = match (state.replay)() {
        ReplayState::Idle => "Play",
        ReplayState::Playing => "Pause",
        ReplayState::Finished => "Replay",
    };

    let on_input = move |evt: Event<FormData>| {
        let Ok(index) = evt.value().parse::<i64>() else {
            return;
        };
        match config.time_filter() {
            Ok(mut time) => {
                time.set_tick_index(index);
                props.on_event.call(ViewEvent::SliderMoved(time.cutoff()));
            }
            Err(e) => log::error!("[CFD Debug] slider: {}", e),
        }
    };

    rsx! {
        div {
            style: "position: absolute; left: 12px; right: 12px; bottom: 16px; padding: 8px 12px; background: rgba(255, 255, 255, 0.9); border-radius: 4px; font-family: Arial, sans-serif; z-index: 1;",
            div {
                style: "display: flex; align-items: center; gap: 12px;",
                button {
                    style: "min-width: 64px;",
                    onclick: move |_| props.on_event.call(ViewEvent::PlayToggled),
                    "{button_label}"
                }
                strong { "{cutoff_label}" }
            }
            input {
                r#type: "range",
                style: "width: 100%; margin-top: 6px;",
                min: "0",
                max: "{total}",
                step: "1",
                value: "{tick}",
                oninput: on_input,
            }
            div {
                style: "position: relative; height: 14px; font-size: 10px; color: #666;",
                for (index, label, percent) in labels {
                    span {
                        key: "{index}",
                        style: "position: absolute; left: {percent}%; transform: translateX(-50%); white-space: nowrap;",
                        "{label}"
                    }
                }
            }
        }
    }
}

fn tick_percent(index: i64, total: i64) -> f64 {
    if total <= 0 {
        0.0
    } else {
        index as f64 * 100.0 / total as f64
    }
}

/// `"Nov 08 00:00"` -> `"Nov 08"`.
fn day_part(label: &str) -> &str {
    label.rsplit_once(' ').map(|(day, _)| day).unwrap_or(label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_percent() {
        assert_eq!(tick_percent(0, 216), 0.0);
        assert_eq!(tick_percent(108, 216), 50.0);
        assert_eq!(tick_percent(3, 0), 0.0);
    }

    #[test]
    fn test_day_part() {
        assert_eq!(day_part("Nov 08 00:00"), "Nov 08");
        assert_eq!(day_part("Nov"), "Nov");
    }
}
