//! Replay timer state.
//!
//! The controller owns the state; the host drives it by sending
//! `ViewEvent::ReplayTick` every `timer_delay_ms` while [`ReplayState::is_playing`].

use cfd_core::TimeFilter;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ReplayState {
    #[default]
    Idle,
    Playing,
    /// The cutoff reached the end of the playback range; the timer is stopped.
    Finished,
}

impl ReplayState {
    pub fn is_playing(&self) -> bool {
        matches!(self, ReplayState::Playing)
    }

    /// Play/pause button. Returns true when the cutoff was moved.
    pub fn toggle(&mut self, time: &mut TimeFilter) -> bool {
        match self {
            ReplayState::Playing => {
                *self = ReplayState::Idle;
                false
            }
            ReplayState::Idle | ReplayState::Finished => {
                let rewound = time.is_at_end();
                if rewound {
                    time.rewind();
                }
                *self = ReplayState::Playing;
                rewound
            }
        }
    }

    /// One timer tick. Returns true when the cutoff moved.
    pub fn tick(&mut self, time: &mut TimeFilter) -> bool {
        if !self.is_playing() {
            return false;
        }
        let moved = time.advance();
        if time.is_at_end() {
            *self = ReplayState::Finished;
        }
        moved
    }

    /// The slider was dragged by hand.
    pub fn on_seek(&mut self, time: &TimeFilter) {
        if *self == ReplayState::Finished && !time.is_at_end() {
            *self = ReplayState::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn filter() -> TimeFilter {
        let start = NaiveDate::from_ymd_opt(2018, 11, 8).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let end = NaiveDate::from_ymd_opt(2018, 11, 9).unwrap().and_hms_opt(0, 0, 0).unwrap();
        TimeFilter::new(start, end, 4).unwrap()
    }

    #[test]
    fn ticks_are_ignored_unless_playing() {
        let mut time = filter();
        let mut state = ReplayState::Idle;
        assert!(!state.tick(&mut time));
        assert_eq!(time.tick_index(), 0);
    }

    #[test]
    fn finishes_after_exactly_total_ticks() {
        let mut time = filter();
        let mut state = ReplayState::default();
        state.toggle(&mut time);
        let mut ticks = 0;
        while state.is_playing() {
            assert!(state.tick(&mut time));
            ticks += 1;
        }
        assert_eq!(ticks, 4);
        assert_eq!(state, ReplayState::Finished);
        assert!(!state.tick(&mut time));
    }

    #[test]
    fn toggle_pauses_and_restarts_from_finished() {
        let mut time = filter();
        let mut state = ReplayState::default();
        assert!(!state.toggle(&mut time));
        state.tick(&mut time);
        assert!(!state.toggle(&mut time));
        assert_eq!(state, ReplayState::Idle);
        assert_eq!(time.tick_index(), 1);

        time.set_tick_index(4);
        state = ReplayState::Finished;
        assert!(state.toggle(&mut time));
        assert_eq!(state, ReplayState::Playing);
        assert_eq!(time.cutoff(), time.start());
    }

    #[test]
    fn seeking_back_leaves_finished() {
        let mut time = filter();
        let mut state = ReplayState::Finished;
        time.set_tick_index(2);
        state.on_seek(&time);
        assert_eq!(state, ReplayState::Idle);
    }
}
