//! Time cutoff and damage category filters owned by the view controller.

use crate::damage::DamageCategory;
use crate::error::{DashboardError, Result};
use chrono::{NaiveDateTime, TimeDelta};
use std::collections::BTreeSet;

/// Which damage categories are shown.
///
/// `All` is a sentinel, not an explicit set: builders omit the category
/// predicate entirely for it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DamageFilter {
    #[default]
    All,
    Only(BTreeSet<DamageCategory>),
}

impl DamageFilter {
    /// Filter matching a single category.
    pub fn only(category: DamageCategory) -> Self {
        DamageFilter::Only(BTreeSet::from([category]))
    }

    /// Build a filter from a set of categories. An empty set means `All`.
    pub fn from_categories<I>(categories: I) -> Self
    where
        I: IntoIterator<Item = DamageCategory>,
    {
        let set: BTreeSet<DamageCategory> = categories.into_iter().collect();
        if set.is_empty() {
            DamageFilter::All
        } else {
            DamageFilter::Only(set)
        }
    }

    /// Parse a chart selection key. `"all"` maps to the sentinel.
    pub fn from_key(key: &str) -> Option<Self> {
        if key == "all" {
            return Some(DamageFilter::All);
        }
        DamageCategory::from_key(key).map(DamageFilter::only)
    }

    pub fn is_all(&self) -> bool {
        matches!(self, DamageFilter::All)
    }

    /// Selected categories in severity order; empty for `All`.
    pub fn categories(&self) -> Vec<DamageCategory> {
        match self {
            DamageFilter::All => Vec::new(),
            DamageFilter::Only(set) => set.iter().copied().collect(),
        }
    }
}

/// A cutoff date moving through a fixed playback range in fixed ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeFilter {
    start: NaiveDateTime,
    end: NaiveDateTime,
    step: TimeDelta,
    cutoff: NaiveDateTime,
}

impl TimeFilter {
    /// Create a filter positioned at `start`.
    ///
    /// `ticks_per_day` sets the slider granularity, e.g. 12 ticks per day is
    /// one tick every two hours.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime, ticks_per_day: u32) -> Result<Self> {
        if end < start {
            return Err(DashboardError::Config(format!(
                "playback end {} is before start {}",
                end, start
            )));
        }
        if ticks_per_day == 0 || 86_400 % ticks_per_day != 0 {
            return Err(DashboardError::Config(format!(
                "ticks per day must evenly divide a day, got {}",
                ticks_per_day
            )));
        }
        let step = TimeDelta::try_seconds(i64::from(86_400 / ticks_per_day))
            .ok_or_else(|| DashboardError::Config("tick step out of range".to_string()))?;
        Ok(Self {
            start,
            end,
            step,
            cutoff: start,
        })
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    pub fn step(&self) -> TimeDelta {
        self.step
    }

    pub fn cutoff(&self) -> NaiveDateTime {
        self.cutoff
    }

    /// Move the cutoff, clamped to the playback range.
    pub fn set_cutoff(&mut self, cutoff: NaiveDateTime) {
        self.cutoff = cutoff.clamp(self.start, self.end);
    }

    /// Advance one tick. Returns false (and leaves the cutoff alone) once the
    /// end of the range has been reached.
    pub fn advance(&mut self) -> bool {
        if self.is_at_end() {
            return false;
        }
        let next = self.cutoff + self.step;
        self.cutoff = next.min(self.end);
        true
    }

    pub fn is_at_end(&self) -> bool {
        self.cutoff >= self.end
    }

    /// Jump back to the start of the playback range.
    pub fn rewind(&mut self) {
        self.cutoff = self.start;
    }

    /// Number of ticks from start to end; a partial last tick counts as one.
    pub fn total_ticks(&self) -> i64 {
        let span = (self.end - self.start).num_seconds();
        let step = self.step.num_seconds();
        (span + step - 1) / step
    }

    /// Slider position of the current cutoff.
    pub fn tick_index(&self) -> i64 {
        (self.cutoff - self.start).num_seconds() / self.step.num_seconds()
    }

    /// Move the cutoff to a slider position.
    pub fn set_tick_index(&mut self, index: i64) {
        let index = index.clamp(0, self.total_ticks());
        let offset = TimeDelta::try_seconds(index * self.step.num_seconds()).unwrap_or(TimeDelta::zero());
        self.set_cutoff(self.start + offset);
    }
}
