//! View controller: owns the filters and orchestrates refreshes.
//!
//! State lives behind `RefCell`s so every method takes `&self`. A refresh
//! snapshots the state by value and releases the borrow before its first
//! await, so events arriving while a refresh is in flight are handled
//! normally and the later write wins.

use crate::notification::{Notification, RefreshTarget};
use crate::replay::ReplayState;
use crate::traits::{ChartRenderer, DataClient, MapRenderer, OverlayImage, SelectionListener, SubscriptionId};
use cfd_core::dates::format_chart_title;
use cfd_core::{DamageFilter, DashboardConfig, DashboardError, Result, TimeFilter, Viewport};
use cfd_query::{builder, CategoryCount};
use cfd_spec::chart_spec::BAR_SELECTION;
use cfd_spec::style::base_style_for_zoom;
use cfd_spec::{chart_spec, map_spec, ChartSpec, CounterLabel, ViewSnapshot};
use chrono::NaiveDateTime;
use std::cell::RefCell;
use std::rc::Rc;

/// Discrete user and timer events.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    SliderMoved(NaiveDateTime),
    ReplayTick,
    PlayToggled,
    MapMoved(Viewport),
    /// A chart bar was clicked; carries its database key.
    BarClicked(String),
    ShowAll,
}

struct ControllerState {
    time: TimeFilter,
    filter: DamageFilter,
    replay: ReplayState,
    counts: Vec<CategoryCount>,
    last_chart: Option<ChartSpec>,
    last_overlay: Option<OverlayImage>,
    notifications: Vec<Notification>,
    subscriptions: Vec<SubscriptionId>,
}

pub struct ViewController {
    config: DashboardConfig,
    data: Rc<dyn DataClient>,
    map: Rc<dyn MapRenderer>,
    chart: Rc<dyn ChartRenderer>,
    state: RefCell<ControllerState>,
}

impl ViewController {
    pub fn new(
        config: DashboardConfig,
        data: Rc<dyn DataClient>,
        map: Rc<dyn MapRenderer>,
        chart: Rc<dyn ChartRenderer>,
    ) -> Result<Self> {
        let time = config.time_filter()?;
        Ok(Self {
            config,
            data,
            map,
            chart,
            state: RefCell::new(ControllerState {
                time,
                filter: DamageFilter::All,
                replay: ReplayState::Idle,
                counts: Vec::new(),
                last_chart: None,
                last_overlay: None,
                notifications: Vec::new(),
                subscriptions: Vec::new(),
            }),
        })
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Attach `listener` to bar clicks on the chart. The host forwards the
    /// key back as [`ViewEvent::BarClicked`].
    pub fn connect_chart(&self, listener: SelectionListener) -> Result<SubscriptionId> {
        let id = self.chart.subscribe(BAR_SELECTION, listener)?;
        self.state.borrow_mut().subscriptions.push(id);
        Ok(id)
    }

    /// Remove every chart subscription owned by this controller.
    pub fn dispose(&self) {
        let ids = std::mem::take(&mut self.state.borrow_mut().subscriptions);
        for id in ids {
            self.chart.unsubscribe(id);
        }
    }

    /// Apply an event and refresh both halves when the view changed.
    ///
    /// Errors are only returned for input that prevents a refresh from
    /// starting; query and render failures become notifications.
    pub async fn handle(&self, event: ViewEvent) -> Result<()> {
        log::debug!("[CFD Debug] controller: {:?}", event);
        let mut viewport = None;
        let mut zoom_out = false;
        let changed = {
            let mut guard = self.state.borrow_mut();
            let state = &mut *guard;
            match event {
                ViewEvent::SliderMoved(cutoff) => {
                    state.time.set_cutoff(cutoff);
                    state.replay.on_seek(&state.time);
                    true
                }
                ViewEvent::ReplayTick => state.replay.tick(&mut state.time),
                ViewEvent::PlayToggled => state.replay.toggle(&mut state.time),
                ViewEvent::MapMoved(moved) => {
                    viewport = Some(moved);
                    true
                }
                ViewEvent::BarClicked(key) => match DamageFilter::from_key(&key) {
                    Some(DamageFilter::All) => {
                        state.filter = DamageFilter::All;
                        zoom_out = true;
                        true
                    }
                    Some(filter) => {
                        state.filter = filter;
                        true
                    }
                    None => {
                        log::warn!("[CFD Debug] controller: ignoring unknown damage key '{}'", key);
                        false
                    }
                },
                ViewEvent::ShowAll => {
                    state.filter = DamageFilter::All;
                    zoom_out = true;
                    true
                }
            }
        };
        // The renderer may read controller state back, so the borrow ends first.
        if zoom_out {
            self.map.zoom_out();
        }
        if !changed {
            return Ok(());
        }
        match viewport {
            Some(viewport) => self.refresh_at(viewport).await,
            None => self.refresh().await,
        }
    }

    /// Refresh chart and map from the map's current viewport.
    pub async fn refresh(&self) -> Result<()> {
        let viewport = self.map.viewport().ok_or_else(|| {
            DashboardError::MalformedInput("refresh requested before the map has a viewport".to_string())
        })?;
        self.refresh_at(viewport).await
    }

    async fn refresh_at(&self, viewport: Viewport) -> Result<()> {
        let snapshot = self.snapshot(viewport);
        let (chart, map) = futures::join!(self.refresh_chart(&snapshot), self.refresh_map(&snapshot));
        if let Err(e) = chart {
            self.notify(RefreshTarget::Chart, e);
        }
        if let Err(e) = map {
            self.notify(RefreshTarget::Map, e);
        }
        Ok(())
    }

    fn snapshot(&self, viewport: Viewport) -> ViewSnapshot {
        let state = self.state.borrow();
        ViewSnapshot {
            viewport,
            cutoff: state.time.cutoff(),
            filter: state.filter.clone(),
        }
    }

    async fn refresh_chart(&self, snapshot: &ViewSnapshot) -> Result<()> {
        let sql = builder::damage_counts_query(&snapshot.viewport, &snapshot.cutoff);
        let rows = self.data.query(&sql).await?;
        let counts = CategoryCount::from_rows(&rows)?;
        let spec = chart_spec(&counts, &format_chart_title(&snapshot.cutoff), &self.config);
        self.chart.render(&spec).await?;

        let mut state = self.state.borrow_mut();
        state.counts = counts;
        state.last_chart = Some(spec);
        Ok(())
    }

    async fn refresh_map(&self, snapshot: &ViewSnapshot) -> Result<()> {
        let style = base_style_for_zoom(snapshot.viewport.zoom, &self.config);
        if self.map.style() != style {
            log::info!("[CFD Debug] controller: switching base style to {}", style);
            self.map.set_style(style)?;
        }

        let spec = map_spec(snapshot, &self.config);
        let overlay = self.data.render(&spec).await?;
        self.map.set_overlay(&overlay)?;
        self.state.borrow_mut().last_overlay = Some(overlay);
        Ok(())
    }

    fn notify(&self, target: RefreshTarget, error: DashboardError) {
        let notification = Notification::new(target, error);
        log::warn!("[CFD Debug] controller: {}", notification.message());
        self.state.borrow_mut().notifications.push(notification);
    }

    pub fn cutoff(&self) -> NaiveDateTime {
        self.state.borrow().time.cutoff()
    }

    pub fn time_filter(&self) -> TimeFilter {
        self.state.borrow().time
    }

    pub fn damage_filter(&self) -> DamageFilter {
        self.state.borrow().filter.clone()
    }

    pub fn replay_state(&self) -> ReplayState {
        self.state.borrow().replay
    }

    /// Category counts from the last successful chart refresh.
    pub fn counts(&self) -> Vec<CategoryCount> {
        self.state.borrow().counts.clone()
    }

    pub fn counter_label(&self) -> Option<CounterLabel> {
        CounterLabel::from_counts(&self.state.borrow().counts, &self.config)
    }

    pub fn last_chart(&self) -> Option<ChartSpec> {
        self.state.borrow().last_chart.clone()
    }

    pub fn last_overlay(&self) -> Option<OverlayImage> {
        self.state.borrow().last_overlay.clone()
    }

    /// Drain pending notifications.
    pub fn take_notifications(&self) -> Vec<Notification> {
        std::mem::take(&mut self.state.borrow_mut().notifications)
    }
}

impl Drop for ViewController {
    fn drop(&mut self) {
        self.dispose();
    }
}
