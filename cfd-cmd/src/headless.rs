//! Offline implementations of the controller seams.
//!
//! `LocalDataClient` runs SQL against the in-memory SQLite fixtures and
//! records map specs instead of compiling them. The headless renderers keep
//! whatever they are given so a replay can be inspected afterwards.

use async_trait::async_trait;
use cfd_core::{DashboardError, Result, Viewport};
use cfd_query::{Database, Row};
use cfd_spec::{ChartSpec, MapSpec};
use cfd_view::{ChartRenderer, DataClient, MapRenderer, OverlayImage, SelectionListener, SubscriptionId};
use std::cell::{Cell, RefCell};

pub struct LocalDataClient {
    db: Database,
    specs: RefCell<Vec<MapSpec>>,
}

impl LocalDataClient {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            specs: RefCell::new(Vec::new()),
        }
    }

    /// Map specs received so far, oldest first.
    pub fn specs(&self) -> Vec<MapSpec> {
        self.specs.borrow().clone()
    }
}

#[async_trait(?Send)]
impl DataClient for LocalDataClient {
    async fn query(&self, sql: &str) -> Result<Vec<Row>> {
        self.db.execute(sql)
    }

    /// Records the spec; the image is a placeholder naming its sequence number.
    async fn render(&self, spec: &MapSpec) -> Result<OverlayImage> {
        let bounds = spec
            .bounds()
            .ok_or_else(|| DashboardError::SpecCompilation("spec has no projection bounds".to_string()))?;
        let mut specs = self.specs.borrow_mut();
        specs.push(spec.clone());
        Ok(OverlayImage {
            image: format!("spec:{}", specs.len()),
            bounds,
        })
    }
}

/// A map frozen at one viewport.
pub struct HeadlessMap {
    viewport: Viewport,
    style: RefCell<String>,
    overlay: RefCell<Option<OverlayImage>>,
    zoom_outs: Cell<u32>,
}

impl HeadlessMap {
    pub fn new(viewport: Viewport, style: &str) -> Self {
        Self {
            viewport,
            style: RefCell::new(style.to_string()),
            overlay: RefCell::new(None),
            zoom_outs: Cell::new(0),
        }
    }

    pub fn overlay(&self) -> Option<OverlayImage> {
        self.overlay.borrow().clone()
    }
}

impl MapRenderer for HeadlessMap {
    fn viewport(&self) -> Option<Viewport> {
        Some(self.viewport)
    }

    fn style(&self) -> String {
        self.style.borrow().clone()
    }

    fn set_style(&self, style: &str) -> Result<()> {
        *self.style.borrow_mut() = style.to_string();
        Ok(())
    }

    fn set_overlay(&self, overlay: &OverlayImage) -> Result<()> {
        *self.overlay.borrow_mut() = Some(overlay.clone());
        Ok(())
    }

    fn zoom_out(&self) {
        self.zoom_outs.set(self.zoom_outs.get() + 1);
    }
}

#[derive(Default)]
pub struct HeadlessChart {
    renders: Cell<usize>,
    last: RefCell<Option<ChartSpec>>,
}

impl HeadlessChart {
    pub fn renders(&self) -> usize {
        self.renders.get()
    }

    pub fn last(&self) -> Option<ChartSpec> {
        self.last.borrow().clone()
    }
}

#[async_trait(?Send)]
impl ChartRenderer for HeadlessChart {
    async fn render(&self, spec: &ChartSpec) -> Result<()> {
        self.renders.set(self.renders.get() + 1);
        *self.last.borrow_mut() = Some(spec.clone());
        Ok(())
    }

    /// Nothing is ever clicked offline.
    fn subscribe(&self, _signal: &str, _listener: SelectionListener) -> Result<SubscriptionId> {
        Ok(SubscriptionId(0))
    }

    fn unsubscribe(&self, _id: SubscriptionId) {}
}
