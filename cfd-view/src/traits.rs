//! Seams between the controller and the outside world.
//!
//! The browser app implements these over mapbox-gl, vega-embed and the
//! database connector; the CLI implements `DataClient` over SQLite; tests
//! implement all three with recording mocks.

use async_trait::async_trait;
use cfd_core::{Bounds, Result, Viewport};
use cfd_query::Row;
use cfd_spec::{ChartSpec, MapSpec};
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// Compiled overlay image placed on the map at `bounds`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayImage {
    /// Image source, usually a base64 PNG data URL.
    pub image: String,
    pub bounds: Bounds,
}

/// Handle returned by [`ChartRenderer::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u32);

/// Receives the `damageKey` of a clicked bar.
pub type SelectionListener = Rc<dyn Fn(String)>;

/// Executes SQL and compiles map specs on the analytical database.
#[async_trait(?Send)]
pub trait DataClient {
    async fn query(&self, sql: &str) -> Result<Vec<Row>>;

    async fn render(&self, spec: &MapSpec) -> Result<OverlayImage>;
}

pub trait MapRenderer {
    /// Current viewport, or `None` before the map has loaded.
    fn viewport(&self) -> Option<Viewport>;

    fn style(&self) -> String;

    fn set_style(&self, style: &str) -> Result<()>;

    fn set_overlay(&self, overlay: &OverlayImage) -> Result<()>;

    /// Return to the initial center and zoom.
    fn zoom_out(&self);
}

#[async_trait(?Send)]
pub trait ChartRenderer {
    async fn render(&self, spec: &ChartSpec) -> Result<()>;

    /// Listen to a chart selection signal. The listener stays attached
    /// across re-renders until unsubscribed. On error nothing is attached.
    fn subscribe(&self, signal: &str, listener: SelectionListener) -> Result<SubscriptionId>;

    fn unsubscribe(&self, id: SubscriptionId);
}
