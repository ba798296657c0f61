//! Event-driven controller linking the damage map and the damage chart.
//!
//! The controller owns the time and damage filters, reads the viewport from
//! the map, and on every event rebuilds the SQL and render specs and pushes
//! the results into the injected renderers.

pub mod controller;
pub mod notification;
pub mod replay;
pub mod traits;

pub use controller::{ViewController, ViewEvent};
pub use notification::{Notification, RefreshTarget};
pub use replay::ReplayState;
pub use traits::{ChartRenderer, DataClient, MapRenderer, OverlayImage, SelectionListener, SubscriptionId};
