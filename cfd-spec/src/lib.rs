//! Declarative render spec builders for the damage dashboard.
//!
//! - `scale`: linear and quantize scales evaluated on the client
//! - `style`: zoom-dependent base style and heatmap opacity
//! - `map_spec`: the Vega spec compiled by the database into map overlays
//! - `chart_spec`: the Vega-Lite damage bar chart
//!
//! Every builder is a pure function of a [`ViewSnapshot`] and the static
//! configuration; building twice from the same inputs yields equal specs.

pub mod chart_spec;
pub mod map_spec;
pub mod scale;
pub mod style;

pub use chart_spec::{chart_spec, ChartSpec, CounterLabel};
pub use map_spec::{map_spec, MapSpec, MapSpecBuilder};

use cfd_core::{DamageFilter, Viewport};
use chrono::NaiveDateTime;

/// UI state captured by value when a refresh is dispatched.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSnapshot {
    pub viewport: Viewport,
    pub cutoff: NaiveDateTime,
    pub filter: DamageFilter,
}
