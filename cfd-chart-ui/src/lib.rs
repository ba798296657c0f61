//! Dioxus components and JS bridge for the Camp Fire damage dashboard.
//!
//! This crate provides:
//! - `js_bridge`: wrappers for the mapbox-gl, vega-embed and MapD globals in `assets/js/dashboard.js`
//! - `renderers`: browser implementations of the view controller's data client and renderers
//! - `state`: Reactive AppState with Dioxus Signals
//! - `components`: RSX components (time slider, chart panel, counter, notifications)

pub mod components;
pub mod js_bridge;
pub mod renderers;
pub mod state;
