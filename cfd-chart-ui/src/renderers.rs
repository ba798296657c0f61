//! Browser implementations of the view controller's seams.

use crate::js_bridge::{call_global, call_global_async};
use async_trait::async_trait;
use cfd_core::config::{MapConfig, ServerConfig};
use cfd_core::{DashboardError, Result, Viewport};
use cfd_query::Row;
use cfd_spec::{ChartSpec, MapSpec};
use cfd_view::{ChartRenderer, DataClient, MapRenderer, OverlayImage, SelectionListener, SubscriptionId};
use std::cell::RefCell;
use std::collections::HashMap;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsValue;

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| DashboardError::Render(e.to_string()))
}

/// mapbox-gl map owned by `dashboard.js`.
pub struct JsMapRenderer;

impl JsMapRenderer {
    /// Create the mapbox-gl map in `config.container`.
    pub fn init(config: &MapConfig) -> Result<Self> {
        let config_json = to_json(config)?;
        call_global("cfdInitMap", &[JsValue::from_str(&config_json)]).map_err(DashboardError::Render)?;
        Ok(JsMapRenderer)
    }
}

impl MapRenderer for JsMapRenderer {
    fn viewport(&self) -> Option<Viewport> {
        let json = call_global("cfdViewport", &[]).ok()?.as_string()?;
        match serde_json::from_str(&json) {
            Ok(viewport) => Some(viewport),
            Err(e) => {
                log::warn!("[CFD Debug] map: unreadable viewport {}: {}", json, e);
                None
            }
        }
    }

    fn style(&self) -> String {
        call_global("cfdStyle", &[])
            .ok()
            .and_then(|v| v.as_string())
            .unwrap_or_default()
    }

    fn set_style(&self, style: &str) -> Result<()> {
        call_global("cfdSetStyle", &[JsValue::from_str(style)])
            .map(|_| ())
            .map_err(DashboardError::Render)
    }

    fn set_overlay(&self, overlay: &OverlayImage) -> Result<()> {
        let bounds = to_json(&overlay.bounds)?;
        call_global(
            "cfdSetOverlay",
            &[JsValue::from_str(&overlay.image), JsValue::from_str(&bounds)],
        )
        .map(|_| ())
        .map_err(DashboardError::Render)
    }

    fn zoom_out(&self) {
        if let Err(e) = call_global("cfdZoomOut", &[]) {
            log::warn!("[CFD Debug] map: zoom out failed: {}", e);
        }
    }
}

/// vega-embed chart rendered into a container div.
pub struct JsChartRenderer {
    container_id: String,
    listeners: RefCell<HashMap<SubscriptionId, Closure<dyn Fn(String)>>>,
}

impl JsChartRenderer {
    pub fn new(container_id: impl Into<String>) -> Self {
        Self {
            container_id: container_id.into(),
            listeners: RefCell::new(HashMap::new()),
        }
    }
}

#[async_trait(?Send)]
impl ChartRenderer for JsChartRenderer {
    async fn render(&self, spec: &ChartSpec) -> Result<()> {
        call_global_async(
            "cfdRenderChart",
            &[
                JsValue::from_str(&self.container_id),
                JsValue::from_str(&spec.to_json_string()),
            ],
        )
        .await
        .map(|_| ())
        .map_err(DashboardError::Render)
    }

    fn subscribe(&self, signal: &str, listener: SelectionListener) -> Result<SubscriptionId> {
        let closure = Closure::<dyn Fn(String)>::new(move |key: String| listener(key));
        let id = call_global("cfdSubscribe", &[JsValue::from_str(signal), closure.as_ref().clone()])
            .map_err(DashboardError::Render)?
            .as_f64()
            .map(|v| SubscriptionId(v as u32))
            .ok_or_else(|| DashboardError::Render(format!("no subscription id for {}", signal)))?;
        self.listeners.borrow_mut().insert(id, closure);
        Ok(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        if let Err(e) = call_global("cfdUnsubscribe", &[JsValue::from(id.0)]) {
            log::warn!("[CFD Debug] chart: unsubscribe failed: {}", e);
        }
        self.listeners.borrow_mut().remove(&id);
    }
}

/// MapD/OmniSci connection held by `dashboard.js`.
pub struct MapdClient;

impl MapdClient {
    pub async fn connect(server: &ServerConfig) -> Result<Self> {
        let server_json = to_json(server)?;
        call_global_async("cfdConnect", &[JsValue::from_str(&server_json)])
            .await
            .map_err(|e| DashboardError::QueryExecution(format!("connect to {}: {}", server.host, e)))?;
        log::info!("[CFD Debug] data: connected to {}:{}", server.host, server.port);
        Ok(MapdClient)
    }
}

#[async_trait(?Send)]
impl DataClient for MapdClient {
    async fn query(&self, sql: &str) -> Result<Vec<Row>> {
        let value = call_global_async("cfdQuery", &[JsValue::from_str(sql)])
            .await
            .map_err(DashboardError::QueryExecution)?;
        let json = value
            .as_string()
            .ok_or_else(|| DashboardError::QueryExecution("query returned no rows".to_string()))?;
        serde_json::from_str(&json).map_err(|e| DashboardError::QueryExecution(e.to_string()))
    }

    async fn render(&self, spec: &MapSpec) -> Result<OverlayImage> {
        let bounds = spec
            .bounds()
            .ok_or_else(|| DashboardError::SpecCompilation("spec has no projection bounds".to_string()))?;
        let image = call_global_async("cfdRenderVega", &[JsValue::from_str(&spec.to_json_string())])
            .await
            .map_err(DashboardError::SpecCompilation)?
            .as_string()
            .ok_or_else(|| DashboardError::SpecCompilation("render returned no image".to_string()))?;
        Ok(OverlayImage { image, bounds })
    }
}

impl Drop for JsChartRenderer {
    fn drop(&mut self) {
        for (id, _) in self.listeners.borrow_mut().drain() {
            let _ = call_global("cfdUnsubscribe", &[JsValue::from(id.0)]);
        }
    }
}
