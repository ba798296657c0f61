//! Typed wrappers around JS interop.
//!
//! Map, chart and database glue lives in `assets/js/dashboard.js`, evaluated
//! at global scope once mapbox-gl, vega-embed and the MapD connector have
//! loaded. Functions there are plain globals; this module looks them up on
//! `window` and calls them with `js_sys::Function::apply`.

use cfd_core::{DashboardError, Result};
use js_sys::{Array, Function, Promise, Reflect};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

static DASHBOARD_JS: &str = include_str!("../assets/js/dashboard.js");

/// Evaluate the dashboard glue once the third-party libraries are present,
/// then run `window.__cfdOnReady`.
pub fn init_dashboard() {
    let store_js = format!(
        "window.__cfdDashboardScript = {};",
        serde_json::to_string(DASHBOARD_JS).unwrap_or_default()
    );
    let _ = js_sys::eval(&store_js);

    let init_js = r#"
        (function() {
            var waitForLibs = setInterval(function() {
                if (typeof mapboxgl !== 'undefined' &&
                    typeof vegaEmbed !== 'undefined' &&
                    typeof MapdCon !== 'undefined') {
                    clearInterval(waitForLibs);
                    (0, eval)(window.__cfdDashboardScript);
                    delete window.__cfdDashboardScript;
                    window.__cfdReady = true;
                    console.log('[CFD Debug] dashboard scripts initialized');
                    if (typeof window.__cfdOnReady === 'function') window.__cfdOnReady();
                }
            }, 100);
        })();
    "#;
    let _ = js_sys::eval(init_js);
}

/// Register `callback` as a zero-argument global hook, e.g. `__cfdOnReady`.
///
/// The closure is leaked; hooks live as long as the page.
pub fn set_global_hook(name: &str, callback: impl FnMut() + 'static) -> Result<()> {
    let closure = Closure::<dyn FnMut()>::new(callback);
    let window = window()?;
    Reflect::set(&window, &JsValue::from_str(name), closure.as_ref())
        .map_err(|e| DashboardError::Render(js_error_message(&e)))?;
    closure.forget();
    Ok(())
}

/// Best-effort message out of a thrown JS value.
pub fn js_error_message(value: &JsValue) -> String {
    if let Some(s) = value.as_string() {
        return s;
    }
    Reflect::get(value, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
        .unwrap_or_else(|| format!("{:?}", value))
}

fn window() -> Result<JsValue> {
    web_sys::window()
        .map(JsValue::from)
        .ok_or_else(|| DashboardError::Render("no window".to_string()))
}

fn global_fn(name: &str) -> std::result::Result<Function, String> {
    let window = window().map_err(|e| e.to_string())?;
    Reflect::get(&window, &JsValue::from_str(name))
        .map_err(|e| js_error_message(&e))?
        .dyn_into::<Function>()
        .map_err(|_| format!("{} is not loaded", name))
}

/// Call a global function synchronously.
pub fn call_global(name: &str, args: &[JsValue]) -> std::result::Result<JsValue, String> {
    let function = global_fn(name)?;
    let args: Array = args.iter().collect();
    function
        .apply(&JsValue::NULL, &args)
        .map_err(|e| js_error_message(&e))
}

/// Call a global function returning a Promise and await it.
pub async fn call_global_async(name: &str, args: &[JsValue]) -> std::result::Result<JsValue, String> {
    let value = call_global(name, args)?;
    let promise = Promise::resolve(&value);
    JsFuture::from(promise)
        .await
        .map_err(|e| js_error_message(&e))
}

/// Resolve after `ms` milliseconds; drives the replay timer.
pub async fn sleep_ms(ms: u32) {
    if let Err(e) = call_global_async("cfdTimeout", &[JsValue::from(ms)]).await {
        log::warn!("[CFD Debug] timer: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::DASHBOARD_JS;

    fn function_body(name: &str) -> &'static str {
        let start = DASHBOARD_JS
            .find(&format!("function {}(", name))
            .unwrap_or_else(|| panic!("{} missing", name));
        let rest = &DASHBOARD_JS[start..];
        let end = rest.find("\n}\n").unwrap();
        &rest[..end]
    }

    #[test]
    fn viewport_is_available_while_tiles_load() {
        let viewport = function_body("cfdViewport");
        assert!(!viewport.contains("loaded()"));
        assert!(viewport.contains("cfdState.mapReady"));

        assert!(function_body("cfdOnMapLoad").contains("cfdState.mapReady = true"));
        assert!(DASHBOARD_JS.contains("map.on('load', cfdOnMapLoad)"));
    }
}
