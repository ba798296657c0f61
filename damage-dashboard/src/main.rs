//! Camp Fire Damage Dashboard
//!
//! Overlays server-rendered damage points, damaged buildings, residential
//! parcels and a pre-fire NDVI heatmap on a mapbox-gl map, with a time
//! slider, a replay timer and a linked damage category bar chart.
//!
//! Data flow:
//! 1. On mount: load the JS glue, wait for mapbox-gl / vega-embed / MapD.
//! 2. Connect to the database, create the map and the view controller.
//! 3. Map moves, slider input, play/pause and bar clicks become `ViewEvent`s
//!    sent to a coroutine, which hands each one to the controller.
//! 4. After every event the controller state is copied into `AppState`.

use cfd_chart_ui::components::{
    DamageChartPanel, ErrorDisplay, LoadingSpinner, MapContainer, NotificationList, TimeSlider,
};
use cfd_chart_ui::js_bridge;
use cfd_chart_ui::renderers::{JsChartRenderer, JsMapRenderer, MapdClient};
use cfd_chart_ui::state::AppState;
use cfd_core::DashboardConfig;
use cfd_view::{MapRenderer, ViewController, ViewEvent};
use dioxus::prelude::*;
use futures::channel::oneshot;
use futures::StreamExt;
use std::rc::Rc;

/// DOM id for the vega-embed chart container div.
const CHART_CONTAINER_ID: &str = "damage-chart";

fn main() {
    dioxus_logger::init(dioxus_logger::tracing::Level::INFO).expect("failed to init logger");
    dioxus::LaunchBuilder::new()
        .with_cfg(dioxus::web::Config::new().rootname("damage-dashboard-root"))
        .launch(App);
}

/// Wait until `dashboard.js` has been evaluated.
async fn wait_for_scripts() -> Result<(), String> {
    let (ready_tx, ready_rx) = oneshot::channel::<()>();
    let mut ready_tx = Some(ready_tx);
    js_bridge::set_global_hook("__cfdOnReady", move || {
        if let Some(tx) = ready_tx.take() {
            let _ = tx.send(());
        }
    })
    .map_err(|e| e.to_string())?;
    js_bridge::init_dashboard();
    ready_rx.await.map_err(|_| "dashboard scripts never loaded".to_string())
}

async fn start_controller(
    config: DashboardConfig,
    events: futures::channel::mpsc::UnboundedSender<ViewEvent>,
) -> Result<Rc<ViewController>, String> {
    wait_for_scripts().await?;

    let data = MapdClient::connect(&config.server).await.map_err(|e| e.to_string())?;

    let moved = events.clone();
    js_bridge::set_global_hook("__cfdOnMapMoved", move || {
        if let Some(viewport) = JsMapRenderer.viewport() {
            let _ = moved.unbounded_send(ViewEvent::MapMoved(viewport));
        }
    })
    .map_err(|e| e.to_string())?;
    let map = JsMapRenderer::init(&config.map).map_err(|e| e.to_string())?;

    let controller = ViewController::new(
        config,
        Rc::new(data),
        Rc::new(map),
        Rc::new(JsChartRenderer::new(CHART_CONTAINER_ID)),
    )
    .map_err(|e| e.to_string())?;
    controller
        .connect_chart(Rc::new(move |key: String| {
            let _ = events.unbounded_send(ViewEvent::BarClicked(key));
        }))
        .map_err(|e| e.to_string())?;
    Ok(Rc::new(controller))
}

/// Replay timer: one tick per `timer_delay_ms` until paused or finished.
async fn run_replay(controller: Rc<ViewController>, mut state: AppState, mut timer_running: Signal<bool>) {
    let delay = controller.config().playback.timer_delay_ms;
    loop {
        js_bridge::sleep_ms(delay).await;
        if !controller.replay_state().is_playing() {
            break;
        }
        if let Err(e) = controller.handle(ViewEvent::ReplayTick).await {
            log::warn!("[CFD Debug] replay: {}", e);
        }
        state.sync_from(&controller);
    }
    timer_running.set(false);
}

#[component]
fn App() -> Element {
    let config = use_context_provider(DashboardConfig::default);
    let mut state = use_context_provider(|| AppState::new(&config));
    let mut controller: Signal<Option<Rc<ViewController>>> = use_signal(|| None);
    let timer_running = use_signal(|| false);

    // ─── Event loop: each event is handled in its own task ───
    let events = use_coroutine(move |mut rx: UnboundedReceiver<ViewEvent>| async move {
        while let Some(event) = rx.next().await {
            let Some(ctrl) = controller.peek().clone() else {
                log::debug!("[CFD Debug] dropping {:?} before startup", event);
                continue;
            };
            let toggled = event == ViewEvent::PlayToggled;
            spawn(async move {
                if let Err(e) = ctrl.handle(event).await {
                    log::warn!("[CFD Debug] controller: {}", e);
                }
                state.sync_from(&ctrl);
                if toggled && ctrl.replay_state().is_playing() && !*timer_running.peek() {
                    let mut running = timer_running;
                    running.set(true);
                    spawn(run_replay(ctrl, state, timer_running));
                }
            });
        }
    });

    // ─── Startup: scripts, database connection, map, controller ───
    let startup_config = config.clone();
    use_effect(move || {
        let config = startup_config.clone();
        spawn(async move {
            match start_controller(config, events.tx()).await {
                Ok(ctrl) => controller.set(Some(ctrl)),
                Err(e) => {
                    log::error!("[CFD Debug] startup: {}", e);
                    state.error_msg.set(Some(e));
                }
            }
            state.loading.set(false);
        });
    });

    use_drop(move || {
        if let Some(ctrl) = controller.peek().as_ref() {
            ctrl.dispose();
        }
    });

    let on_event = move |event: ViewEvent| events.send(event);

    rsx! {
        div {
            style: "margin: 0; font-family: Arial, sans-serif;",

            if let Some(err) = state.error_msg.read().as_ref() {
                ErrorDisplay { message: err.clone() }
            }

            MapContainer {
                id: config.map.container.clone(),
                if *state.loading.read() {
                    LoadingSpinner {}
                }
                NotificationList {}
                DamageChartPanel {
                    id: CHART_CONTAINER_ID.to_string(),
                    on_event: on_event,
                }
                TimeSlider { on_event: on_event }
            }
        }
    }
}
