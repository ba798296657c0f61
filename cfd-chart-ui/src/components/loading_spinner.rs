use dioxus::prelude::*;

/// Overlay shown until the map has loaded and the database has connected.
#[component]
pub fn LoadingSpinner() -> Element {
    rsx! {
        div {
            style: "position: absolute; top: 50%; left: 50%; transform: translate(-50%, -50%); padding: 12px 20px; background: rgba(255, 255, 255, 0.85); border-radius: 4px; color: #666; z-index: 2;",
            "Connecting to damage data..."
        }
    }
}
