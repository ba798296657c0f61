//! Fatal startup error banner.

use dioxus::prelude::*;

#[derive(Props, Clone, PartialEq)]
pub struct ErrorDisplayProps {
    pub message: String,
}

/// Shown in place of the dashboard when the map or database cannot start.
#[component]
pub fn ErrorDisplay(props: ErrorDisplayProps) -> Element {
    rsx! {
        div {
            class: "cfd-error",
            style: "padding: 12px 16px; margin: 8px; background: #FFEBEE; color: #C62828; border-radius: 4px; border: 1px solid #EF9A9A;",
            strong { "Dashboard unavailable: " }
            "{props.message}"
        }
    }
}
