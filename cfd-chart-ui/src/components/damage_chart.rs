//! Damage chart panel: counter, vega-embed container and the "show all" link.

use super::CounterLabelView;
use crate::state::AppState;
use cfd_view::ViewEvent;
use dioxus::prelude::*;

#[derive(Props, Clone, PartialEq)]
pub struct DamageChartPanelProps {
    /// DOM id vega-embed renders the chart into
    pub id: String,
    pub on_event: EventHandler<ViewEvent>,
}

#[component]
pub fn DamageChartPanel(props: DamageChartPanelProps) -> Element {
    let state = use_context::<AppState>();
    let filter_label = (state.filter_label)();

    rsx! {
        div {
            style: "position: absolute; top: 12px; right: 12px; width: 240px; padding: 8px 10px; background: rgba(255, 255, 255, 0.9); border-radius: 4px; z-index: 1;",
            CounterLabelView {}
            div {
                id: "{props.id}",
                style: "min-height: 160px;",
            }
            div {
                style: "display: flex; justify-content: space-between; font-size: 12px; color: #666;",
                span { "Showing: {filter_label}" }
                a {
                    href: "#",
                    onclick: move |evt: Event<MouseData>| {
                        evt.prevent_default();
                        props.on_event.call(ViewEvent::ShowAll);
                    },
                    "show all damage"
                }
            }
        }
    }
}
