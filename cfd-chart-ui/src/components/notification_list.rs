use crate::state::AppState;
use dioxus::prelude::*;

/// Non-fatal refresh failures. The map and chart keep their last good
/// content while these are shown.
#[component]
pub fn NotificationList() -> Element {
    let mut state = use_context::<AppState>();
    let notes = (state.notifications)();

    rsx! {
        div {
            style: "position: absolute; top: 12px; left: 56px; max-width: 360px; z-index: 3;",
            for (i, note) in notes.into_iter().enumerate() {
                div {
                    key: "{i}-{note}",
                    style: "display: flex; gap: 8px; margin-bottom: 4px; padding: 6px 10px; background: #FFF8E1; color: #8D6E00; border: 1px solid #FFE082; border-radius: 4px; font-size: 12px;",
                    span { style: "flex: 1;", "{note}" }
                    button {
                        style: "border: none; background: none; cursor: pointer;",
                        onclick: move |_| {
                            let mut notes = state.notifications.write();
                            if i < notes.len() {
                                notes.remove(i);
                            }
                        },
                        "x"
                    }
                }
            }
        }
    }
}
