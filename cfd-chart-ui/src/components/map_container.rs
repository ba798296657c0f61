//! Full-page container mapbox-gl renders into.

use dioxus::prelude::*;

#[derive(Props, Clone, PartialEq)]
pub struct MapContainerProps {
    /// DOM id passed to mapbox-gl as `container`
    pub id: String,
    pub children: Element,
}

#[component]
pub fn MapContainer(props: MapContainerProps) -> Element {
    rsx! {
        div {
            style: "position: relative; width: 100%; height: 100vh;",
            div {
                id: "{props.id}",
                style: "position: absolute; top: 0; bottom: 0; width: 100%;",
            }
            {props.children}
        }
    }
}
