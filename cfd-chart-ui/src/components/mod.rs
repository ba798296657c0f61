//! RSX components for the damage dashboard.

mod counter_label;
mod damage_chart;
mod error_display;
mod loading_spinner;
mod map_container;
mod notification_list;
mod time_slider;

pub use counter_label::CounterLabelView;
pub use damage_chart::DamageChartPanel;
pub use error_display::ErrorDisplay;
pub use loading_spinner::LoadingSpinner;
pub use map_container::MapContainer;
pub use notification_list::NotificationList;
pub use time_slider::TimeSlider;
