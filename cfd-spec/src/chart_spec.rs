//! Vega-Lite spec for the damage category bar chart.

use cfd_core::DashboardConfig;
use cfd_query::CategoryCount;
use serde::Serialize;
use serde_json::{json, Value};

/// Name of the click selection carrying the chosen `damageKey`.
pub const BAR_SELECTION: &str = "barSelection";

/// A Vega-Lite bar chart spec.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ChartSpec(Value);

impl ChartSpec {
    pub fn as_json(&self) -> &Value {
        &self.0
    }

    pub fn to_json_string(&self) -> String {
        self.0.to_string()
    }
}

/// The headline count shown above the chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CounterLabel {
    pub count: u64,
    pub color: String,
    pub label: String,
}

impl CounterLabel {
    /// Largest category count; `counts` must already be sorted descending.
    pub fn from_counts(counts: &[CategoryCount], config: &DashboardConfig) -> Option<CounterLabel> {
        counts.first().map(|top| CounterLabel {
            count: top.count,
            color: config.color(top.category).to_string(),
            label: config.label(top.category).to_string(),
        })
    }
}

/// One bar per category, in the order given.
pub fn chart_spec(counts: &[CategoryCount], title: &str, config: &DashboardConfig) -> ChartSpec {
    let values: Vec<Value> = counts
        .iter()
        .map(|c| {
            json!({
                "label": config.label(c.category),
                "damageKey": c.category.key(),
                "color": config.color(c.category),
                "count": c.count,
            })
        })
        .collect();

    ChartSpec(json!({
        "width": 190,
        "height": 120,
        "padding": 5,
        "title": {
            "text": title,
            "font": "Arial",
            "fontWeight": "normal",
            "fontSize": 13
        },
        "data": { "values": values },
        "encoding": {
            "x": {
                "field": "count",
                "type": "quantitative",
                "axis": { "title": "", "tickCount": 3, "format": ",d", "grid": false }
            },
            "y": {
                "field": "label",
                "type": "ordinal",
                "sort": null,
                "axis": { "title": "" }
            },
            "color": { "field": "color", "type": "nominal", "scale": null },
            "tooltip": { "field": "count", "type": "quantitative", "format": ",d" },
            "fillOpacity": {
                "condition": { "selection": "select", "value": 1 },
                "value": 0.8
            },
            "strokeWidth": {
                "condition": { "selection": "highlight", "value": 1 },
                "value": 0.5
            }
        },
        "layer": [
            {
                "mark": { "type": "bar", "stroke": "#333", "cursor": "pointer" }
            },
            {
                "mark": {
                    "type": "text",
                    "align": "left",
                    "baseline": "middle",
                    "fontSize": 13,
                    "fontWeight": "bold",
                    "dx": 3
                },
                "encoding": {
                    "text": { "field": "count", "type": "quantitative", "format": ",d" }
                },
                "selection": {
                    "highlight": { "type": "single", "empty": "none", "on": "mouseover" },
                    "select": { "type": "multi" },
                    BAR_SELECTION: { "fields": ["damageKey"], "on": "click", "type": "single" }
                }
            }
        ],
        "config": {
            "scale": { "bandPaddingInner": 0.2 },
            "axis": { "labelColor": "#666", "labelFontSize": 12, "labelFontWeight": "bold" },
            "axisBottom": { "labelColor": "#999" }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfd_core::DamageCategory;

    fn counts() -> Vec<CategoryCount> {
        vec![
            CategoryCount { category: DamageCategory::Destroyed, count: 13_972 },
            CategoryCount { category: DamageCategory::Minor, count: 212 },
            CategoryCount { category: DamageCategory::Other, count: 0 },
        ]
    }

    #[test]
    fn values_carry_label_key_color_and_count() {
        let config = DashboardConfig::default();
        let spec = chart_spec(&counts(), "Nov 10, 2018 14:00", &config);
        let values = spec.as_json()["data"]["values"].as_array().unwrap();
        assert_eq!(values.len(), 3);
        assert_eq!(values[0]["label"], ">50%");
        assert_eq!(values[0]["damageKey"], "Destroyed (>50%)");
        assert_eq!(values[0]["color"], config.color(DamageCategory::Destroyed));
        assert_eq!(values[0]["count"], 13_972);
        assert_eq!(spec.as_json()["title"]["text"], "Nov 10, 2018 14:00");
    }

    #[test]
    fn declares_click_selection_on_damage_key() {
        let config = DashboardConfig::default();
        let spec = chart_spec(&counts(), "t", &config);
        let selection = &spec.as_json()["layer"][1]["selection"][BAR_SELECTION];
        assert_eq!(selection["fields"], json!(["damageKey"]));
        assert_eq!(selection["on"], "click");
        assert!(spec.as_json()["encoding"]["color"]["scale"].is_null());
    }

    #[test]
    fn building_twice_is_identical() {
        let config = DashboardConfig::default();
        assert_eq!(
            chart_spec(&counts(), "t", &config),
            chart_spec(&counts(), "t", &config)
        );
    }

    #[test]
    fn counter_label_uses_top_count() {
        let config = DashboardConfig::default();
        let label = CounterLabel::from_counts(&counts(), &config).unwrap();
        assert_eq!(label.count, 13_972);
        assert_eq!(label.label, ">50%");
        assert!(CounterLabel::from_counts(&[], &config).is_none());
    }
}
