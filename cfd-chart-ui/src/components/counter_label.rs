use crate::state::AppState;
use dioxus::prelude::*;

/// Headline count of the most damaged category, in that category's colour.
#[component]
pub fn CounterLabelView() -> Element {
    let state = use_context::<AppState>();
    let counter = (state.counter)();
    let count = counter.as_ref().map(|c| format_count(c.count)).unwrap_or_default();

    rsx! {
        div {
            style: "font-family: Arial, sans-serif; margin-bottom: 4px;",
            if let Some(counter) = counter {
                span {
                    style: "font-size: 28px; font-weight: bold; color: {counter.color}; text-shadow: 0 0 1px #333;",
                    "{count}"
                }
                span {
                    style: "font-size: 13px; color: #666; margin-left: 6px;",
                    "structures {counter.label} damaged"
                }
            } else {
                span { style: "font-size: 13px; color: #999;", "No damage data yet" }
            }
        }
    }
}

/// Thousands separators, matching the chart's `,d` format.
fn format_count(count: u64) -> String {
    let digits = count.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::format_count;

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(13972), "13,972");
        assert_eq!(format_count(1_234_567), "1,234,567");
    }
}
