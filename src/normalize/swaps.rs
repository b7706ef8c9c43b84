use super::Outcome;
use crate::model::SwapViewModel;
use crate::render::{render_number, render_safe, truthy_field};
use log::{error, warn};
use serde_json::Value;

/// Normalize the `swaps` array of a `/recommendations/swaps` response.
pub fn normalize_swaps(raw: &[Value]) -> Vec<SwapViewModel> {
    raw.iter()
        .enumerate()
        .map(|(index, swap)| match swap {
            Value::Object(_) => SwapViewModel {
                original: stringify_or(swap.get("original"), "Current food item"),
                alternative: stringify_or(swap.get("swap"), "Healthier alternative"),
                benefits: stringify_or(swap.get("reason"), "Better nutritional profile"),
                indian_benefit: stringify_or(
                    swap.get("indian_benefit"),
                    "Culturally appropriate choice",
                ),
            },
            other => {
                error!("Invalid swap at index {}: {}", index, other);
                SwapViewModel {
                    original: "Unknown item".to_string(),
                    alternative: "Healthier option".to_string(),
                    benefits: "Better nutrition profile".to_string(),
                    indian_benefit: "Culturally appropriate".to_string(),
                }
            }
        })
        .collect()
}

/// Validate a whole swaps response. An empty list is not an error, just
/// nothing to show.
pub fn swaps_outcome(response: &Value) -> Outcome<Vec<SwapViewModel>> {
    match response.get("swaps") {
        Some(Value::Array(swaps)) if swaps.is_empty() => {
            Outcome::Empty("No healthy swaps available for this meal".to_string())
        }
        Some(Value::Array(swaps)) => Outcome::Ok(normalize_swaps(swaps)),
        _ => {
            warn!("Swaps response without a swaps array");
            Outcome::Error("Invalid response format: missing swaps array".to_string())
        }
    }
}

/// Turn a loosely typed field into a non-empty display string
pub(crate) fn stringify_or(value: Option<&Value>, fallback: &str) -> String {
    let rendered = match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.trim().to_string()),
        Some(Value::Object(map)) => Some(
            truthy_field(map, "name")
                .or_else(|| truthy_field(map, "title"))
                .or_else(|| truthy_field(map, "description"))
                .map(render_safe)
                .or_else(|| serde_json::to_string(map).ok())
                .unwrap_or_default(),
        ),
        Some(Value::Array(items)) => serde_json::to_string(items).ok(),
        Some(Value::Number(n)) => Some(render_number(n)),
        Some(Value::Bool(b)) => Some(b.to_string()),
    };

    rendered
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_indian_benefit_gets_default() {
        let swaps = normalize_swaps(&[json!({
            "original": "rice",
            "swap": "quinoa",
            "reason": "more fiber"
        })]);
        assert_eq!(
            swaps,
            vec![SwapViewModel {
                original: "rice".to_string(),
                alternative: "quinoa".to_string(),
                benefits: "more fiber".to_string(),
                indian_benefit: "Culturally appropriate choice".to_string(),
            }]
        );
    }

    #[test]
    fn test_non_object_gets_full_fallback() {
        let swaps = normalize_swaps(&[json!("not-an-object"), Value::Null]);
        assert_eq!(swaps.len(), 2);
        for swap in swaps {
            assert_eq!(swap.original, "Unknown item");
            assert_eq!(swap.alternative, "Healthier option");
            assert_eq!(swap.benefits, "Better nutrition profile");
            assert_eq!(swap.indian_benefit, "Culturally appropriate");
        }
    }

    #[test]
    fn test_nested_objects_and_odd_types() {
        let swaps = normalize_swaps(&[json!({
            "original": {"name": "white bread"},
            "swap": {"title": "multigrain roti"},
            "reason": {"grams_fiber": 4},
            "indian_benefit": 12
        })]);
        assert_eq!(swaps[0].original, "white bread");
        assert_eq!(swaps[0].alternative, "multigrain roti");
        assert_eq!(swaps[0].benefits, r#"{"grams_fiber":4}"#);
        assert_eq!(swaps[0].indian_benefit, "12");
    }

    #[test]
    fn test_blank_strings_use_fallbacks() {
        let swaps = normalize_swaps(&[json!({"original": "   ", "swap": null})]);
        assert_eq!(swaps[0].original, "Current food item");
        assert_eq!(swaps[0].alternative, "Healthier alternative");
        assert_eq!(swaps[0].benefits, "Better nutritional profile");
    }

    #[test]
    fn test_strings_are_trimmed() {
        assert_eq!(stringify_or(Some(&json!("  ghee  ")), "x"), "ghee");
        assert_eq!(stringify_or(None, "x"), "x");
    }

    #[test]
    fn test_swaps_outcome() {
        assert_eq!(
            swaps_outcome(&json!({"swaps": []})),
            Outcome::Empty("No healthy swaps available for this meal".to_string())
        );
        assert_eq!(
            swaps_outcome(&json!({"message": "oops"})),
            Outcome::Error("Invalid response format: missing swaps array".to_string())
        );
        match swaps_outcome(&json!({"swaps": [{"original": "soda", "swap": "buttermilk"}]})) {
            Outcome::Ok(swaps) => assert_eq!(swaps[0].alternative, "buttermilk"),
            other => panic!("Expected swaps, got {:?}", other),
        }
    }
}
