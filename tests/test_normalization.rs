use celestia_client::{
    normalize_insights, normalize_swaps, parse_meal_plan, parse_recipe, render_safe,
    render_serialize, MealPlanPayload, RecipeViewModel,
};
use serde::{Serialize, Serializer};
use serde_json::{json, Value};

#[test]
fn test_render_scalars() {
    assert_eq!(render_safe(&json!("plain")), "plain");
    assert_eq!(render_safe(&json!(42)), "42");
    assert_eq!(render_safe(&json!(1.5)), "1.5");
    assert_eq!(render_safe(&json!(true)), "true");
    assert_eq!(render_safe(&Value::Null), "");
}

#[test]
fn test_render_title_and_message() {
    assert_eq!(render_safe(&json!({"title": "T", "message": "M"})), "T: M");
    assert_eq!(
        render_safe(&json!({"type": "x", "title": "T", "message": "M"})),
        "T: M"
    );
}

#[test]
fn test_render_array_joins_lines() {
    let a = json!({"text": "Eat more greens"});
    let b = json!("Walk daily");
    assert_eq!(
        render_safe(&json!([a.clone(), b.clone()])),
        format!("{}\n{}", render_safe(&a), render_safe(&b))
    );
}

struct SelfReferential;

impl Serialize for SelfReferential {
    fn serialize<S: Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
        Err(serde::ser::Error::custom("cycle detected"))
    }
}

#[test]
fn test_render_unserializable_value() {
    assert_eq!(render_serialize(&SelfReferential), "Unable to display content");
}

#[test]
fn test_parse_soup_recipe() {
    let recipe = parse_recipe(
        "## Soup\n### Ingredients\n- water\n- salt\n### Instructions\n1. Boil\n2. Serve",
    );
    assert_eq!(
        recipe,
        RecipeViewModel {
            title: "Soup".to_string(),
            ingredients: vec!["water".to_string(), "salt".to_string()],
            instructions: vec!["Boil".to_string(), "Serve".to_string()],
            nutrition_info: String::new(),
            health_benefits: String::new(),
            regional_variations: String::new(),
        }
    );
}

#[test]
fn test_parse_recipe_without_headings() {
    let recipe = parse_recipe("no headings here");
    assert_eq!(recipe.title, "Generated Recipe");
    assert!(recipe.ingredients.is_empty());
    assert!(recipe.instructions.is_empty());
}

#[test]
fn test_swap_defaults() {
    let swaps = normalize_swaps(&[json!({"original": "rice", "swap": "quinoa", "reason": "more fiber"})]);
    assert_eq!(swaps.len(), 1);
    assert_eq!(swaps[0].original, "rice");
    assert_eq!(swaps[0].alternative, "quinoa");
    assert_eq!(swaps[0].benefits, "more fiber");
    assert_eq!(swaps[0].indian_benefit, "Culturally appropriate choice");
}

#[test]
fn test_swap_fallback_record() {
    let swaps = normalize_swaps(&[json!("not-an-object")]);
    assert_eq!(swaps[0].original, "Unknown item");
    assert_eq!(swaps[0].alternative, "Healthier option");
    assert_eq!(swaps[0].benefits, "Better nutrition profile");
    assert_eq!(swaps[0].indian_benefit, "Culturally appropriate");
}

#[test]
fn test_swaps_serialize_camel_case() {
    let swaps = normalize_swaps(&[json!({})]);
    let value = serde_json::to_value(&swaps[0]).unwrap();
    assert_eq!(value["indianBenefit"], "Culturally appropriate choice");
}

#[test]
fn test_insights_missing_macro_balance() {
    let err = normalize_insights(&json!({"concerns": ["sodium"]})).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid response structure: missing macro_balance data"
    );
}

#[test]
fn test_meal_plan_one_day() {
    let plan = parse_meal_plan("Day 1\nBreakfast\nOats (300 cal)\nLunch\nSalad");
    assert_eq!(plan.days.len(), 1);

    let meals = serde_json::to_value(&plan.days[0].meals).unwrap();
    assert_eq!(
        meals,
        json!({
            "breakfast": [{"name": "Oats", "calories": "300"}],
            "lunch": [{"name": "Salad", "calories": null}]
        })
    );
}

#[test]
fn test_meal_plan_payload_from_text() {
    let payload = MealPlanPayload::from_response(&json!({
        "plan": "Monday\nDinner\nKhichdi (420 kcal)"
    }))
    .unwrap();
    match payload {
        MealPlanPayload::Parsed(plan) => {
            assert_eq!(plan.days[0].day, "Monday");
            assert_eq!(plan.days[0].meals["dinner"][0].calories.as_deref(), Some("420"));
        }
        other => panic!("Expected a parsed plan, got {:?}", other),
    }
}
