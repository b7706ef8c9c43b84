use crate::model::RecipeViewModel;
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

lazy_static! {
    // A level-two heading; `###` section headings never match
    static ref TITLE_REGEX: Regex =
        Regex::new(r"(?m)^[ \t]*##[ \t]*([^#\s][^\n]*)").expect("title pattern should be valid");
    static ref INGREDIENTS_REGEX: Regex = section_regex("Ingredients");
    static ref INSTRUCTIONS_REGEX: Regex = section_regex("Instructions");
    static ref NUTRITION_REGEX: Regex = section_regex("Nutrition Info");
    static ref BENEFITS_REGEX: Regex = section_regex("Health Benefits");
    static ref VARIATIONS_REGEX: Regex = section_regex("Regional Variations");
}

fn section_regex(heading: &str) -> Regex {
    Regex::new(&format!(r"(?i)###[ \t]*{}", regex::escape(heading)))
        .expect("section pattern should be valid")
}

/// Parse the markdown recipe returned by `/recommendations/recipe`.
///
/// Every section is located independently, so a missing or garbled section
/// leaves the others intact:
///
/// ```text
/// ## Masala Oats
/// ### Ingredients
/// - 1 cup oats
/// ### Instructions
/// 1. Roast the oats
/// ```
pub fn parse_recipe(markdown: &str) -> RecipeViewModel {
    let mut recipe = RecipeViewModel::default();

    if let Some(title) = TITLE_REGEX
        .captures(markdown)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|title| !title.is_empty())
    {
        recipe.title = title.to_string();
    }

    if let Some(body) = section(markdown, &INGREDIENTS_REGEX) {
        recipe.ingredients = list_lines(body, |c| c.is_whitespace() || c == '-');
    }

    if let Some(body) = section(markdown, &INSTRUCTIONS_REGEX) {
        recipe.instructions = list_lines(body, |c| {
            c.is_whitespace() || c.is_ascii_digit() || matches!(c, '.' | ')' | '-')
        });
    }

    if let Some(body) = section(markdown, &NUTRITION_REGEX) {
        recipe.nutrition_info = body.trim().to_string();
    }

    if let Some(body) = section(markdown, &BENEFITS_REGEX) {
        recipe.health_benefits = body.trim().to_string();
    }

    if let Some(body) = section(markdown, &VARIATIONS_REGEX) {
        recipe.regional_variations = body.trim().to_string();
    }

    debug!(
        "Parsed recipe '{}' ({} ingredients, {} steps)",
        recipe.title,
        recipe.ingredients.len(),
        recipe.instructions.len()
    );
    recipe
}

/// Text after `heading` up to the next `###` or the end of input
fn section<'a>(markdown: &'a str, heading: &Regex) -> Option<&'a str> {
    let found = heading.find(markdown)?;
    let rest = &markdown[found.end()..];
    let end = rest.find("###").unwrap_or(rest.len());
    Some(&rest[..end])
}

fn list_lines(body: &str, is_marker: impl Fn(char) -> bool) -> Vec<String> {
    body.lines()
        .map(|line| line.trim_start_matches(&is_marker).trim())
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_recipe() {
        let recipe = parse_recipe(
            "## Soup\n### Ingredients\n- water\n- salt\n### Instructions\n1. Boil\n2. Serve",
        );
        assert_eq!(recipe.title, "Soup");
        assert_eq!(recipe.ingredients, vec!["water", "salt"]);
        assert_eq!(recipe.instructions, vec!["Boil", "Serve"]);
        assert_eq!(recipe.nutrition_info, "");
        assert_eq!(recipe.health_benefits, "");
        assert_eq!(recipe.regional_variations, "");
    }

    #[test]
    fn test_no_headings_uses_defaults() {
        let recipe = parse_recipe("no headings here");
        assert_eq!(recipe.title, "Generated Recipe");
        assert!(recipe.ingredients.is_empty());
        assert!(recipe.instructions.is_empty());
    }

    #[test]
    fn test_all_sections() {
        let markdown = "\
## Vegetable Poha

### Ingredients
- 2 cups flattened rice
-   1 onion, chopped

### Instructions
1) Rinse the poha.
2. Temper mustard seeds.
10. Serve hot.

### Nutrition Info
Calories: 250 per serving

### Health Benefits
Light and easy to digest.

### Regional Variations
Indori poha adds sev on top.
";
        let recipe = parse_recipe(markdown);
        assert_eq!(recipe.title, "Vegetable Poha");
        assert_eq!(
            recipe.ingredients,
            vec!["2 cups flattened rice", "1 onion, chopped"]
        );
        assert_eq!(
            recipe.instructions,
            vec!["Rinse the poha.", "Temper mustard seeds.", "Serve hot."]
        );
        assert_eq!(recipe.nutrition_info, "Calories: 250 per serving");
        assert_eq!(recipe.health_benefits, "Light and easy to digest.");
        assert_eq!(recipe.regional_variations, "Indori poha adds sev on top.");
    }

    #[test]
    fn test_missing_section_does_not_block_others() {
        let recipe = parse_recipe("### Instructions\n1. Stir\n### Health Benefits\nFiber");
        assert_eq!(recipe.title, "Generated Recipe");
        assert!(recipe.ingredients.is_empty());
        assert_eq!(recipe.instructions, vec!["Stir"]);
        assert_eq!(recipe.health_benefits, "Fiber");
    }

    #[test]
    fn test_section_headings_are_not_titles() {
        let recipe = parse_recipe("### Ingredients\n- rice\n## Khichdi");
        assert_eq!(recipe.title, "Khichdi");
        assert_eq!(recipe.ingredients, vec!["rice", "## Khichdi"]);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse_recipe(""), RecipeViewModel::default());
    }
}
