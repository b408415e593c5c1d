use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::vision::fridge::AnalysisResult;

// Daily recommended values (simplified for an adult profile)
const DAILY_NUTRIENTS: &[(&str, f64)] = &[
    ("protein", 56.0), // g
    ("vitamin_C_mg", 90.0),
    ("iron_mg", 8.0),
    ("calcium_mg", 1000.0),
];

#[derive(Debug, Error)]
pub enum GapsError {
    #[error("Recipe not found")]
    RecipeNotFound,
}

#[derive(Debug, Clone, Serialize)]
pub struct GapReport {
    pub chosen_recipe: String,
    pub covered: Map<String, Value>,
    pub still_missing_today: GapSummary,
}

/// Either the per-nutrient shortfall lines, or a literal "all set" message so
/// the field stays self-describing for direct display.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum GapSummary {
    Missing(BTreeMap<String, String>),
    AllSet(String),
}

/// Compare a chosen recipe's recorded micronutrients against the daily
/// targets and report what a day eating it would still lack.
pub fn calculate_gaps(
    recipe_name: &str,
    analysis: &AnalysisResult,
) -> Result<GapReport, GapsError> {
    let recipe = analysis
        .recipes
        .iter()
        .find(|r| r.name == recipe_name)
        .ok_or(GapsError::RecipeNotFound)?;

    let micros = &recipe.micronutrients;

    let mut missing = BTreeMap::new();
    for (nutrient, daily) in DAILY_NUTRIENTS {
        let current = micros.get(*nutrient).map(coerce_amount).unwrap_or(0.0);
        let shortfall = daily - current;
        if shortfall > 0.0 {
            missing.insert(
                (*nutrient).to_string(),
                format!("Need {}{} more", shortfall, unit_suffix(nutrient)),
            );
        }
    }

    let covered = micros
        .iter()
        .filter(|(name, _)| DAILY_NUTRIENTS.iter().any(|(tracked, _)| *tracked == name.as_str()))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();

    let still_missing_today = if missing.is_empty() {
        GapSummary::AllSet("You're all set!".to_string())
    } else {
        GapSummary::Missing(missing)
    };

    Ok(GapReport {
        chosen_recipe: recipe_name.to_string(),
        covered,
        still_missing_today,
    })
}

/// Recorded values arrive as numbers or unit-suffixed strings ("85mg",
/// "5.2g"); anything unreadable counts as zero.
fn coerce_amount(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => {
            let trimmed = s.trim();
            let stripped = trimmed
                .strip_suffix("mg")
                .or_else(|| trimmed.strip_suffix("g"))
                .unwrap_or(trimmed);
            stripped.trim().parse().unwrap_or(0.0)
        }
        _ => 0.0,
    }
}

fn unit_suffix(nutrient: &str) -> &'static str {
    if nutrient.ends_with("_mg") {
        "mg"
    } else {
        "g"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn analysis_with(micronutrients: Value) -> AnalysisResult {
        serde_json::from_value(json!({
            "ingredients": [],
            "recipes": [{
                "name": "Grilled Chicken Bowl",
                "ingredients_used": ["chicken 300g"],
                "instructions": "1. Grill chicken.",
                "macros": {"calories": 520},
                "micronutrients": micronutrients
            }],
            "shopping_suggestions": []
        }))
        .unwrap()
    }

    #[test]
    fn unknown_recipe_is_a_typed_error() {
        let analysis = analysis_with(json!({}));
        assert!(matches!(
            calculate_gaps("Mystery Soup", &analysis),
            Err(GapsError::RecipeNotFound)
        ));
    }

    #[test]
    fn absent_protein_reports_the_full_daily_target_in_grams() {
        let analysis = analysis_with(json!({"vitamin_C_mg": 90, "iron_mg": 8, "calcium_mg": 1000}));
        let report = calculate_gaps("Grilled Chicken Bowl", &analysis).unwrap();

        match report.still_missing_today {
            GapSummary::Missing(ref gaps) => {
                assert_eq!(gaps["protein"], "Need 56g more");
                assert_eq!(gaps.len(), 1);
            }
            ref other => panic!("expected shortfalls, got {other:?}"),
        }
    }

    #[test]
    fn unit_suffixed_strings_are_coerced() {
        let analysis = analysis_with(json!({
            "protein": "60g",
            "vitamin_C_mg": "85mg",
            "iron_mg": 8,
            "calcium_mg": 1000
        }));
        let report = calculate_gaps("Grilled Chicken Bowl", &analysis).unwrap();

        match report.still_missing_today {
            GapSummary::Missing(ref gaps) => {
                assert_eq!(gaps["vitamin_C_mg"], "Need 5mg more");
                assert!(!gaps.contains_key("protein"));
            }
            ref other => panic!("expected shortfalls, got {other:?}"),
        }
    }

    #[test]
    fn unreadable_values_count_as_zero() {
        let analysis = analysis_with(json!({"iron_mg": "plenty"}));
        let report = calculate_gaps("Grilled Chicken Bowl", &analysis).unwrap();

        match report.still_missing_today {
            GapSummary::Missing(ref gaps) => assert_eq!(gaps["iron_mg"], "Need 8mg more"),
            ref other => panic!("expected shortfalls, got {other:?}"),
        }
    }

    #[test]
    fn meeting_every_target_reports_all_set() {
        let analysis = analysis_with(json!({
            "protein": 60,
            "vitamin_C_mg": 95,
            "iron_mg": 10,
            "calcium_mg": 1200
        }));
        let report = calculate_gaps("Grilled Chicken Bowl", &analysis).unwrap();

        let rendered = serde_json::to_value(&report).unwrap();
        assert_eq!(rendered["still_missing_today"], json!("You're all set!"));
    }

    #[test]
    fn covered_only_lists_tracked_nutrients() {
        let analysis = analysis_with(json!({"protein": 60, "zinc_mg": 4}));
        let report = calculate_gaps("Grilled Chicken Bowl", &analysis).unwrap();

        assert!(report.covered.contains_key("protein"));
        assert!(!report.covered.contains_key("zinc_mg"));
    }
}
