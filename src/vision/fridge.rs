use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::providers::traits::VisionProvider;
use crate::vision::{request_structured, Ingredient, VisionError};

/// Structured extraction of visible ingredients and candidate recipes from a
/// refrigerator photo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub recipes: Vec<Recipe>,
    #[serde(default)]
    pub shopping_suggestions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub ingredients_used: Vec<String>,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub macros: Map<String, Value>,
    #[serde(default)]
    pub micronutrients: Map<String, Value>,
}

const SYSTEM_MESSAGE: &str = "You are a world-class fridge analyst. Return ONLY valid JSON. \
     No markdown, no explanations, no code blocks.";

const INSTRUCTIONS: &str = r#"
Look at this fridge photo and return ONLY valid JSON with this exact structure:

{
  "ingredients": [
    {"name": "eggs", "amount": "dozen"},
    {"name": "milk", "amount": "1.5L"},
    {"name": "chicken thighs", "amount": "1kg"},
    {"name": "greek yogurt", "amount": "500g"},
    {"name": "broccoli", "amount": "3 heads"},
    {"name": "tomatoes", "amount": "6"},
    {"name": "cheese", "amount": "300g"},
    {"name": "bell peppers", "amount": "4"}
  ],
  "recipes": [
    {
      "name": "Creamy Chicken Pasta",
      "ingredients_used": ["chicken thighs 600g", "milk 400ml", "cheese 150g", "tomatoes 4"],
      "instructions": "1. Cook chicken. 2. Make creamy sauce with milk and cheese. 3. Add tomatoes.",
      "macros": {"calories": 720, "protein": 68, "carbs": 48, "fat": 32},
      "micronutrients": {"vitamin_C_mg": 85, "iron_mg": 5.2, "calcium_mg": 620}
    },
    {
      "name": "Broccoli & Cheese Frittata",
      "ingredients_used": ["eggs 8", "broccoli 2 heads", "cheese 150g", "bell peppers 2"],
      "instructions": "1. Whisk eggs. 2. Add chopped veggies and cheese. 3. Bake 20 min.",
      "macros": {"calories": 580, "protein": 48, "carbs": 22, "fat": 38},
      "micronutrients": {"vitamin_C_mg": 180, "iron_mg": 6.1, "calcium_mg": 720}
    }
  ],
  "shopping_suggestions": ["pasta", "olive oil", "garlic", "onions", "herbs"]
}

RULES:
- List EVERY visible food item with realistic quantity
- Create 2-3 realistic recipes using only what you see
- NEVER return empty arrays unless the fridge is truly empty
- Only valid JSON, nothing else
"#;

fn defaults() -> Vec<(&'static str, Value)> {
    vec![
        ("ingredients", json!([])),
        ("recipes", json!([])),
        ("shopping_suggestions", json!([])),
    ]
}

pub async fn analyze(
    provider: &dyn VisionProvider,
    image_bytes: &[u8],
) -> Result<AnalysisResult, VisionError> {
    request_structured(provider, SYSTEM_MESSAGE, INSTRUCTIONS, image_bytes, &defaults()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vision::test_support::ScriptedProvider;

    #[tokio::test]
    async fn missing_fields_are_backfilled() {
        let provider = ScriptedProvider::new(r#"{"ingredients": [{"name": "milk", "amount": "1L"}]}"#);
        let result = analyze(&provider, b"not-really-a-jpeg").await.unwrap();

        assert_eq!(result.ingredients.len(), 1);
        assert!(result.recipes.is_empty());
        assert!(result.shopping_suggestions.is_empty());
    }

    #[tokio::test]
    async fn fenced_reply_parses_like_unfenced() {
        let body = r#"{"ingredients": [], "recipes": [], "shopping_suggestions": ["pasta"]}"#;
        let plain = analyze(&ScriptedProvider::new(body), b"img").await.unwrap();
        let fenced = analyze(
            &ScriptedProvider::new(format!("```json\n{body}\n```")),
            b"img",
        )
        .await
        .unwrap();

        assert_eq!(plain.shopping_suggestions, fenced.shopping_suggestions);
    }

    #[tokio::test]
    async fn prose_reply_is_a_detectable_failure() {
        let provider = ScriptedProvider::new("The fridge looks empty to me.");
        match analyze(&provider, b"img").await {
            Err(VisionError::Malformed(failure)) => {
                assert_eq!(failure.raw, "The fridge looks empty to me.");
            }
            other => panic!("expected a malformed-reply failure, got {other:?}"),
        }
    }
}
