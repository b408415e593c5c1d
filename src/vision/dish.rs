use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::prices::ShoppingList;
use crate::providers::traits::VisionProvider;
use crate::vision::{request_structured, translate, Ingredient, VisionError};

/// Structured extraction of a recognized cooked dish, its recipe, and the
/// ingredient list, from a photo of finished food. The shopping list starts
/// as a placeholder and is filled in by the price aggregator afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DishAnalysisResult {
    #[serde(default)]
    pub recognized_dish: String,
    #[serde(default)]
    pub certainty_percent: u32,
    #[serde(default)]
    pub serves: u32,
    #[serde(default)]
    pub prep_time_min: u32,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default = "ShoppingList::pending")]
    pub shopping_list: ShoppingList,
}

const SYSTEM_MESSAGE: &str = "You are a world-class Slovak chef. Analyze the finished dish in the \
     photo and return ONLY valid JSON using this exact structure. Use Slovak names for \
     ingredients (e.g. 'zemiaky', 'bryndza') so we can match prices in Slovak shops.";

const INSTRUCTIONS: &str = r#"
Analyze this photo of a finished Slovak or international dish and return ONLY valid JSON with this exact structure:

{
  "recognized_dish": "Bryndzové halušky",
  "certainty_percent": 98,
  "serves": 4,
  "prep_time_min": 45,
  "instructions": "1. Peel and grate potatoes... (full recipe in English)",
  "ingredients": [
    {"name": "zemiaky", "amount": "1 kg"},
    {"name": "bryndza", "amount": "300 g"},
    {"name": "slanina", "amount": "150 g"}
  ]
}

Use only Slovak ingredient names in the list (e.g. 'zemiaky', not 'potatoes'). Be very accurate.
"#;

fn defaults() -> Vec<(&'static str, Value)> {
    vec![
        ("recognized_dish", json!("")),
        ("certainty_percent", json!(0)),
        ("serves", json!(0)),
        ("prep_time_min", json!(0)),
        ("instructions", json!("")),
        ("ingredients", json!([])),
        (
            "shopping_list",
            json!({
                "items": [],
                "estimated_total": 0,
                "currency": "€",
                "note": "Fetching real-time prices..."
            }),
        ),
    ]
}

/// Analyze a dish photo. Ingredient names come back in Slovak and are mapped
/// to English here, before anyone searches a storefront for them.
pub async fn analyze(
    provider: &dyn VisionProvider,
    image_bytes: &[u8],
) -> Result<DishAnalysisResult, VisionError> {
    let mut dish: DishAnalysisResult =
        request_structured(provider, SYSTEM_MESSAGE, INSTRUCTIONS, image_bytes, &defaults()).await?;

    for ingredient in &mut dish.ingredients {
        ingredient.name = translate::to_english(&ingredient.name);
    }

    Ok(dish)
}
