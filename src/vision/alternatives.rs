use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::providers::traits::VisionProvider;
use crate::vision::{request_structured, VisionError};

/// Health assessment of a single photographed product, with suggested swaps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlternativeReport {
    #[serde(default = "default_product")]
    pub detected_product: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default = "default_assessment")]
    pub assessment: String,
    #[serde(default = "default_message")]
    pub message: String,
    #[serde(default)]
    pub why: String,
    #[serde(default)]
    pub alternatives: Vec<Alternative>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alternative {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub why_better_or_similar: String,
    #[serde(default)]
    pub price_per_100ml_eur: f64,
    #[serde(default)]
    pub best_for: String,
}

fn default_product() -> String {
    "Unknown product".to_string()
}

fn default_category() -> String {
    "unknown".to_string()
}

fn default_assessment() -> String {
    "moderate".to_string()
}

fn default_message() -> String {
    "Product analyzed.".to_string()
}

const SYSTEM_MESSAGE: &str = "You are a professional nutritionist. Always respond with ONLY \
     valid JSON. No markdown, no text outside JSON.";

const INSTRUCTIONS: &str = r#"
Analyze the food product in the photo.

Return ONLY valid JSON with this exact structure:

{
  "detected_product": "Extra Virgin Olive Oil",
  "category": "cooking oil",
  "assessment": "great" | "good" | "moderate" | "suboptimal",
  "message": "Short friendly message to user (1 sentence)",
  "why": "Explanation why this product has this rating (2-3 sentences)",
  "alternatives": [
    {
      "name": "Avocado Oil",
      "why_better_or_similar": "Has even higher smoke point, rich in vitamin E",
      "price_per_100ml_eur": 3.2,
      "best_for": "high-heat cooking, frying"
    }
  ]
}

Rules:
- If the product is already one of the healthiest (olive oil EV, avocado oil, nuts, fatty fish, eggs, berries, leafy greens, Greek yogurt, dark chocolate 85%+, etc.) -> set "assessment": "great"
- If it's decent but can be improved (e.g. refined olive oil, milk chocolate, white rice) -> "good" or "moderate"
- If clearly unhealthy (sunflower oil, margarine, sugary cereal, soda) -> "suboptimal"
- Always suggest 3-6 alternatives, even for "great" products (variety is good!)
- For "great" products, use phrase like "Great choice! Here are some excellent alternatives..."
- Never use health scores like +7, +10
- Prices = realistic European averages 2025
- Only valid JSON, nothing else!
"#;

fn defaults() -> Vec<(&'static str, Value)> {
    vec![
        ("detected_product", json!("Unknown product")),
        ("category", json!("unknown")),
        ("assessment", json!("moderate")),
        ("message", json!("Product analyzed.")),
        ("why", json!("")),
        ("alternatives", json!([])),
    ]
}

pub async fn analyze(
    provider: &dyn VisionProvider,
    image_bytes: &[u8],
) -> Result<AlternativeReport, VisionError> {
    request_structured(provider, SYSTEM_MESSAGE, INSTRUCTIONS, image_bytes, &defaults()).await
}
