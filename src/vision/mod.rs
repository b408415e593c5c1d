use base64::{engine::general_purpose, Engine as _};
use lazy_static::lazy_static;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::providers::traits::VisionProvider;

pub mod alternatives;
pub mod dish;
pub mod fridge;
pub mod translate;

/// One recognized food item. Names are free text, amounts are whatever
/// human-readable quantity the model produced ("1.5L", "3 heads").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ingredient {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_amount")]
    pub amount: String,
}

fn default_amount() -> String {
    "1 portion".to_string()
}

/// An uploaded image, base64-encoded and ready to ride in a data URL.
pub struct EncodedImage {
    mime: &'static str,
    data: String,
}

impl EncodedImage {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mime = match image::guess_format(bytes) {
            Ok(image::ImageFormat::Png) => "image/png",
            Ok(image::ImageFormat::WebP) => "image/webp",
            Ok(image::ImageFormat::Gif) => "image/gif",
            _ => "image/jpeg",
        };
        Self {
            mime,
            data: general_purpose::STANDARD.encode(bytes),
        }
    }

    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, self.data)
    }
}

/// The model's reply could not be read as the structured result. Carries the
/// raw text so the caller can surface it verbatim; nothing downstream may
/// re-interpret `raw` as a result.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisFailure {
    pub error: String,
    pub raw: String,
    pub parse_error: String,
}

#[derive(Debug, Error)]
pub enum VisionError {
    #[error("model call failed: {0}")]
    Upstream(#[from] anyhow::Error),
    #[error("model reply was not valid JSON")]
    Malformed(AnalysisFailure),
}

lazy_static! {
    static ref FENCE_OPEN: Regex = Regex::new(r"^```(?:json)?\s*").unwrap();
    static ref FENCE_CLOSE: Regex = Regex::new(r"\s*```$").unwrap();
}

/// Models are told to answer with bare JSON but routinely wrap it in a
/// markdown code block anyway.
pub fn strip_code_fences(raw: &str) -> String {
    let trimmed = raw.trim();
    let opened = FENCE_OPEN.replace(trimmed, "");
    let closed = FENCE_CLOSE.replace(&opened, "");
    closed.trim().to_string()
}

pub(crate) fn parse_model_reply(raw: &str) -> Result<Map<String, Value>, AnalysisFailure> {
    let cleaned = strip_code_fences(raw);
    match serde_json::from_str::<Value>(&cleaned) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(other) => Err(AnalysisFailure {
            error: "Invalid JSON".to_string(),
            raw: cleaned,
            parse_error: format!("expected a JSON object, got {}", value_kind(&other)),
        }),
        Err(e) => Err(AnalysisFailure {
            error: "Invalid JSON".to_string(),
            raw: cleaned,
            parse_error: e.to_string(),
        }),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Insert the documented default for every expected top-level field the model
/// left out, so callers never have to branch on key absence.
pub(crate) fn backfill_defaults(fields: &mut Map<String, Value>, defaults: &[(&str, Value)]) {
    for (key, default) in defaults {
        fields
            .entry((*key).to_string())
            .or_insert_with(|| default.clone());
    }
}

/// Shared request path for every analysis kind: encode the image, call the
/// model, strip fences, parse, back-fill defaults, deserialize.
pub(crate) async fn request_structured<T: DeserializeOwned>(
    provider: &dyn VisionProvider,
    system_message: &str,
    instructions: &str,
    image_bytes: &[u8],
    defaults: &[(&str, Value)],
) -> Result<T, VisionError> {
    let image = EncodedImage::from_bytes(image_bytes);
    let raw = provider
        .complete_with_image(system_message, instructions, &image)
        .await?;

    let mut fields = parse_model_reply(&raw).map_err(VisionError::Malformed)?;
    backfill_defaults(&mut fields, defaults);

    let rendered = Value::Object(fields);
    serde_json::from_value(rendered.clone()).map_err(|e| {
        VisionError::Malformed(AnalysisFailure {
            error: "Invalid JSON".to_string(),
            raw: rendered.to_string(),
            parse_error: e.to_string(),
        })
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use anyhow::Result;
    use async_trait::async_trait;

    use super::EncodedImage;
    use crate::providers::traits::VisionProvider;

    /// A provider that replays a canned reply, for exercising the parse and
    /// normalize path without the network.
    pub struct ScriptedProvider {
        reply: String,
    }

    impl ScriptedProvider {
        pub fn new(reply: impl Into<String>) -> Self {
            Self {
                reply: reply.into(),
            }
        }
    }

    #[async_trait]
    impl VisionProvider for ScriptedProvider {
        async fn complete_with_image(
            &self,
            _system_message: &str,
            _instructions: &str,
            _image: &EncodedImage,
        ) -> Result<String> {
            Ok(self.reply.clone())
        }

        async fn get_model_info(&self) -> Result<String> {
            Ok("scripted".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strips_json_code_fences() {
        let fenced = "```json\n{\"ingredients\": []}\n```";
        assert_eq!(strip_code_fences(fenced), "{\"ingredients\": []}");
    }

    #[test]
    fn strips_bare_code_fences() {
        let fenced = "```\n{\"a\": 1}\n```";
        assert_eq!(strip_code_fences(fenced), "{\"a\": 1}");
    }

    #[test]
    fn leaves_plain_replies_alone() {
        assert_eq!(strip_code_fences("  {\"a\": 1}  "), "{\"a\": 1}");
    }

    #[test]
    fn fenced_and_unfenced_parse_identically() {
        let plain = parse_model_reply("{\"recipes\": []}").unwrap();
        let fenced = parse_model_reply("```json\n{\"recipes\": []}\n```").unwrap();
        assert_eq!(plain, fenced);
    }

    #[test]
    fn parse_failure_carries_raw_text() {
        let failure = parse_model_reply("I could not find any food in this photo.").unwrap_err();
        assert_eq!(failure.error, "Invalid JSON");
        assert_eq!(failure.raw, "I could not find any food in this photo.");
        assert!(!failure.parse_error.is_empty());
    }

    #[test]
    fn non_object_reply_is_a_failure() {
        let failure = parse_model_reply("[1, 2, 3]").unwrap_err();
        assert!(failure.parse_error.contains("an array"));
    }

    #[test]
    fn backfill_only_touches_missing_keys() {
        let mut fields = parse_model_reply("{\"ingredients\": [{\"name\": \"milk\"}]}").unwrap();
        backfill_defaults(
            &mut fields,
            &[("ingredients", json!([])), ("alternatives", json!([]))],
        );
        assert_eq!(fields["alternatives"], json!([]));
        assert_eq!(fields["ingredients"], json!([{"name": "milk"}]));
    }

    #[test]
    fn ingredient_amount_defaults_to_one_portion() {
        let ing: Ingredient = serde_json::from_value(json!({"name": "bryndza"})).unwrap();
        assert_eq!(ing.amount, "1 portion");
    }
}
