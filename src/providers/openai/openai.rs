use async_trait::async_trait;
use anyhow::{Result, anyhow};
use crate::providers::traits::VisionProvider;
use crate::vision::EncodedImage;
use reqwest::Client;
use serde_json::{json, Value};

#[derive(Clone)]
pub struct OpenAiVisionProvider {
    api_key: String,
    client: Client,
    model: String,
    completions_url: String,
}

impl OpenAiVisionProvider {
    pub fn new(api_key: String, model: String, completions_url: String) -> Self {
        Self {
            api_key,
            client: Client::new(),
            model,
            completions_url,
        }
    }
}

#[async_trait]
impl VisionProvider for OpenAiVisionProvider {
    async fn complete_with_image(
        &self,
        system_message: &str,
        instructions: &str,
        image: &EncodedImage,
    ) -> Result<String> {
        let response = self
            .client
            .post(&self.completions_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&json!({
                "model": self.model,
                "temperature": 0.0,
                "max_tokens": 2000,
                "messages": [
                    {
                        "role": "system",
                        "content": system_message
                    },
                    {
                        "role": "user",
                        "content": [
                            {
                                "type": "text",
                                "text": instructions
                            },
                            {
                                "type": "image_url",
                                "image_url": { "url": image.data_url() }
                            }
                        ]
                    }
                ]
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            return Err(anyhow!("API request failed: Status {}, Body: {}", status, error_text));
        }

        let response_json: Value = response.json().await?;

        // Check for API-level errors
        if let Some(error) = response_json.get("error") {
            return Err(anyhow!("API returned error: {}", error));
        }

        response_json
            .get("choices")
            .and_then(|choices| choices.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(|content| content.as_str())
            .map(|s| s.trim().to_string())
            .ok_or_else(|| {
                let debug_json = serde_json::to_string_pretty(&response_json).unwrap_or_default();
                anyhow!("Invalid response format. Response JSON: {}", debug_json)
            })
    }

    async fn get_model_info(&self) -> Result<String> {
        Ok(self.model.clone())
    }
}
