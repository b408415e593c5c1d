use anyhow::Result;
use async_trait::async_trait;

use crate::vision::EncodedImage;

#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Send one image plus instruction text to the model and return the raw
    /// text reply. Transport and API-level failures are errors; whatever text
    /// comes back is returned untouched for the caller to parse.
    async fn complete_with_image(
        &self,
        system_message: &str,
        instructions: &str,
        image: &EncodedImage,
    ) -> Result<String>;

    async fn get_model_info(&self) -> Result<String>;
}
