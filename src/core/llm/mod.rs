pub mod providers;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub enum ProviderType {
    Google,
}

#[derive(Debug, Clone)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
}

/// The two generative capabilities the drafting pipeline depends on. Kept
/// behind a trait so the orchestrator can be exercised against a scripted
/// in-process implementation.
#[async_trait]
pub trait GenerativeProvider: Send + Sync {
    fn provider_type(&self) -> ProviderType;

    // Models the provider is known to serve, for the `models` command
    async fn fetch_models(&self) -> Result<Vec<ModelInfo>>;

    // One text call constrained to JSON output conforming to `schema`.
    // Returns the raw response text; parsing is the caller's concern.
    async fn generate_structured(&self, model_id: &str, prompt: &str, schema: &Value)
        -> Result<String>;

    // One image call. Ok(None) when the response carried no inline image
    // payload; the returned string is the provider's base64 image data.
    async fn generate_image(
        &self,
        model_id: &str,
        prompt: &str,
        aspect_ratio: &str,
    ) -> Result<Option<String>>;
}

pub struct LlmManager {
    provider: Box<dyn GenerativeProvider>,
    text_model: String,
    image_model: String,
}

impl LlmManager {
    pub fn new(provider: Box<dyn GenerativeProvider>, text_model: String, image_model: String) -> Self {
        info!(
            "Using {:?} provider (text: {}, image: {})",
            provider.provider_type(),
            text_model,
            image_model
        );
        Self {
            provider,
            text_model,
            image_model,
        }
    }

    pub async fn fetch_models(&self) -> Result<Vec<ModelInfo>> {
        self.provider.fetch_models().await
    }

    pub async fn generate_structured(&self, prompt: &str, schema: &Value) -> Result<String> {
        self.provider
            .generate_structured(&self.text_model, prompt, schema)
            .await
    }

    pub async fn generate_image(&self, prompt: &str, aspect_ratio: &str) -> Result<Option<String>> {
        self.provider
            .generate_image(&self.image_model, prompt, aspect_ratio)
            .await
    }
}
