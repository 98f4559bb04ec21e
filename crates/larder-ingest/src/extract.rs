//! Receipt OCR: image bytes in, normalized ingredient names out.

use crate::fence::strip_code_fence;
use crate::openai::ChatClient;
use anyhow::{Context, Result};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use larder_core::config::OpenAiConfig;
use larder_core::error::{ErrorCode, LarderError};
use tracing::debug;

/// Extracts ingredient names from a receipt image.
pub trait ReceiptOcr {
    /// `image` is the raw photo/scan; the result is a list of normalized
    /// ingredient names.
    ///
    /// # Errors
    ///
    /// Returns an extraction error when the collaborator call or its reply
    /// parsing fails.
    fn extract(&self, image: &[u8]) -> Result<Vec<String>>;
}

const EXTRACT_PROMPT: &str = "\
You are a grocery and cooking expert. This image is a purchase receipt or \
order list. OCR only the product names that are food ingredients, then \
normalize each to its common ingredient name (keep meaningful qualifiers, \
drop brand names). Reply with a JSON array of strings and nothing else.";

/// Vision-model OCR over the chat-completions API.
#[derive(Debug, Clone)]
pub struct OpenAiVision {
    client: ChatClient,
    model: String,
}

impl OpenAiVision {
    /// # Errors
    ///
    /// Fails when the API key env var is unset.
    pub fn from_config(config: &OpenAiConfig) -> Result<Self> {
        Ok(Self {
            client: ChatClient::from_config(config)?,
            model: config.vision_model.clone(),
        })
    }
}

impl ReceiptOcr for OpenAiVision {
    fn extract(&self, image: &[u8]) -> Result<Vec<String>> {
        let encoded = STANDARD.encode(image);
        let messages = serde_json::json!([
            {"role": "system", "content": "You are a helpful assistant."},
            {"role": "user", "content": [
                {"type": "text", "text": EXTRACT_PROMPT},
                {"type": "image_url",
                 "image_url": {"url": format!("data:image/jpeg;base64,{encoded}")}},
            ]},
        ]);

        let reply = self
            .client
            .complete(&self.model, 0.0, messages)
            .context(LarderError::new(ErrorCode::ExtractFailed))?;

        let payload = strip_code_fence(&reply);
        let names: Vec<String> = serde_json::from_str(payload)
            .with_context(|| format!("unparseable OCR reply: {payload}"))
            .context(LarderError::new(ErrorCode::ExtractFailed))?;

        debug!(count = names.len(), "extracted ingredient names");
        Ok(names)
    }
}
