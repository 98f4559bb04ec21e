//! Item classification: ingredient names in, taxonomy + shelf-life text out.
//!
//! Replies from the classifier have drifted across model revisions
//! (`item_name` vs `base_name`, `category_major_name` vs `category`,
//! `expiry_text` vs `shelf_life`). The [`normalize`] step coalesces those
//! variants in a fixed priority order so nothing past this module ever sees
//! a variant shape.

use crate::fence::strip_code_fence;
use crate::openai::ChatClient;
use anyhow::{Context, Result};
use larder_core::config::OpenAiConfig;
use larder_core::error::{ErrorCode, LarderError};
use larder_core::model::ItemDraft;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// One classified item descriptor in canonical shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedItem {
    pub item_name: String,
    pub major_name: String,
    pub sub_name: String,
    pub expiry_text: String,
}

impl From<ClassifiedItem> for ItemDraft {
    fn from(classified: ClassifiedItem) -> Self {
        Self::new(
            classified.item_name,
            classified.major_name,
            classified.sub_name,
            classified.expiry_text,
        )
    }
}

/// Maps ingredient names onto the category taxonomy with a shelf-life
/// estimate per item.
pub trait Classifier {
    /// # Errors
    ///
    /// Returns a classification error when the collaborator call or its
    /// reply parsing fails.
    fn classify(&self, names: &[String]) -> Result<Vec<ClassifiedItem>>;
}

/// Coalesce alternate field names into [`ClassifiedItem`]s.
///
/// Priority order per field: `item_name` > `base_name`;
/// `category_major_name` > `category`; `category_sub_name` > empty;
/// `expiry_text` > `shelf_life` > empty. Entries with no resolvable name
/// are dropped with a warning.
#[must_use]
pub fn normalize(raw: &Value) -> Vec<ClassifiedItem> {
    let Some(entries) = raw.as_array() else {
        return Vec::new();
    };

    let field = |entry: &Value, keys: &[&str]| -> Option<String> {
        keys.iter()
            .find_map(|key| entry.get(*key).and_then(Value::as_str))
            .map(str::to_owned)
    };

    entries
        .iter()
        .filter_map(|entry| {
            let Some(item_name) = field(entry, &["item_name", "base_name"]) else {
                warn!(%entry, "dropping classified entry with no item name");
                return None;
            };
            Some(ClassifiedItem {
                item_name,
                major_name: field(entry, &["category_major_name", "category"])
                    .unwrap_or_default(),
                sub_name: field(entry, &["category_sub_name"]).unwrap_or_default(),
                expiry_text: field(entry, &["expiry_text", "shelf_life"]).unwrap_or_default(),
            })
        })
        .collect()
}

const CLASSIFY_PROMPT: &str = "\
You are a grocery and cooking expert. For each ingredient name you receive, \
assign `category_major_name` (one of the five major groups: 식물성, 동물성, \
조미료·양념, 가공·저장식품, 기타) and a matching `category_sub_name` leaf, \
and estimate the typical shelf life as `expiry_text` in the form \"n일\" \
(e.g. one month = \"30일\", one year = \"365일\"). Classify the same \
ingredient identically every time. For foods that do not meaningfully \
expire, set `expiry_text` to \"무기한\". Reply with a JSON array of objects \
{item_name, category_major_name, category_sub_name, expiry_text} and \
nothing else.";

/// Chat-model classifier over the chat-completions API.
#[derive(Debug, Clone)]
pub struct OpenAiClassifier {
    client: ChatClient,
    model: String,
}

impl OpenAiClassifier {
    /// # Errors
    ///
    /// Fails when the API key env var is unset.
    pub fn from_config(config: &OpenAiConfig) -> Result<Self> {
        Ok(Self {
            client: ChatClient::from_config(config)?,
            model: config.model.clone(),
        })
    }
}

impl Classifier for OpenAiClassifier {
    fn classify(&self, names: &[String]) -> Result<Vec<ClassifiedItem>> {
        let messages = serde_json::json!([
            {"role": "system", "content": CLASSIFY_PROMPT},
            {"role": "user", "content": serde_json::to_string(names)
                .context("encode name list")?},
        ]);

        let reply = self
            .client
            .complete(&self.model, 0.0, messages)
            .context(LarderError::new(ErrorCode::ClassifyFailed))?;

        let payload = strip_code_fence(&reply);
        let raw: Value = serde_json::from_str(payload)
            .with_context(|| format!("unparseable classifier reply: {payload}"))
            .context(LarderError::new(ErrorCode::ClassifyFailed))?;

        Ok(normalize(&raw))
    }
}
