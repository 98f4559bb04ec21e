//! Recipe suggestions from current stock.

use crate::openai::ChatClient;
use anyhow::{Context, Result};
use larder_core::config::OpenAiConfig;
use larder_core::db::items;
use larder_core::error::{ErrorCode, LarderError};
use rusqlite::Connection;

/// Reply used when the user's inventory is empty; no collaborator call is
/// made in that case.
pub const EMPTY_STOCK_REPLY: &str =
    "There is nothing in the larder yet. Add some ingredients first.";

/// Produces a free-text recipe suggestion for a set of ingredients.
pub trait RecipeAdvisor {
    /// # Errors
    ///
    /// Returns a recipe error when the collaborator call fails.
    fn chat(&self, ingredients: &[String], request: &str) -> Result<String>;
}

/// Suggest recipes from the user's current items.
///
/// # Errors
///
/// Propagates store and collaborator failures; an empty inventory is not an
/// error and returns [`EMPTY_STOCK_REPLY`].
pub fn recommend_from_stock(
    conn: &Connection,
    user_id: i64,
    request: &str,
    advisor: &dyn RecipeAdvisor,
) -> Result<String> {
    let stock = items::list_by_user(conn, user_id)?;
    if stock.is_empty() {
        return Ok(EMPTY_STOCK_REPLY.to_string());
    }

    let ingredients: Vec<String> = stock.into_iter().map(|item| item.item_name).collect();
    advisor
        .chat(&ingredients, request)
        .context(LarderError::new(ErrorCode::RecipeFailed))
}

const RECIPE_PROMPT: &str = "\
You are a cooking expert. The user's fridge contains these ingredients:\n\n\
{ingredients}\n\nUser request: {request}\n\nRecommend three dishes that can \
be made from these ingredients in line with the request, each with a recipe \
and a short description.";

/// Chat-model advisor over the chat-completions API.
#[derive(Debug, Clone)]
pub struct OpenAiAdvisor {
    client: ChatClient,
    model: String,
}

impl OpenAiAdvisor {
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

impl RecipeAdvisor for OpenAiAdvisor {
    fn chat(&self, ingredients: &[String], request: &str) -> Result<String> {
        let prompt = RECIPE_PROMPT
            .replace("{ingredients}", &ingredients.join(", "))
            .replace("{request}", request);
        let messages = serde_json::json!([
            {"role": "user", "content": prompt},
        ]);
        self.client.complete(&self.model, 0.3, messages)
    }
}

#[cfg(test)]
mod tests {
    use super::{EMPTY_STOCK_REPLY, RecipeAdvisor, recommend_from_stock};
    use anyhow::Result;
    use larder_core::db::{items, open_memory_store, users};
    use larder_core::expiry::ExpiryParser;
    use larder_core::hash::SaltedSha256;
    use larder_core::model::{ItemDraft, Registration};
    use std::cell::RefCell;

    struct EchoAdvisor {
        seen: RefCell<Vec<String>>,
    }

    impl RecipeAdvisor for EchoAdvisor {
        fn chat(&self, ingredients: &[String], request: &str) -> Result<String> {
            self.seen.borrow_mut().extend(ingredients.iter().cloned());
            Ok(format!("{} dishes for: {request}", ingredients.len()))
        }
    }

    #[test]
    fn empty_stock_short_circuits() {
        let mut conn = open_memory_store().expect("open store");
        let user = users::register(
            &mut conn,
            &Registration {
                login_id: "alice".to_string(),
                username: "Alice".to_string(),
                password: "alice123".to_string(),
                password_confirm: "alice123".to_string(),
            },
            &SaltedSha256,
        )
        .expect("register");

        let advisor = EchoAdvisor {
            seen: RefCell::new(Vec::new()),
        };
        let reply = recommend_from_stock(&conn, user.user_id, "간단한 요리", &advisor)
            .expect("recommend");
        assert_eq!(reply, EMPTY_STOCK_REPLY);
        assert!(advisor.seen.borrow().is_empty(), "no collaborator call");
    }

    #[test]
    fn stocked_inventory_reaches_the_advisor() {
        let mut conn = open_memory_store().expect("open store");
        let user = users::register(
            &mut conn,
            &Registration {
                login_id: "alice".to_string(),
                username: "Alice".to_string(),
                password: "alice123".to_string(),
                password_confirm: "alice123".to_string(),
            },
            &SaltedSha256,
        )
        .expect("register");
        items::upsert_batch(
            &mut conn,
            user.user_id,
            &[
                ItemDraft::new("사과", "식물성", "과일류", "30일"),
                ItemDraft::new("우유", "동물성", "유제품", "14일"),
            ],
            &ExpiryParser::default(),
        )
        .expect("seed");

        let advisor = EchoAdvisor {
            seen: RefCell::new(Vec::new()),
        };
        let reply = recommend_from_stock(&conn, user.user_id, "맵지 않은 요리", &advisor)
            .expect("recommend");
        assert_eq!(reply, "2 dishes for: 맵지 않은 요리");
        let seen = advisor.seen.borrow();
        assert!(seen.contains(&"사과".to_string()));
        assert!(seen.contains(&"우유".to_string()));
    }
}
