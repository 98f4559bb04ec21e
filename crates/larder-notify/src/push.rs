//! Push-delivery transport seam.
//!
//! Delivery is best-effort: the scan never retries within a run and only an
//! explicit invalid-token outcome mutates state (it clears the stored
//! token). Everything else is a transient failure to log and move past.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

/// One notification payload: title/body for display plus a structured data
/// map for the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushNote {
    pub title: String,
    pub body: String,
    pub data: BTreeMap<String, String>,
}

/// Outcome of one dispatch attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Accepted by the transport.
    Delivered,
    /// The token is dead; the owner should be scrubbed until they
    /// re-register.
    InvalidToken,
    /// Anything else (network, 5xx, timeout): skip now, retry on a later
    /// run.
    Transient(String),
}

/// Sends one note to one device token.
pub trait PushTransport {
    fn send(&self, token: &str, note: &PushNote) -> Dispatch;
}

/// HTTP relay transport: POSTs the note as JSON to a configured endpoint.
///
/// `404`/`410`, or an error body that names an unregistered token, mean the
/// token is gone for good; other failures are transient.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    endpoint: String,
    auth_token: Option<String>,
}

impl HttpGateway {
    #[must_use]
    pub fn new(endpoint: impl Into<String>, auth_token: Option<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            auth_token,
        }
    }
}

fn body_names_dead_token(body: &str) -> bool {
    let lowered = body.to_ascii_lowercase();
    lowered.contains("unregistered") || lowered.contains("invalid token")
}

impl PushTransport for HttpGateway {
    fn send(&self, token: &str, note: &PushNote) -> Dispatch {
        let mut request = ureq::post(&self.endpoint)
            .set("User-Agent", "larder-cli")
            .set("Content-Type", "application/json");
        if let Some(auth) = &self.auth_token {
            request = request.set("Authorization", &format!("Bearer {auth}"));
        }

        let payload = serde_json::json!({
            "token": token,
            "title": note.title,
            "body": note.body,
            "data": note.data,
        });

        match request.send_json(payload) {
            Ok(_) => Dispatch::Delivered,
            Err(ureq::Error::Status(code, response)) => {
                let body = response.into_string().unwrap_or_default();
                if code == 404 || code == 410 || body_names_dead_token(&body) {
                    Dispatch::InvalidToken
                } else {
                    warn!(code, "push relay rejected dispatch");
                    Dispatch::Transient(format!("relay returned {code}: {body}"))
                }
            }
            Err(err) => Dispatch::Transient(format!("push transport error: {err}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Dispatch, PushNote, body_names_dead_token};
    use std::collections::BTreeMap;

    #[test]
    fn dead_token_bodies_are_recognized() {
        assert!(body_names_dead_token(r#"{"error":"Unregistered"}"#));
        assert!(body_names_dead_token("Invalid token supplied"));
        assert!(!body_names_dead_token("internal server error"));
        assert!(!body_names_dead_token(""));
    }

    #[test]
    fn note_serializes_with_stable_field_names() {
        let note = PushNote {
            title: "Expiry reminder".to_string(),
            body: "사과 expires soon".to_string(),
            data: BTreeMap::from([("item_id".to_string(), "7".to_string())]),
        };
        let json = serde_json::to_value(&note).expect("serialize");
        assert_eq!(json["title"], "Expiry reminder");
        assert_eq!(json["data"]["item_id"], "7");
    }

    #[test]
    fn transient_outcome_carries_detail() {
        let outcome = Dispatch::Transient("relay returned 503".to_string());
        assert!(matches!(outcome, Dispatch::Transient(ref msg) if msg.contains("503")));
    }
}
