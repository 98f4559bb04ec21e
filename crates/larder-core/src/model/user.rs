use crate::error::{ErrorCode, LarderError};
use serde::Serialize;

/// An account row. Owns zero or more items; deleting a user cascades to them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub user_id: i64,
    pub login_id: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Expiry notifications enabled (on by default).
    pub notification: bool,
    /// At most one registered push-delivery token.
    pub push_token: Option<String>,
}

impl User {
    /// The token to dispatch to, present only when notifications are on.
    #[must_use]
    pub fn dispatchable_token(&self) -> Option<&str> {
        if self.notification {
            self.push_token.as_deref()
        } else {
            None
        }
    }
}

/// Registration input, validated before it reaches the store.
#[derive(Debug, Clone)]
pub struct Registration {
    pub login_id: String,
    pub username: String,
    pub password: String,
    pub password_confirm: String,
}

impl Registration {
    /// Reject empty/whitespace-only fields and mismatched confirmation.
    pub fn validate(&self) -> Result<(), LarderError> {
        for (field, value) in [
            ("login_id", &self.login_id),
            ("username", &self.username),
            ("password", &self.password),
            ("password_confirm", &self.password_confirm),
        ] {
            if value.trim().is_empty() {
                return Err(LarderError::with_detail(ErrorCode::EmptyField, field));
            }
        }
        if self.password != self.password_confirm {
            return Err(LarderError::new(ErrorCode::PasswordMismatch));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Registration;
    use crate::error::ErrorCode;

    fn registration() -> Registration {
        Registration {
            login_id: "alice".to_string(),
            username: "Alice".to_string(),
            password: "alice123".to_string(),
            password_confirm: "alice123".to_string(),
        }
    }

    #[test]
    fn valid_registration_passes() {
        assert!(registration().validate().is_ok());
    }

    #[test]
    fn whitespace_only_field_is_rejected() {
        let mut reg = registration();
        reg.username = "   ".to_string();
        let err = reg.validate().expect_err("must reject");
        assert_eq!(err.code(), ErrorCode::EmptyField);
        assert_eq!(err.detail(), Some("username"));
    }

    #[test]
    fn mismatched_confirmation_is_rejected() {
        let mut reg = registration();
        reg.password_confirm = "alice124".to_string();
        let err = reg.validate().expect_err("must reject");
        assert_eq!(err.code(), ErrorCode::PasswordMismatch);
    }

    #[test]
    fn dispatchable_token_respects_preference() {
        let mut user = super::User {
            user_id: 1,
            login_id: "alice".to_string(),
            username: "Alice".to_string(),
            password_hash: String::new(),
            notification: true,
            push_token: Some("tok".to_string()),
        };
        assert_eq!(user.dispatchable_token(), Some("tok"));

        user.notification = false;
        assert_eq!(user.dispatchable_token(), None);

        user.notification = true;
        user.push_token = None;
        assert_eq!(user.dispatchable_token(), None);
    }
}
