use std::fmt;

/// Machine-readable error codes for client-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    StoreNotInitialized,
    ConfigParseError,
    MissingApiKey,
    PushEndpointUnset,
    EmptyField,
    PasswordMismatch,
    EmptyItemName,
    EmptyCategoryName,
    DuplicateLoginId,
    DuplicateUsername,
    UserNotFound,
    NothingToDelete,
    WrongPassword,
    NotificationsDisabled,
    ExtractFailed,
    ClassifyFailed,
    RecipeFailed,
    PushDispatchFailed,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::StoreNotInitialized => "E1001",
            Self::ConfigParseError => "E1002",
            Self::MissingApiKey => "E1003",
            Self::PushEndpointUnset => "E1004",
            Self::EmptyField => "E2001",
            Self::PasswordMismatch => "E2002",
            Self::EmptyItemName => "E2003",
            Self::EmptyCategoryName => "E2004",
            Self::DuplicateLoginId => "E2101",
            Self::DuplicateUsername => "E2102",
            Self::UserNotFound => "E2201",
            Self::NothingToDelete => "E2202",
            Self::WrongPassword => "E2301",
            Self::NotificationsDisabled => "E2302",
            Self::ExtractFailed => "E4001",
            Self::ClassifyFailed => "E4002",
            Self::RecipeFailed => "E4003",
            Self::PushDispatchFailed => "E4004",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::StoreNotInitialized => "Inventory store not initialized",
            Self::ConfigParseError => "Config file parse error",
            Self::MissingApiKey => "Model API key not available",
            Self::PushEndpointUnset => "Push relay endpoint not configured",
            Self::EmptyField => "Required field is empty",
            Self::PasswordMismatch => "Password confirmation does not match",
            Self::EmptyItemName => "Item name is empty",
            Self::EmptyCategoryName => "Category name is empty",
            Self::DuplicateLoginId => "Login id already taken",
            Self::DuplicateUsername => "Username already taken",
            Self::UserNotFound => "User not found",
            Self::NothingToDelete => "No matching items to delete",
            Self::WrongPassword => "Password verification failed",
            Self::NotificationsDisabled => "Notifications are disabled for this user",
            Self::ExtractFailed => "Receipt text extraction failed",
            Self::ClassifyFailed => "Item classification failed",
            Self::RecipeFailed => "Recipe suggestion failed",
            Self::PushDispatchFailed => "Push dispatch failed",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::StoreNotInitialized => Some("Run `ldr init` to create the inventory store."),
            Self::ConfigParseError => Some("Fix syntax in the larder config.toml and retry."),
            Self::MissingApiKey => {
                Some("Export the API key in the env var named by [openai].api_key_env.")
            }
            Self::PushEndpointUnset => Some("Set [push].endpoint in the larder config."),
            Self::EmptyField | Self::EmptyItemName | Self::EmptyCategoryName => {
                Some("Provide a non-empty value (whitespace-only input is rejected).")
            }
            Self::PasswordMismatch => Some("Re-enter the same password in both fields."),
            Self::DuplicateLoginId | Self::DuplicateUsername => Some("Pick a different one."),
            Self::UserNotFound | Self::NothingToDelete => None,
            Self::WrongPassword => Some("Check the account password and retry."),
            Self::NotificationsDisabled => {
                Some("Enable notifications before registering a device token.")
            }
            Self::ExtractFailed | Self::ClassifyFailed | Self::RecipeFailed => {
                Some("Check network reachability and the model API key, then retry.")
            }
            Self::PushDispatchFailed => Some("Check the push relay endpoint and credentials."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A domain failure pairing a stable [`ErrorCode`] with optional detail.
///
/// Core functions return `anyhow::Result`; callers downcast to this type to
/// recover the code and hint for rendering.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", format_error(.code, .detail))]
pub struct LarderError {
    code: ErrorCode,
    detail: Option<String>,
}

fn format_error(code: &ErrorCode, detail: &Option<String>) -> String {
    match detail {
        Some(detail) => format!("{}: {detail}", code.message()),
        None => code.message().to_string(),
    }
}

impl LarderError {
    #[must_use]
    pub const fn new(code: ErrorCode) -> Self {
        Self { code, detail: None }
    }

    #[must_use]
    pub fn with_detail(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self {
            code,
            detail: Some(detail.into()),
        }
    }

    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }
}
