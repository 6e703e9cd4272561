//! Error types for the burnout tracker client.

/// Message shown when the Assessment API cannot be reached at all.
pub const UNREACHABLE_MESSAGE: &str =
    "Cannot connect to backend server. Check API_BASE_URL and deployment status.";

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures talking to the Assessment API.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// The service answered with an error status.
    #[error("Service error ({status}): {}", .detail.as_deref().unwrap_or("no detail"))]
    Service { status: u16, detail: Option<String> },

    /// No response was received.
    #[error("{}", UNREACHABLE_MESSAGE)]
    Unreachable { reason: String },

    /// The service answered 404.
    #[error("Not found: {}", .detail.as_deref().unwrap_or("resource"))]
    NotFound { detail: Option<String> },

    /// The response body did not match the expected shape.
    #[error("Invalid response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Text to show the user. Service details are surfaced verbatim; anything
    /// without a usable detail falls back to `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Service {
                detail: Some(detail),
                ..
            }
            | Self::NotFound {
                detail: Some(detail),
            } => detail.clone(),
            Self::Unreachable { .. } => UNREACHABLE_MESSAGE.to_string(),
            Self::Service { detail: None, .. } | Self::NotFound { detail: None } | Self::Decode(_) => {
                fallback.to_string()
            }
        }
    }
}

/// Durable identity storage errors.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors returned by screen actions.
#[derive(Debug, thiserror::Error)]
pub enum ScreenError {
    /// The same action is already in flight on this screen.
    #[error("{action} is already in progress")]
    Busy { action: &'static str },

    /// The screen is not in a state that accepts this action.
    #[error("Cannot {action} while {state}")]
    InvalidState { action: &'static str, state: String },

    /// A local precondition failed; nothing was sent.
    #[error("{0}")]
    Precondition(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Identity(#[from] IdentityError),
}

/// Result type alias for the client.
pub type Result<T> = std::result::Result<T, Error>;
