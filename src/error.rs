use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Failure of one gateway call. Every variant carries the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

impl ApiError {
    /// Classify a non-success response. `detail` is the service's
    /// `{"detail": "..."}` string when it sent one.
    pub fn from_status(status: StatusCode, detail: Option<String>, fallback: &str) -> Self {
        let message = detail
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string());

        match status {
            StatusCode::NOT_FOUND => ApiError::NotFound(message),
            StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
                ApiError::Validation(message)
            }
            _ => ApiError::Transport(format!("{} ({})", message, status)),
        }
    }

    pub fn user_message(&self) -> &str {
        match self {
            ApiError::NotFound(msg) | ApiError::Validation(msg) | ApiError::Transport(msg) => msg,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Transport(format!("Unexpected response from service: {}", e))
        } else {
            ApiError::Transport(format!("Service unavailable: {}", e))
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: serde_json::Value,
}

/// Pull a string `detail` out of an error body. FastAPI-style validation
/// lists and non-JSON bodies yield `None`.
pub fn extract_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail {
        serde_json::Value::String(detail) => Some(detail),
        _ => None,
    }
}

/// Local form check failures, raised before any request is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("{field} must be a positive whole number, got '{value}'")]
    NotANumber { field: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}
