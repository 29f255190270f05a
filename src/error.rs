use thiserror::Error;

/// Message shown when the server cannot be reached at all.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error: could not reach the server";

/// Message shown when the server answers with something that is not the expected JSON.
pub const MALFORMED_RESPONSE_MESSAGE: &str = "Received a malformed response from the server";

/// Message shown when a fetch died before producing a response.
pub const INTERRUPTED_MESSAGE: &str = "The request was interrupted, please try again";

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("{0}")]
    Validation(String),

    #[error("Request failed with status {status}: {message}")]
    Request { status: u16, message: String },

    #[cfg(feature = "client")]
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Query encoding error: {0}")]
    QueryEncoding(#[from] serde_urlencoded::ser::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Background fetch failed: {0}")]
    TaskFailed(String),

    #[error("Report index {index} out of range for {len} reports")]
    IndexOutOfRange { index: usize, len: usize },
}

impl DashboardError {
    /// Builds a request error from a failed response body.
    ///
    /// The backend reports failures as `{"detail": "..."}`; when that field is missing
    /// or the body is not JSON at all, the message falls back to `Error: <status>`.
    pub fn from_response_body(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(String::from))
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| format!("Error: {}", status));

        DashboardError::Request { status, message }
    }

    /// The single line a controller stores in its `error` field.
    pub fn user_message(&self) -> String {
        match self {
            DashboardError::Validation(msg) => msg.clone(),
            DashboardError::Request { message, .. } => message.clone(),
            #[cfg(feature = "client")]
            DashboardError::Transport(_) => NETWORK_ERROR_MESSAGE.to_string(),
            DashboardError::RateLimitExceeded => {
                "Too many requests, please try again shortly".to_string()
            }
            DashboardError::InvalidResponse(_) | DashboardError::Json(_) => {
                MALFORMED_RESPONSE_MESSAGE.to_string()
            }
            DashboardError::TaskFailed(_) => INTERRUPTED_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, DashboardError::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
