use reqwest::StatusCode;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum JanitorError {
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("Catalog rejected credentials with status: {0}")]
    Auth(StatusCode),

    #[error("Catalog entity not found: {0}")]
    NotFound(String),

    #[error("Catalog rate limit exceeded")]
    RateLimited,

    #[error("Unexpected catalog response: {0}")]
    UnexpectedResponse(String),

    #[error("Upstream error with status: {0}")]
    UpstreamStatus(StatusCode),
}

impl From<figment::Error> for JanitorError {
    fn from(e: figment::Error) -> Self {
        JanitorError::Config(Box::new(e))
    }
}

impl JanitorError {
    /// Map a non-success catalog status onto the error taxonomy.
    pub fn from_status(status: StatusCode, what: impl Into<String>) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => JanitorError::Auth(status),
            StatusCode::NOT_FOUND => JanitorError::NotFound(what.into()),
            StatusCode::TOO_MANY_REQUESTS => JanitorError::RateLimited,
            _ => JanitorError::UpstreamStatus(status),
        }
    }

    /// Errors that abort the whole run regardless of stage.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            JanitorError::Auth(_) | JanitorError::RateLimited | JanitorError::Config(_)
        )
    }

    /// Errors a stage may log and step over for a single entity.
    pub fn is_skippable(&self) -> bool {
        matches!(
            self,
            JanitorError::NotFound(_) | JanitorError::UnexpectedResponse(_)
        )
    }
}

/// Decides which failures the retry policy attempts again.
pub trait IsRetryable {
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for JanitorError {
    fn is_retryable(&self) -> bool {
        match self {
            JanitorError::RateLimited => true,
            JanitorError::UpstreamStatus(status) => status.is_server_error(),
            JanitorError::Reqwest(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}
