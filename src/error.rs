use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("{service} returned status {status}: {message}")]
    UpstreamStatus {
        service: &'static str,
        status: u16,
        message: String,
        /// Decoded JSON error body, when the upstream sent one
        body: Option<Value>,
    },

    #[error("{service} did not respond in time")]
    Timeout { service: &'static str },

    #[error("{message}")]
    NotFound {
        message: String,
        details: Option<Value>,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<AppError>,
    },

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Status code reported by the upstream, if the failure carried one
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            AppError::UpstreamStatus { status, .. } => Some(*status),
            AppError::HttpClient(e) => e.status().map(|s| s.as_u16()),
            AppError::Context { source, .. } => source.upstream_status(),
            _ => None,
        }
    }

    /// Client errors (4xx) are final; timeouts, transport failures and 5xx
    /// responses may succeed on another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::HttpClient(_) | AppError::UpstreamStatus { .. } | AppError::Timeout { .. } => {
                !matches!(self.upstream_status(), Some(status) if (400..500).contains(&status))
            }
            _ => false,
        }
    }

    pub fn is_upstream_not_found(&self) -> bool {
        self.upstream_status() == Some(404)
    }

    /// Wraps the error with a message describing the failed operation
    pub fn context(self, context: impl Into<String>) -> Self {
        AppError::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// Adds `.context(...)` to `AppResult`
pub trait ResultExt<T> {
    fn context(self, context: &str) -> AppResult<T>;
}

impl<T> ResultExt<T> for AppResult<T> {
    fn context(self, context: &str) -> AppResult<T> {
        self.map_err(|e| match e {
            // Client-facing errors already carry the right status and message
            e @ (AppError::NotFound { .. } | AppError::InvalidInput(_)) => e,
            e => e.context(context),
        })
    }
}

/// JSON body of every error response
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::NotFound { message, details } => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    error: message,
                    details,
                },
            ),
            AppError::InvalidInput(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: msg,
                    details: None,
                },
            ),
            AppError::Context { context, source } => {
                tracing::error!(error = %source, "{}", context);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: context,
                        details: Some(Value::String(source.to_string())),
                    },
                )
            }
            other => {
                tracing::error!(error = %other, "Unhandled request error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: "Internal server error".to_string(),
                        details: Some(Value::String(other.to_string())),
                    },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
