use serde::Deserialize;
use thiserror::Error;

/// Errors from acquiring a credential through the registration endpoint.
///
/// All variants are `Clone` so an outcome can cross the channel between the
/// background registration task and the session store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Network error: {0}")]
    Transport(String),

    #[error("User not created ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Invalid registration response: {0}")]
    MalformedResponse(String),

    #[error("A registration request is already in progress")]
    AcquisitionInProgress,
}

/// Errors from the feed and post endpoints.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized - sign up to get an API key")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Error payload the aggregator server sends for every non-2xx response.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Pull the human-readable message out of an error response body.
/// Falls back to the (truncated) raw body when it is not `{"error": "..."}`.
pub(crate) fn server_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) if !parsed.error.trim().is_empty() => parsed.error,
        _ => truncate_body(body.trim()),
    }
}

/// Truncate a response body to avoid logging excessive data
fn truncate_body(body: &str) -> String {
    let total = body.chars().count();
    if total <= MAX_ERROR_BODY_LENGTH {
        body.to_string()
    } else {
        let head: String = body.chars().take(MAX_ERROR_BODY_LENGTH).collect();
        format!("{}... (truncated, {} total chars)", head, total)
    }
}

impl AuthError {
    /// Build the rejection for a registration response that was not `201 Created`.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let mut message = server_message(body);
        if message.is_empty() {
            message = status
                .canonical_reason()
                .unwrap_or("no reason given")
                .to_string();
        }
        AuthError::Rejected {
            status: status.as_u16(),
            message,
        }
    }

    /// Message shown to the user and stored as the session's last error.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::Transport(_) => {
                "Unable to connect to server. Check that it is running and try again.".to_string()
            }
            AuthError::Rejected { .. } => self.to_string(),
            AuthError::MalformedResponse(_) => {
                "Account created but the server did not return an API key".to_string()
            }
            AuthError::AcquisitionInProgress => {
                "Already creating an account, please wait".to_string()
            }
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        AuthError::Transport(err.to_string())
    }
}

impl ApiError {
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = server_message(body);
        match status.as_u16() {
            401 | 403 => ApiError::Unauthorized,
            404 => ApiError::NotFound(message),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(message),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_server_message_extracts_error_field() {
        assert_eq!(server_message(r#"{"error":"User already exists"}"#), "User already exists");
        assert_eq!(server_message("plain text failure"), "plain text failure");
        assert_eq!(server_message(r#"{"error":"  "}"#), r#"{"error":"  "}"#);
    }

    #[test]
    fn test_truncate_body() {
        let long = "x".repeat(MAX_ERROR_BODY_LENGTH + 20);
        let truncated = truncate_body(&long);
        assert!(truncated.starts_with(&"x".repeat(MAX_ERROR_BODY_LENGTH)));
        assert!(truncated.ends_with("(truncated, 520 total chars)"));

        // Multi-byte characters must not split
        let accented = "é".repeat(MAX_ERROR_BODY_LENGTH + 1);
        assert!(truncate_body(&accented).contains("truncated"));
    }

    #[test]
    fn test_auth_error_from_status() {
        let err = AuthError::from_status(StatusCode::BAD_REQUEST, r#"{"error":"User already exists"}"#);
        assert_eq!(
            err,
            AuthError::Rejected {
                status: 400,
                message: "User already exists".to_string()
            }
        );
        assert_eq!(err.user_message(), "User not created (400): User already exists");

        // Empty body falls back to the status reason
        let err = AuthError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "");
        assert_eq!(err.user_message(), "User not created (500): Internal Server Error");
    }

    #[test]
    fn test_user_messages_are_never_empty() {
        let errors = [
            AuthError::Transport("connection refused".to_string()),
            AuthError::Rejected { status: 409, message: "taken".to_string() },
            AuthError::MalformedResponse("missing field `api_key`".to_string()),
            AuthError::AcquisitionInProgress,
        ];
        for err in errors {
            assert!(!err.user_message().is_empty(), "{:?}", err);
        }
    }

    #[test]
    fn test_api_error_from_status() {
        assert!(matches!(ApiError::from_status(StatusCode::UNAUTHORIZED, ""), ApiError::Unauthorized));
        assert!(matches!(ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, ""), ApiError::RateLimited));
        assert!(matches!(
            ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, r#"{"error":"Failed to get posts"}"#),
            ApiError::ServerError(msg) if msg == "Failed to get posts"
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_REQUEST, r#"{"error":"Invalid offset or limit"}"#),
            ApiError::InvalidResponse(msg) if msg.contains("Invalid offset or limit")
        ));
    }
}
