//! Error types shared by the receiver and the processor.

use thiserror::Error;

/// Errors raised while resolving and answering a command.
#[derive(Error, Debug)]
pub enum ChatOpsError {
    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// No bearer credential was attached to the inbound command.
    #[error("No credential attached to the command")]
    MissingCredential,

    /// The management platform answered 404 for a named resource.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Non-success HTTP status other than 404.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Transport-level failure.
    #[error("Network error: {0}")]
    Network(String),

    /// Malformed payload.
    #[error("JSON error: {0}")]
    Json(String),

    /// The chat platform returned `ok: false` in the response body.
    #[error("Slack API error: {0}")]
    Api(String),

    /// Scheduling the detached work failed.
    #[error("Queue error: {0}")]
    Queue(String),
}

impl ChatOpsError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ChatOpsError::NotFound(_))
    }
}

impl From<reqwest::Error> for ChatOpsError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ChatOpsError::Json(err.to_string())
        } else {
            ChatOpsError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ChatOpsError {
    fn from(err: serde_json::Error) -> Self {
        ChatOpsError::Json(err.to_string())
    }
}

pub type ChatOpsResult<T> = std::result::Result<T, ChatOpsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ChatOpsError::Http {
            status: 502,
            body: "bad gateway".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 502: bad gateway");

        let err = ChatOpsError::Api("not_in_channel".to_string());
        assert_eq!(err.to_string(), "Slack API error: not_in_channel");
    }

    #[test]
    fn test_only_not_found_is_not_found() {
        assert!(ChatOpsError::NotFound("apps/foo-bar".to_string()).is_not_found());
        assert!(!ChatOpsError::Http {
            status: 500,
            body: String::new()
        }
        .is_not_found());
        assert!(!ChatOpsError::MissingCredential.is_not_found());
    }

    #[test]
    fn test_json_conversion() {
        let err: ChatOpsError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, ChatOpsError::Json(_)));
    }
}
