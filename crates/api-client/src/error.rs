use thiserror::Error;

/// Shown when neither the backend nor the transport gave a usable message.
pub const FALLBACK_MESSAGE: &str = "Connection error. Please try again.";

#[derive(Error, Debug)]
pub enum ApiError {
    /// No usable response: connection refused, DNS failure, timeout, or a
    /// body that could not be read.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with an error status or a `success: false`
    /// envelope.
    #[error("The API request returned an error: {message}")]
    Backend { status: Option<u16>, message: String },

    #[error("Failed to deserialize the API response: {0}")]
    Deserialization(String),
}

impl ApiError {
    pub fn backend(status: Option<u16>, message: impl Into<String>) -> Self {
        ApiError::Backend {
            status,
            message: message.into(),
        }
    }

    /// The message shown to the user for this failure.
    pub fn user_message(&self) -> String {
        let message = match self {
            ApiError::Transport(e) if e.is_timeout() => "Request timed out".to_string(),
            ApiError::Transport(e) => e.to_string(),
            ApiError::Backend { message, .. } => message.clone(),
            ApiError::Deserialization(msg) => msg.clone(),
        };
        if message.trim().is_empty() {
            FALLBACK_MESSAGE.to_string()
        } else {
            message
        }
    }

    /// HTTP status of the failed response, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            ApiError::Backend { status, .. } => *status,
            ApiError::Deserialization(_) => None,
        }
    }

    pub fn is_insufficient_funds(&self) -> bool {
        self.user_message().to_lowercase().contains("insufficient")
    }

    pub fn is_validation(&self) -> bool {
        self.status() == Some(400)
    }
}
