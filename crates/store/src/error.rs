use api_client::error::ApiError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// Rejected before any request was sent.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("API client error: {0}")]
    Api(#[from] ApiError),

    #[error("No market data available for instrument {0}")]
    NoMarketData(u64),

    /// The account changed while the request was in flight; the result was
    /// dropped.
    #[error("Response for a previous session was discarded")]
    Stale,
}

impl StoreError {
    /// The text routed to the notification for this failure.
    pub fn user_message(&self) -> String {
        match self {
            StoreError::Validation(message) => message.clone(),
            StoreError::Api(e) => e.user_message(),
            StoreError::NoMarketData(_) => self.to_string(),
            StoreError::Stale => self.to_string(),
        }
    }
}
