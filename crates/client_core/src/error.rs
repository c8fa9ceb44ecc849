use shared::error::ApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server rejected request: {0}")]
    Api(#[from] ApiError),
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("no access token configured; team persistence requires one")]
    MissingToken,
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("roster already holds six members")]
    RosterFull,
    #[error("roster slot {0} is out of range")]
    InvalidSlot(usize),
}

impl ClientError {
    pub fn validation(message: impl Into<String>) -> Self {
        ClientError::Validation(message.into())
    }

    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            ClientError::Api(err) => Some(err),
            _ => None,
        }
    }
}
