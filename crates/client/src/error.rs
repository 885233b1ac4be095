use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with a failure envelope.
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Api { status: 404, .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::Api { status: 400, .. })
    }
}
