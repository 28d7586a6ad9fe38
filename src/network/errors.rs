use thiserror::Error;

// * Unified Error type for the access layer.
#[derive(Error, Debug)]
pub enum AccessError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server error: {0}")]
    Server(u16),

    #[error("client error: {0}")]
    Client(u16),

    #[error("worker blocked, response status {0}")]
    Blocked(u16),

    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("client credentials not found in page body")]
    CredentialsNotFound,

    #[error("token exchange failed: {0}")]
    TokenExchange(String),

    #[error("invalid proxy address: {0}")]
    InvalidProxy(String),

    #[error("user agent pool is empty")]
    NoUserAgents,

    #[error("no workers could be bootstrapped")]
    NoWorkers,

    #[error("operation cancelled")]
    Cancelled,
}

impl AccessError {
    // * Network faults and upstream 5xx are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Server(_))
    }

    // * A burned identity surfaces distinctly so the operator can halt the run.
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked(_))
    }
}
