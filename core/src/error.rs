use thiserror::Error;

#[derive(Error, Debug)]
pub enum BoardError {
    #[error("Status source not configured: {0}")]
    SourceNotConfigured(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("{status} {status_text} - {body}")]
    Http {
        status:      u16,
        status_text: String,
        body:        String,
    },

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type BoardResult<T> = Result<T, BoardError>;

impl From<reqwest::Error> for BoardError {
    fn from(err: reqwest::Error) -> Self {
        // No response received at all — DNS, connect, timeout.
        if err.is_connect() || err.is_timeout() {
            return BoardError::Transport(format!("no response from server: {err}"));
        }
        if err.is_decode() {
            return BoardError::Malformed(err.to_string());
        }
        BoardError::Transport(err.to_string())
    }
}
