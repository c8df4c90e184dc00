use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid name: {0}")]
    Name(String),
    #[error("invalid tempo: {0}")]
    Tempo(String),
    #[error("invalid brightness: {0}")]
    Brightness(String),
    #[error("unknown patch field {0:?} (expected name or tempo)")]
    UnknownField(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    #[error("{0}")]
    Transport(String),
    #[error("{message} (status {status})")]
    Status { status: u16, message: String },
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            RemoteError::Decode(e.to_string())
        } else {
            RemoteError::Transport(e.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error("no patch at index {index} (showing {len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("patch console is no longer running")]
    ConsoleClosed,
}
