use medcall_core::EngineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LiveKitError {
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("room error: {0}")]
    Room(String),
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("http error: {0}")]
    Http(String),
    #[error("invalid consultation link: {0}")]
    InvalidUrl(String),
}

impl From<LiveKitError> for EngineError {
    fn from(e: LiveKitError) -> Self {
        match e {
            LiveKitError::Connection(msg) => EngineError::Join(msg),
            other => EngineError::Command(other.to_string()),
        }
    }
}
