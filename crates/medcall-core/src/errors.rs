use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::CallState;

#[derive(Debug, Error)]
pub enum CallError {
    #[error("permission error: {0}")]
    Permission(#[from] PermissionError),
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
    #[error("call creation failed: {0}")]
    Creation(String),
    #[error("join failed: {0}")]
    Join(String),
    #[error("no joined-meeting event within {0:?}")]
    JoinTimeout(Duration),
    #[error("operation not allowed in state {0:?}")]
    InvalidState(CallState),
    #[error("local participant not reported by engine")]
    LocalParticipantMissing,
    #[error("camera unavailable in audio-only mode")]
    CameraUnavailable,
    #[error("microphone access was not granted for this call")]
    MicrophoneUnavailable,
    #[error("call attempt cancelled")]
    Cancelled,
}

/// Failures reported by the real-time engine collaborator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("create: {0}")]
    Create(String),
    #[error("join: {0}")]
    Join(String),
    #[error("leave: {0}")]
    Leave(String),
    #[error("command: {0}")]
    Command(String),
    #[error("engine handle closed")]
    Closed,
}

/// Failures of the platform permission layer. User refusal is not an error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PermissionError {
    #[error("platform failure: {0}")]
    Platform(String),
    #[error("decision store: {0}")]
    Storage(String),
    #[error("permission flow invalidated")]
    Cancelled,
}

/// Category of the structured error surfaced on a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    PermissionDenied,
    PermissionFailure,
    Creation,
    Join,
    JoinTimeout,
    Fatal,
    ConnectionLost,
}

/// Structured error payload attached to a [`CallSession`](crate::session::CallSession).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionError {
    pub kind: ErrorKind,
    pub message: String,
}

impl SessionError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Whether the UI should offer a retry button rather than a settings redirect.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::Creation
                | ErrorKind::Join
                | ErrorKind::JoinTimeout
                | ErrorKind::Fatal
                | ErrorKind::ConnectionLost
        )
    }
}
