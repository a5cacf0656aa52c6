use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::SessionError;
use crate::permissions::{Capabilities, PermissionOutcome};
use crate::state::CallState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CallMode {
    AudioOnly,
    AudioVideo,
}

impl CallMode {
    pub fn capabilities(self) -> Capabilities {
        match self {
            CallMode::AudioOnly => Capabilities::MICROPHONE,
            CallMode::AudioVideo => Capabilities::CAMERA_AND_MICROPHONE,
        }
    }
}

/// Opaque connection descriptor handed to the engine on join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomTarget {
    pub url: String,
    pub token: Option<String>,
}

impl RoomTarget {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

/// One consultation attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallSession {
    pub session_id: String,
    pub room_target: RoomTarget,
    pub mode: CallMode,
    pub state: CallState,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub last_error: Option<SessionError>,
    /// Outcome of the permission step for this attempt, if it ran.
    pub permission: Option<PermissionOutcome>,
    /// 1 for the first attempt, incremented on each retry.
    pub attempt: u32,
}

impl CallSession {
    pub fn new(room_target: RoomTarget, mode: CallMode, state: CallState) -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            room_target,
            mode,
            state,
            started_at: Utc::now(),
            ended_at: None,
            last_error: None,
            permission: None,
            attempt: 1,
        }
    }

    /// Fresh attempt for the same consultation, used by retry.
    pub fn next_attempt(&self, state: CallState) -> Self {
        Self {
            attempt: self.attempt + 1,
            permission: self.permission.clone(),
            ..Self::new(self.room_target.clone(), self.mode, state)
        }
    }

    /// Capabilities the engine may use for this attempt.
    pub fn usable_capabilities(&self) -> Capabilities {
        let requested = self.mode.capabilities();
        match &self.permission {
            Some(outcome) => requested.intersect(outcome.usable),
            None => requested,
        }
    }
}
