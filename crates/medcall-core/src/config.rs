use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::permissions::Capabilities;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    /// Bound on waiting for joined-meeting after join is issued.
    pub join_timeout_ms: u64,
    /// Bound on the engine leave call during teardown.
    pub leave_timeout_ms: u64,
    /// Background duration after which cached flags are no longer trusted.
    pub background_threshold_ms: u64,
    pub camera_on_join: bool,
    pub mic_on_join: bool,
    /// Capabilities usable when the platform reports a limited grant.
    pub limited_grant_capabilities: Capabilities,
    pub skip_prompt_after_grant: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            join_timeout_ms: 30_000,
            leave_timeout_ms: 5_000,
            background_threshold_ms: 60_000,
            camera_on_join: true,
            mic_on_join: true,
            limited_grant_capabilities: Capabilities::CAMERA_AND_MICROPHONE,
            skip_prompt_after_grant: true,
        }
    }
}

impl SessionConfig {
    /// Load from a JSON file, falling back to defaults when the file is
    /// missing or unreadable.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!("invalid session config {}: {e}, using defaults", path.display());
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn join_timeout(&self) -> Duration {
        Duration::from_millis(self.join_timeout_ms)
    }

    pub fn leave_timeout(&self) -> Duration {
        Duration::from_millis(self.leave_timeout_ms)
    }

    pub fn background_threshold(&self) -> Duration {
        Duration::from_millis(self.background_threshold_ms)
    }
}
