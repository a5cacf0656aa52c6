use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::engine::{EngineHandle, ParticipantSnapshot};
use crate::errors::CallError;

/// Last desired media state issued to the engine.
///
/// Informational only: toggles never derive their command from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MuteIntent {
    pub camera_requested_on: bool,
    pub mic_requested_on: bool,
}

/// Issues camera and microphone commands derived from engine-reported state.
///
/// Each toggle reads the local participant from the engine at call time and
/// sends the inverse of what the engine reports, so rapid taps and
/// background/foreground transitions cannot act on a stale local flag.
#[derive(Debug, Default)]
pub struct MuteController {
    intent: Mutex<MuteIntent>,
}

impl MuteController {
    pub fn new() -> Self {
        Self::default()
    }

    fn intent_guard(&self) -> MutexGuard<'_, MuteIntent> {
        self.intent.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn intent(&self) -> MuteIntent {
        *self.intent_guard()
    }

    pub(crate) fn reset(&self, intent: MuteIntent) {
        *self.intent_guard() = intent;
    }

    fn local_snapshot(engine: &dyn EngineHandle) -> Result<ParticipantSnapshot, CallError> {
        engine
            .participants()
            .into_values()
            .find(|p| p.local)
            .ok_or(CallError::LocalParticipantMissing)
    }

    /// Flip the camera relative to what the engine reports. Returns the
    /// requested state.
    pub async fn toggle_camera(
        &self,
        engine: &dyn EngineHandle,
        camera_allowed: bool,
    ) -> Result<bool, CallError> {
        let current = Self::local_snapshot(engine)?.video;
        self.set_camera(engine, !current, camera_allowed).await
    }

    /// Flip the microphone relative to what the engine reports.
    pub async fn toggle_mic(
        &self,
        engine: &dyn EngineHandle,
        mic_allowed: bool,
    ) -> Result<bool, CallError> {
        let current = Self::local_snapshot(engine)?.audio;
        self.set_mic(engine, !current, mic_allowed).await
    }

    pub async fn set_camera(
        &self,
        engine: &dyn EngineHandle,
        on: bool,
        camera_allowed: bool,
    ) -> Result<bool, CallError> {
        if on && !camera_allowed {
            return Err(CallError::CameraUnavailable);
        }
        engine.set_local_video(on).await?;
        self.intent_guard().camera_requested_on = on;
        tracing::info!("camera requested {}", if on { "on" } else { "off" });
        Ok(on)
    }

    pub async fn set_mic(
        &self,
        engine: &dyn EngineHandle,
        on: bool,
        mic_allowed: bool,
    ) -> Result<bool, CallError> {
        if on && !mic_allowed {
            return Err(CallError::MicrophoneUnavailable);
        }
        engine.set_local_audio(on).await?;
        self.intent_guard().mic_requested_on = on;
        tracing::info!("microphone requested {}", if on { "on" } else { "off" });
        Ok(on)
    }
}
