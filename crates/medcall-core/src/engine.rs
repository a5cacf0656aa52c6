//! Seam to the real-time communication engine.
//!
//! The engine owns transport, encoding and connection management. The core
//! only drives it through [`EngineHandle`] control calls and consumes the
//! ordered [`EngineEvent`] stream returned by [`CallEngine::create`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::errors::EngineError;
use crate::session::RoomTarget;
use crate::tracks::BlockedReason;

/// Ordered event stream for a single engine handle.
pub type EngineEvents = mpsc::UnboundedReceiver<EngineEvent>;

/// Factory for engine handles. One handle per call attempt.
#[async_trait]
pub trait CallEngine: Send + Sync {
    async fn create(&self) -> Result<(Arc<dyn EngineHandle>, EngineEvents), EngineError>;
}

/// Control surface of one engine instance.
///
/// Implementations must treat repeated identical commands as no-ops.
#[async_trait]
pub trait EngineHandle: Send + Sync {
    async fn join(&self, target: &RoomTarget, options: JoinOptions) -> Result<(), EngineError>;
    async fn leave(&self) -> Result<(), EngineError>;
    fn destroy(&self);
    async fn set_local_video(&self, on: bool) -> Result<(), EngineError>;
    async fn set_local_audio(&self, on: bool) -> Result<(), EngineError>;
    fn participants(&self) -> HashMap<String, ParticipantSnapshot>;
    fn meeting_state(&self) -> MeetingState;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JoinOptions {
    pub start_video_off: bool,
    pub start_audio_off: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MeetingState {
    #[default]
    New,
    Joining,
    Joined,
    Left,
    Error,
}

/// Engine-side status of a track, before reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackStatus {
    #[default]
    Off,
    Blocked,
    Loading,
    Interrupted,
    Sendable,
    Playable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffReason {
    User,
    Bandwidth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrackSnapshot {
    pub status: TrackStatus,
    pub blocked: Option<BlockedReason>,
    pub off: Option<OffReason>,
    /// The underlying media stream track reports a live ready state.
    pub live: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParticipantTracks {
    pub video: TrackSnapshot,
    pub audio: TrackSnapshot,
    pub screen_video: TrackSnapshot,
    pub screen_audio: TrackSnapshot,
}

/// Participant as reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParticipantSnapshot {
    pub id: String,
    pub user_name: String,
    pub local: bool,
    /// Engine-reported camera enabled state.
    pub video: bool,
    /// Engine-reported microphone enabled state.
    pub audio: bool,
    pub tracks: ParticipantTracks,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceErrorKind {
    Permissions,
    NotFound,
    InUse,
    Unknown,
}

impl DeviceErrorKind {
    pub fn blocked_reason(self) -> BlockedReason {
        match self {
            DeviceErrorKind::Permissions => BlockedReason::PermissionDenied,
            DeviceErrorKind::NotFound | DeviceErrorKind::InUse | DeviceErrorKind::Unknown => {
                BlockedReason::DeviceMissing
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    JoinedMeeting,
    LeftMeeting,
    Error { message: String },
    ParticipantJoined(ParticipantSnapshot),
    ParticipantUpdated(ParticipantSnapshot),
    ParticipantLeft { id: String },
    CameraError {
        kind: DeviceErrorKind,
        video_blocked: bool,
        audio_blocked: bool,
        message: String,
    },
}
