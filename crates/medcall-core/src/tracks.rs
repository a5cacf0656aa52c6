use serde::{Deserialize, Serialize};

use crate::engine::{OffReason, TrackSnapshot, TrackStatus};

/// Whether the engine has attached a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrackPresence {
    #[default]
    Absent,
    Pending,
    Blocked,
    Available,
}

/// Whether the media pipe behind an attached track is actually flowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrackReadiness {
    #[default]
    NotLive,
    Live,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockedReason {
    PermissionDenied,
    DeviceMissing,
    Bandwidth,
}

/// Reconciled state of one audio or video track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrackState {
    pub presence: TrackPresence,
    pub blocked_reason: Option<BlockedReason>,
    pub readiness: TrackReadiness,
    /// Track is absent because the participant turned it off.
    pub off_by_user: bool,
}

/// What the UI should draw for a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrackDisplay {
    Render,
    Connecting,
    MutedByUser,
    Blocked(BlockedReason),
    Off,
}

impl TrackState {
    pub fn available(readiness: TrackReadiness) -> Self {
        Self {
            presence: TrackPresence::Available,
            readiness,
            ..Self::default()
        }
    }

    pub fn blocked(reason: BlockedReason) -> Self {
        Self {
            presence: TrackPresence::Blocked,
            blocked_reason: Some(reason),
            ..Self::default()
        }
    }

    pub fn from_snapshot(snapshot: &TrackSnapshot) -> Self {
        let readiness = if snapshot.live {
            TrackReadiness::Live
        } else {
            TrackReadiness::NotLive
        };

        match snapshot.status {
            TrackStatus::Off => match snapshot.off {
                Some(OffReason::Bandwidth) => Self::blocked(BlockedReason::Bandwidth),
                off => Self {
                    off_by_user: off == Some(OffReason::User),
                    ..Self::default()
                },
            },
            TrackStatus::Blocked => {
                Self::blocked(snapshot.blocked.unwrap_or(BlockedReason::DeviceMissing))
            }
            TrackStatus::Loading | TrackStatus::Interrupted => Self {
                presence: TrackPresence::Pending,
                readiness,
                ..Self::default()
            },
            TrackStatus::Sendable | TrackStatus::Playable => Self::available(readiness),
        }
    }

    /// A track may be drawn only when it is attached and its pipe is live.
    pub fn is_render_ready(&self) -> bool {
        self.presence == TrackPresence::Available && self.readiness == TrackReadiness::Live
    }

    pub fn display(&self) -> TrackDisplay {
        match self.presence {
            TrackPresence::Available if self.readiness == TrackReadiness::Live => {
                TrackDisplay::Render
            }
            TrackPresence::Available | TrackPresence::Pending => TrackDisplay::Connecting,
            TrackPresence::Blocked => {
                TrackDisplay::Blocked(self.blocked_reason.unwrap_or(BlockedReason::DeviceMissing))
            }
            TrackPresence::Absent if self.off_by_user => TrackDisplay::MutedByUser,
            TrackPresence::Absent => TrackDisplay::Off,
        }
    }
}
