//! Medcall call session core.
//!
//! Owns the lifecycle of a single telemedicine consultation call: permission
//! negotiation, engine creation and join, track reconciliation, media
//! controls and idempotent teardown. The real-time engine and the host
//! platform are reached only through the traits in [`engine`] and
//! [`platform`], so the crate has no platform dependencies.

pub mod config;
pub mod controls;
pub mod decisions;
pub mod engine;
pub mod errors;
pub mod events;
pub mod lifecycle;
pub mod manager;
pub mod participants;
pub mod permissions;
pub mod platform;
pub mod session;
pub mod state;
pub mod tracks;

pub use config::SessionConfig;
pub use controls::{MuteController, MuteIntent};
pub use decisions::{Decision, DecisionRecord, DecisionStore, FileDecisionStore, MemoryDecisionStore};
pub use engine::{
    CallEngine, DeviceErrorKind, EngineEvent, EngineEvents, EngineHandle, JoinOptions, MeetingState,
    OffReason, ParticipantSnapshot, ParticipantTracks, TrackSnapshot, TrackStatus,
};
pub use errors::{CallError, EngineError, ErrorKind, PermissionError, SessionError};
pub use events::{CallStateListener, CallUpdate};
pub use lifecycle::{LifecycleGuard, TeardownOutcome, TeardownReason};
pub use manager::CallSessionManager;
pub use participants::{MediaKind, ParticipantRecord, Tile, TileKind, TileLayout, TrackReconciler};
pub use permissions::{
    Capabilities, OutcomeSource, PermissionNegotiator, PermissionOutcome, PermissionStatus,
};
pub use platform::{FallbackPolicy, FixedFallback, Navigator, PermissionPlatform, PromptResponse};
pub use session::{CallMode, CallSession, RoomTarget};
pub use state::{CallState, Trigger};
pub use tracks::{BlockedReason, TrackDisplay, TrackPresence, TrackReadiness, TrackState};
