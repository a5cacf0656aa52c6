//! UniFFI bindings for medcall-core.
//!
//! Provides a MedcallClient object that wraps CallSessionManager and the
//! LiveKit engine into a single FFI-safe interface. Host callbacks
//! (permission dialog, fallback choice, navigation) are bridged into the
//! core's platform traits.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use medcall_core::{
    self, BlockedReason as CoreBlockedReason, CallMode as CoreCallMode,
    CallState as CoreCallState, CallUpdate as CoreCallUpdate, Capabilities,
    DeviceErrorKind as CoreDeviceErrorKind, ErrorKind as CoreErrorKind,
    ParticipantRecord as CoreParticipantRecord, PromptResponse as CorePromptResponse,
    SessionError as CoreSessionError, Tile as CoreTile, TileKind as CoreTileKind,
    TrackDisplay as CoreTrackDisplay,
};
use medcall_livekit::{AuthService, LiveKitEngine, LiveKitError};

uniffi::include_scaffolding!("medcall");

const CONFIG_FILE: &str = "session_config.json";

// ── Namespace functions ──────────────────────────────────────────────

/// Initialize tracing/logging. Call once from the host before using MedcallClient.
fn init_logging() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new(
                        "medcall_core=debug,medcall_livekit=info,medcall_ffi=debug",
                    )
                }),
            )
            .with_ansi(false)
            .init();
    });
}

// ── FFI-safe type conversions ──────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    Idle,
    RequestingPermission,
    Creating,
    Joining,
    Joined,
    Leaving,
    Error,
}

impl From<CoreCallState> for CallState {
    fn from(s: CoreCallState) -> Self {
        match s {
            CoreCallState::Idle => Self::Idle,
            CoreCallState::RequestingPermission => Self::RequestingPermission,
            CoreCallState::Creating => Self::Creating,
            CoreCallState::Joining => Self::Joining,
            CoreCallState::Joined => Self::Joined,
            CoreCallState::Leaving => Self::Leaving,
            CoreCallState::Error => Self::Error,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallMode {
    AudioOnly,
    AudioVideo,
}

impl From<CoreCallMode> for CallMode {
    fn from(m: CoreCallMode) -> Self {
        match m {
            CoreCallMode::AudioOnly => Self::AudioOnly,
            CoreCallMode::AudioVideo => Self::AudioVideo,
        }
    }
}

impl From<CallMode> for CoreCallMode {
    fn from(m: CallMode) -> Self {
        match m {
            CallMode::AudioOnly => Self::AudioOnly,
            CallMode::AudioVideo => Self::AudioVideo,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    PermissionDenied,
    PermissionFailure,
    Creation,
    Join,
    JoinTimeout,
    Fatal,
    ConnectionLost,
}

impl From<CoreErrorKind> for ErrorKind {
    fn from(k: CoreErrorKind) -> Self {
        match k {
            CoreErrorKind::PermissionDenied => Self::PermissionDenied,
            CoreErrorKind::PermissionFailure => Self::PermissionFailure,
            CoreErrorKind::Creation => Self::Creation,
            CoreErrorKind::Join => Self::Join,
            CoreErrorKind::JoinTimeout => Self::JoinTimeout,
            CoreErrorKind::Fatal => Self::Fatal,
            CoreErrorKind::ConnectionLost => Self::ConnectionLost,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptResponse {
    Granted,
    Limited,
    Denied,
    Dismissed,
}

impl From<PromptResponse> for CorePromptResponse {
    fn from(r: PromptResponse) -> Self {
        match r {
            PromptResponse::Granted => Self::Granted,
            PromptResponse::Limited => Self::Limited,
            PromptResponse::Denied => Self::Denied,
            PromptResponse::Dismissed => Self::Dismissed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockedReason {
    PermissionDenied,
    DeviceMissing,
    Bandwidth,
}

impl From<CoreBlockedReason> for BlockedReason {
    fn from(r: CoreBlockedReason) -> Self {
        match r {
            CoreBlockedReason::PermissionDenied => Self::PermissionDenied,
            CoreBlockedReason::DeviceMissing => Self::DeviceMissing,
            CoreBlockedReason::Bandwidth => Self::Bandwidth,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceErrorKind {
    Permissions,
    NotFound,
    InUse,
    Unknown,
}

impl From<DeviceErrorKind> for CoreDeviceErrorKind {
    fn from(k: DeviceErrorKind) -> Self {
        match k {
            DeviceErrorKind::Permissions => Self::Permissions,
            DeviceErrorKind::NotFound => Self::NotFound,
            DeviceErrorKind::InUse => Self::InUse,
            DeviceErrorKind::Unknown => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileKind {
    Camera,
    ScreenShare,
}

impl From<CoreTileKind> for TileKind {
    fn from(k: CoreTileKind) -> Self {
        match k {
            CoreTileKind::Camera => Self::Camera,
            CoreTileKind::ScreenShare => Self::ScreenShare,
        }
    }
}

/// What the UI should draw for one track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackDisplay {
    Render,
    Connecting,
    MutedByUser,
    Blocked { reason: BlockedReason },
    Off,
}

impl From<CoreTrackDisplay> for TrackDisplay {
    fn from(d: CoreTrackDisplay) -> Self {
        match d {
            CoreTrackDisplay::Render => Self::Render,
            CoreTrackDisplay::Connecting => Self::Connecting,
            CoreTrackDisplay::MutedByUser => Self::MutedByUser,
            CoreTrackDisplay::Blocked(reason) => Self::Blocked {
                reason: reason.into(),
            },
            CoreTrackDisplay::Off => Self::Off,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionError {
    pub kind: ErrorKind,
    pub message: String,
    pub retryable: bool,
}

impl From<CoreSessionError> for SessionError {
    fn from(e: CoreSessionError) -> Self {
        Self {
            retryable: e.is_retryable(),
            kind: e.kind.into(),
            message: e.message,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParticipantView {
    pub participant_id: String,
    pub display_name: String,
    pub is_local: bool,
    pub video: TrackDisplay,
    pub audio: TrackDisplay,
}

impl From<CoreParticipantRecord> for ParticipantView {
    fn from(p: CoreParticipantRecord) -> Self {
        Self {
            video: p.video_track.display().into(),
            audio: p.audio_track.display().into(),
            participant_id: p.participant_id,
            display_name: p.display_name,
            is_local: p.is_local,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TileView {
    pub tile_id: String,
    pub participant_id: String,
    pub kind: TileKind,
    pub is_local: bool,
    pub video: TrackDisplay,
    pub audio: TrackDisplay,
}

impl From<CoreTile> for TileView {
    fn from(t: CoreTile) -> Self {
        Self {
            video: t.video.display().into(),
            audio: t.audio.display().into(),
            tile_id: t.tile_id,
            participant_id: t.participant_id,
            kind: t.kind.into(),
            is_local: t.is_local,
        }
    }
}

/// Everything the call screen renders, flattened for the host.
#[derive(Debug, Clone, PartialEq)]
pub struct CallSnapshot {
    pub session_id: String,
    pub state: CallState,
    pub mode: CallMode,
    pub attempt: u32,
    pub last_error: Option<SessionError>,
    pub permission_requires_settings: bool,
    pub participants: Vec<ParticipantView>,
    pub tiles: Vec<TileView>,
    pub fullscreen_tile: Option<String>,
}

impl From<CoreCallUpdate> for CallSnapshot {
    fn from(u: CoreCallUpdate) -> Self {
        let session = u.session;
        Self {
            permission_requires_settings: session
                .permission
                .as_ref()
                .is_some_and(|outcome| outcome.requires_settings()),
            session_id: session.session_id,
            state: session.state.into(),
            mode: session.mode.into(),
            attempt: session.attempt,
            last_error: session.last_error.map(SessionError::from),
            participants: u.participants.into_iter().map(ParticipantView::from).collect(),
            tiles: u.layout.tiles.into_iter().map(TileView::from).collect(),
            fullscreen_tile: u.layout.fullscreen,
        }
    }
}

// ── Error conversion ──────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum MedcallError {
    #[error("Permission error: {msg}")]
    Permission { msg: String },
    #[error("Engine error: {msg}")]
    Engine { msg: String },
    #[error("Creation failed: {msg}")]
    Creation { msg: String },
    #[error("Join failed: {msg}")]
    Join { msg: String },
    #[error("Join timed out: {msg}")]
    JoinTimeout { msg: String },
    #[error("Invalid state: {msg}")]
    InvalidState { msg: String },
    #[error("Camera unavailable: {msg}")]
    CameraUnavailable { msg: String },
    #[error("Microphone unavailable: {msg}")]
    MicrophoneUnavailable { msg: String },
    #[error("Cancelled: {msg}")]
    Cancelled { msg: String },
    #[error("Link error: {msg}")]
    Link { msg: String },
    #[error("Runtime error: {msg}")]
    Runtime { msg: String },
}

impl From<medcall_core::CallError> for MedcallError {
    fn from(e: medcall_core::CallError) -> Self {
        tracing::error!("CallError: {e}");
        let msg = e.to_string();
        match e {
            medcall_core::CallError::Permission(_) => Self::Permission { msg },
            medcall_core::CallError::Engine(_) | medcall_core::CallError::LocalParticipantMissing => {
                Self::Engine { msg }
            }
            medcall_core::CallError::Creation(_) => Self::Creation { msg },
            medcall_core::CallError::Join(_) => Self::Join { msg },
            medcall_core::CallError::JoinTimeout(_) => Self::JoinTimeout { msg },
            medcall_core::CallError::InvalidState(_) => Self::InvalidState { msg },
            medcall_core::CallError::CameraUnavailable => Self::CameraUnavailable { msg },
            medcall_core::CallError::MicrophoneUnavailable => Self::MicrophoneUnavailable { msg },
            medcall_core::CallError::Cancelled => Self::Cancelled { msg },
        }
    }
}

impl From<LiveKitError> for MedcallError {
    fn from(e: LiveKitError) -> Self {
        tracing::error!("LiveKitError: {e}");
        Self::Link { msg: e.to_string() }
    }
}

impl From<uniffi::UnexpectedUniFFICallbackError> for MedcallError {
    fn from(e: uniffi::UnexpectedUniFFICallbackError) -> Self {
        Self::Runtime { msg: e.reason }
    }
}

// ── Callback interfaces ───────────────────────────────────────────────

/// Receives a snapshot after every state or participant change.
/// Called from a runtime thread; must not call back into MedcallClient
/// synchronously.
pub trait CallStateListener: Send + Sync {
    fn on_state_change(&self, snapshot: CallSnapshot);
}

/// Shows the platform camera/microphone dialog and blocks until answered.
pub trait PermissionPrompter: Send + Sync {
    fn request_permission(&self, camera: bool, microphone: bool)
        -> Result<PromptResponse, MedcallError>;
    /// Current authorization without a dialog; `None` when unknown.
    fn check_permission(
        &self,
        camera: bool,
        microphone: bool,
    ) -> Result<Option<PromptResponse>, MedcallError>;
    fn open_system_settings(&self);
}

/// Asks the user whether to continue degraded after a denial.
pub trait FallbackChooser: Send + Sync {
    fn choose(&self, camera_denied: bool, microphone_denied: bool) -> Option<CallMode>;
}

pub trait NavigationHandler: Send + Sync {
    fn go_back(&self);
}

// ── Bridges: FFI callbacks → core traits ──────────────────────────────

struct BridgeListener {
    ffi_listener: Arc<dyn CallStateListener>,
}

impl medcall_core::CallStateListener for BridgeListener {
    fn on_state_change(&self, update: CoreCallUpdate) {
        self.ffi_listener.on_state_change(update.into());
    }
}

struct PromptBridge {
    prompter: Arc<dyn PermissionPrompter>,
}

#[async_trait]
impl medcall_core::PermissionPlatform for PromptBridge {
    async fn request_permission(
        &self,
        capabilities: Capabilities,
    ) -> Result<CorePromptResponse, medcall_core::PermissionError> {
        let prompter = self.prompter.clone();
        tokio::task::spawn_blocking(move || {
            prompter.request_permission(capabilities.camera, capabilities.microphone)
        })
        .await
        .map_err(|e| medcall_core::PermissionError::Platform(e.to_string()))?
        .map(CorePromptResponse::from)
        .map_err(|e| medcall_core::PermissionError::Platform(e.to_string()))
    }

    async fn check_permission(
        &self,
        capabilities: Capabilities,
    ) -> Result<Option<CorePromptResponse>, medcall_core::PermissionError> {
        let prompter = self.prompter.clone();
        tokio::task::spawn_blocking(move || {
            prompter.check_permission(capabilities.camera, capabilities.microphone)
        })
        .await
        .map_err(|e| medcall_core::PermissionError::Platform(e.to_string()))?
        .map(|current| current.map(CorePromptResponse::from))
        .map_err(|e| medcall_core::PermissionError::Platform(e.to_string()))
    }

    async fn open_system_settings(&self) -> Result<(), medcall_core::PermissionError> {
        let prompter = self.prompter.clone();
        tokio::task::spawn_blocking(move || prompter.open_system_settings())
            .await
            .map_err(|e| medcall_core::PermissionError::Platform(e.to_string()))
    }
}

struct FallbackBridge {
    chooser: Arc<dyn FallbackChooser>,
}

#[async_trait]
impl medcall_core::FallbackPolicy for FallbackBridge {
    async fn choose(&self, denied: Capabilities) -> Option<CoreCallMode> {
        let chooser = self.chooser.clone();
        match tokio::task::spawn_blocking(move || chooser.choose(denied.camera, denied.microphone))
            .await
        {
            Ok(choice) => choice.map(CoreCallMode::from),
            Err(e) => {
                tracing::warn!("fallback chooser failed: {e}");
                None
            }
        }
    }
}

struct NavigationBridge {
    handler: Arc<dyn NavigationHandler>,
}

impl medcall_core::Navigator for NavigationBridge {
    fn go_back(&self) {
        self.handler.go_back();
    }
}

// ── MedcallClient: main FFI object ────────────────────────────────────

pub struct MedcallClient {
    manager: medcall_core::CallSessionManager,
    engine: Arc<LiveKitEngine>,
    rt: tokio::runtime::Runtime,
}

impl MedcallClient {
    pub fn new(
        data_dir: String,
        user_id: String,
        prompter: Box<dyn PermissionPrompter>,
        fallback: Box<dyn FallbackChooser>,
        navigator: Box<dyn NavigationHandler>,
    ) -> Result<Self, MedcallError> {
        let rt = tokio::runtime::Runtime::new().map_err(|e| MedcallError::Runtime {
            msg: format!("failed to create tokio runtime: {e}"),
        })?;

        let config = medcall_core::SessionConfig::load(Path::new(&data_dir).join(CONFIG_FILE));
        let decisions = Arc::new(medcall_core::FileDecisionStore::new(&data_dir));
        let negotiator = medcall_core::PermissionNegotiator::new(
            Arc::new(PromptBridge {
                prompter: Arc::from(prompter),
            }),
            decisions,
            Arc::new(FallbackBridge {
                chooser: Arc::from(fallback),
            }),
            user_id,
            config.limited_grant_capabilities,
        );

        let engine = Arc::new(LiveKitEngine::new());
        let manager = medcall_core::CallSessionManager::new(
            engine.clone(),
            negotiator,
            Arc::new(NavigationBridge {
                handler: Arc::from(navigator),
            }),
            config,
        );

        tracing::info!("MedcallClient created, data_dir={data_dir}");
        Ok(Self {
            manager,
            engine,
            rt,
        })
    }

    pub fn start(
        &self,
        room_url: String,
        token: Option<String>,
        mode: CallMode,
    ) -> Result<CallState, MedcallError> {
        let mut target = medcall_core::RoomTarget::new(room_url);
        target.token = token;
        self.start_target(target, mode)
    }

    /// Resolve a consultation link through the backend, then start the call.
    pub fn start_consultation(
        &self,
        link: String,
        username: Option<String>,
        mode: CallMode,
    ) -> Result<CallState, MedcallError> {
        let target = self
            .rt
            .block_on(AuthService::resolve(&link, username.as_deref()))?;
        self.start_target(target, mode)
    }

    fn start_target(
        &self,
        target: medcall_core::RoomTarget,
        mode: CallMode,
    ) -> Result<CallState, MedcallError> {
        // Panics must not cross the FFI boundary.
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            self.rt
                .block_on(self.manager.start(target, mode.into()))
                .map(CallState::from)
                .map_err(MedcallError::from)
        }));

        match result {
            Ok(res) => res,
            Err(panic_info) => {
                let msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "unknown panic".to_string()
                };
                tracing::error!("start() panicked: {msg}");
                Err(MedcallError::Engine {
                    msg: format!("panic in start: {msg}"),
                })
            }
        }
    }

    pub fn rejoin(&self) -> Result<CallState, MedcallError> {
        Ok(self.rt.block_on(self.manager.rejoin())?.into())
    }

    pub fn retry(&self) -> Result<CallState, MedcallError> {
        Ok(self.rt.block_on(self.manager.retry())?.into())
    }

    pub fn leave(&self) {
        self.rt.block_on(self.manager.leave());
    }

    pub fn handle_back_press(&self) {
        self.rt.block_on(self.manager.handle_back_press());
    }

    pub fn acknowledge(&self) {
        self.rt.block_on(self.manager.acknowledge());
    }

    pub fn toggle_camera(&self) -> Result<bool, MedcallError> {
        Ok(self.rt.block_on(self.manager.toggle_camera())?)
    }

    pub fn toggle_mic(&self) -> Result<bool, MedcallError> {
        Ok(self.rt.block_on(self.manager.toggle_mic())?)
    }

    pub fn open_settings(&self) -> Result<(), MedcallError> {
        Ok(self.rt.block_on(self.manager.open_settings())?)
    }

    pub fn on_background(&self) {
        self.rt.block_on(self.manager.on_background());
    }

    pub fn on_foreground(&self) {
        self.rt.block_on(self.manager.on_foreground());
    }

    /// Forward a capture failure reported by the native camera layer.
    pub fn report_device_error(
        &self,
        kind: DeviceErrorKind,
        video_blocked: bool,
        audio_blocked: bool,
        message: String,
    ) {
        match self.engine.current() {
            Some(handle) => {
                handle.report_device_error(kind.into(), video_blocked, audio_blocked, message)
            }
            None => tracing::debug!("device error with no active engine: {message}"),
        }
    }

    /// Forward the native camera layer's first captured frame.
    pub fn report_capture_started(&self) {
        match self.engine.current() {
            Some(handle) => handle.report_capture_started(),
            None => tracing::debug!("capture started with no active engine"),
        }
    }

    pub fn state(&self) -> CallState {
        self.rt.block_on(self.manager.state()).into()
    }

    pub fn snapshot(&self) -> Option<CallSnapshot> {
        self.rt
            .block_on(self.manager.snapshot())
            .map(CallSnapshot::from)
    }

    pub fn add_listener(&self, listener: Box<dyn CallStateListener>) {
        self.manager.add_listener(Arc::new(BridgeListener {
            ffi_listener: Arc::from(listener),
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medcall_core::{CallSession, ParticipantRecord, RoomTarget, TileLayout, TrackState};

    fn record(id: &str, video: TrackState) -> ParticipantRecord {
        ParticipantRecord {
            participant_id: id.into(),
            display_name: id.into(),
            is_local: false,
            video_track: video,
            audio_track: TrackState::default(),
            last_updated: Default::default(),
        }
    }

    #[test]
    fn blocked_display_keeps_its_reason() {
        let display: TrackDisplay = CoreTrackDisplay::Blocked(CoreBlockedReason::Bandwidth).into();
        assert_eq!(
            display,
            TrackDisplay::Blocked {
                reason: BlockedReason::Bandwidth
            }
        );
    }

    #[test]
    fn session_error_carries_retryability() {
        let fatal: SessionError = CoreSessionError::new(CoreErrorKind::Fatal, "boom").into();
        assert_eq!(fatal.kind, ErrorKind::Fatal);
        assert!(fatal.retryable);

        let denied: SessionError =
            CoreSessionError::new(CoreErrorKind::PermissionDenied, "no").into();
        assert!(!denied.retryable);
    }

    #[test]
    fn call_errors_map_to_flat_variants() {
        let err: MedcallError =
            medcall_core::CallError::InvalidState(CoreCallState::Joining).into();
        assert!(matches!(err, MedcallError::InvalidState { .. }));

        let err: MedcallError = medcall_core::CallError::CameraUnavailable.into();
        assert!(matches!(err, MedcallError::CameraUnavailable { .. }));

        let err: MedcallError = medcall_core::CallError::MicrophoneUnavailable.into();
        assert!(matches!(err, MedcallError::MicrophoneUnavailable { .. }));

        let err: MedcallError = LiveKitError::InvalidUrl("bad".into()).into();
        assert!(matches!(err, MedcallError::Link { msg } if msg.contains("bad")));
    }

    struct BrokenPrompter;

    impl PermissionPrompter for BrokenPrompter {
        fn request_permission(&self, _: bool, _: bool) -> Result<PromptResponse, MedcallError> {
            Err(MedcallError::Runtime {
                msg: "activity detached".into(),
            })
        }

        fn check_permission(
            &self,
            camera: bool,
            _: bool,
        ) -> Result<Option<PromptResponse>, MedcallError> {
            Ok(camera.then_some(PromptResponse::Granted))
        }

        fn open_system_settings(&self) {}
    }

    #[tokio::test]
    async fn host_prompt_failure_is_a_platform_error() {
        use medcall_core::PermissionPlatform;

        let bridge = PromptBridge {
            prompter: Arc::new(BrokenPrompter),
        };
        let err = bridge
            .request_permission(Capabilities::CAMERA_AND_MICROPHONE)
            .await
            .unwrap_err();
        assert!(
            matches!(err, medcall_core::PermissionError::Platform(msg) if msg.contains("activity detached"))
        );

        let current = bridge
            .check_permission(Capabilities::CAMERA_AND_MICROPHONE)
            .await
            .unwrap();
        assert_eq!(current, Some(CorePromptResponse::Granted));
    }

    #[test]
    fn update_flattens_into_snapshot() {
        let session = CallSession::new(
            RoomTarget::new("wss://lk.example.com"),
            CoreCallMode::AudioVideo,
            CoreCallState::Joined,
        );
        let update = CoreCallUpdate {
            session: session.clone(),
            participants: vec![record("doctor", TrackState::default())],
            layout: TileLayout {
                tiles: Vec::new(),
                fullscreen: Some("doctor".into()),
            },
        };

        let snapshot = CallSnapshot::from(update);
        assert_eq!(snapshot.session_id, session.session_id);
        assert_eq!(snapshot.state, CallState::Joined);
        assert_eq!(snapshot.mode, CallMode::AudioVideo);
        assert_eq!(snapshot.attempt, session.attempt);
        assert!(snapshot.last_error.is_none());
        assert!(!snapshot.permission_requires_settings);
        assert_eq!(snapshot.participants.len(), 1);
        assert_eq!(snapshot.participants[0].video, TrackDisplay::Off);
        assert_eq!(snapshot.fullscreen_tile.as_deref(), Some("doctor"));
    }
}
