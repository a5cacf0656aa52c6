use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use tokio::sync::{Mutex, oneshot, watch};
use tokio::time::Instant;

use crate::config::SessionConfig;
use crate::controls::{MuteController, MuteIntent};
use crate::engine::{CallEngine, EngineEvent, EngineEvents, EngineHandle, JoinOptions, MeetingState};
use crate::errors::{CallError, ErrorKind, PermissionError, SessionError};
use crate::events::{CallStateListener, CallUpdate, EventEmitter};
use crate::lifecycle::{LifecycleGuard, SessionResources, TeardownReason};
use crate::participants::{MediaKind, ParticipantRecord, TileLayout, TrackReconciler};
use crate::permissions::{Capabilities, PermissionNegotiator, PermissionStatus};
use crate::platform::Navigator;
use crate::session::{CallMode, CallSession, RoomTarget};
use crate::state::{CallState, Trigger};

/// Cancellation flag for one call attempt. Checked after every suspension
/// point before shared state is touched.
#[derive(Debug, Default)]
struct AttemptToken {
    cancelled: AtomicBool,
}

impl AttemptToken {
    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
struct SessionCore {
    session: Option<CallSession>,
    reconciler: TrackReconciler,
    handle: Option<Arc<dyn EngineHandle>>,
    guard: Option<Arc<LifecycleGuard>>,
    attempt: Option<Arc<AttemptToken>>,
    backgrounded_at: Option<Instant>,
}

impl SessionCore {
    fn state(&self) -> CallState {
        self.session.as_ref().map_or(CallState::Idle, |s| s.state)
    }

    fn session_id(&self) -> Option<String> {
        self.session.as_ref().map(|s| s.session_id.clone())
    }

    fn current(&mut self, session_id: &str) -> Option<&mut CallSession> {
        self.session.as_mut().filter(|s| s.session_id == session_id)
    }

    fn current_state(&self, session_id: &str) -> Option<CallState> {
        self.session
            .as_ref()
            .filter(|s| s.session_id == session_id)
            .map(|s| s.state)
    }

    fn transition(&mut self, session_id: &str, trigger: Trigger) -> Option<CallState> {
        let session = self.current(session_id)?;
        let from = session.state;
        let Some(to) = from.on(trigger) else {
            tracing::debug!("session {session_id}: ignoring {trigger:?} in {from:?}");
            return None;
        };
        session.state = to;
        if to == CallState::Idle {
            session.ended_at = Some(Utc::now());
        }
        tracing::info!("session {session_id}: {from:?} -> {to:?} ({trigger:?})");
        Some(to)
    }

    fn update(&self) -> Option<CallUpdate> {
        self.session.clone().map(|session| CallUpdate {
            session,
            participants: self.reconciler.participants(),
            layout: self.reconciler.layout(),
        })
    }

    fn release(&mut self) {
        self.reconciler.clear();
        self.handle = None;
        self.attempt = None;
    }
}

struct Inner {
    engine: Arc<dyn CallEngine>,
    negotiator: PermissionNegotiator,
    navigator: Arc<dyn Navigator>,
    config: SessionConfig,
    emitter: EventEmitter,
    mute: MuteController,
    core: Mutex<SessionCore>,
    state_tx: watch::Sender<CallState>,
}

/// Owns the lifecycle of a single consultation call.
///
/// All UI entry points are safe to invoke from several triggers at once:
/// `start` is a no-op outside `Idle`, `leave` is idempotent, and teardown
/// runs through a one-shot [`LifecycleGuard`].
pub struct CallSessionManager {
    inner: Arc<Inner>,
}

impl CallSessionManager {
    pub fn new(
        engine: Arc<dyn CallEngine>,
        negotiator: PermissionNegotiator,
        navigator: Arc<dyn Navigator>,
        config: SessionConfig,
    ) -> Self {
        let (state_tx, _) = watch::channel(CallState::Idle);
        Self {
            inner: Arc::new(Inner {
                engine,
                negotiator,
                navigator,
                config,
                emitter: EventEmitter::new(),
                mute: MuteController::new(),
                core: Mutex::new(SessionCore::default()),
                state_tx,
            }),
        }
    }

    /// Register a listener for call updates.
    pub fn add_listener(&self, listener: Arc<dyn CallStateListener>) {
        self.inner.emitter.add_listener(listener);
    }

    /// Watch the lifecycle state.
    pub fn subscribe_state(&self) -> watch::Receiver<CallState> {
        self.inner.state_tx.subscribe()
    }

    pub async fn state(&self) -> CallState {
        self.inner.core.lock().await.state()
    }

    /// Current session, or the last one once it reached `Idle`.
    pub async fn session(&self) -> Option<CallSession> {
        self.inner.core.lock().await.session.clone()
    }

    pub async fn participants(&self) -> Vec<ParticipantRecord> {
        self.inner.core.lock().await.reconciler.participants()
    }

    pub async fn layout(&self) -> TileLayout {
        self.inner.core.lock().await.reconciler.layout()
    }

    /// Session, participants and layout read under one lock.
    pub async fn snapshot(&self) -> Option<CallUpdate> {
        self.inner.core.lock().await.update()
    }

    pub fn mute_intent(&self) -> MuteIntent {
        self.inner.mute.intent()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// Start a call. Returns the state reached once the attempt settles:
    /// `Joined`, or `Idle` if permission was declined.
    ///
    /// Ignored, returning the current state, unless the manager is `Idle`.
    pub async fn start(&self, target: RoomTarget, mode: CallMode) -> Result<CallState, CallError> {
        let (session_id, token) = {
            let mut core = self.inner.core.lock().await;
            let state = core.state();
            if state != CallState::Idle {
                tracing::debug!("start ignored, session already {state:?}");
                return Ok(state);
            }

            let permission_recorded = self.inner.config.skip_prompt_after_grant
                && self.inner.negotiator.has_recorded_grant();
            let Some(next) = state.on(Trigger::Start { permission_recorded }) else {
                return Ok(state);
            };

            let session = CallSession::new(target, mode, next);
            let session_id = session.session_id.clone();
            tracing::info!("session {session_id}: starting {mode:?} call, state {next:?}");
            let token = self.inner.begin_attempt(&mut core, session);
            self.inner.notify(&core);
            (session_id, token)
        };

        self.inner.run_attempt(&session_id, &token).await
    }

    /// Start again with the last session's target and mode.
    pub async fn rejoin(&self) -> Result<CallState, CallError> {
        let last = {
            let core = self.inner.core.lock().await;
            core.session
                .as_ref()
                .filter(|s| s.state == CallState::Idle)
                .map(|s| (s.room_target.clone(), s.mode))
        };
        match last {
            Some((target, mode)) => self.start(target, mode).await,
            None => Err(CallError::InvalidState(self.state().await)),
        }
    }

    /// Leave the call. Idempotent.
    pub async fn leave(&self) {
        self.inner.end(TeardownReason::UserLeft, None, None).await;
    }

    /// Hardware or gesture back navigation from the call screen.
    pub async fn handle_back_press(&self) {
        self.inner.end(TeardownReason::BackNavigation, None, None).await;
    }

    /// Retry after an error. Ignored unless the manager is in `Error`.
    pub async fn retry(&self) -> Result<CallState, CallError> {
        let (session_id, token, previous_guard) = {
            let mut core = self.inner.core.lock().await;
            let state = core.state();
            let Some(previous) = core.session.clone().filter(|_| state == CallState::Error) else {
                tracing::debug!("retry ignored in {state:?}");
                return Ok(state);
            };

            let permission_valid = self.inner.negotiator.has_recorded_grant()
                || previous
                    .permission
                    .as_ref()
                    .is_some_and(|o| o.can_proceed() && !o.was_dismissed());
            let Some(next) = state.on(Trigger::Retry { permission_valid }) else {
                return Ok(state);
            };

            let previous_guard = core.guard.clone();
            let session = previous.next_attempt(next);
            let session_id = session.session_id.clone();
            tracing::info!(
                "session {session_id}: retry attempt {} of {}, state {next:?}",
                session.attempt,
                previous.session_id
            );
            let token = self.inner.begin_attempt(&mut core, session);
            self.inner.notify(&core);
            (session_id, token, previous_guard)
        };

        if let Some(guard) = previous_guard {
            guard.released().await;
        }
        self.inner.run_attempt(&session_id, &token).await
    }

    /// Dismiss an error and leave the call screen.
    pub async fn acknowledge(&self) {
        let core = &mut *self.inner.core.lock().await;
        let Some(session_id) = core.session_id() else {
            return;
        };
        if core.transition(&session_id, Trigger::Acknowledge).is_some() {
            self.inner.notify(core);
            if let Some(guard) = &core.guard {
                guard.navigate_away();
            }
        }
    }

    pub async fn toggle_camera(&self) -> Result<bool, CallError> {
        let (handle, usable) = self.inner.joined_handle().await?;
        self.inner.mute.toggle_camera(handle.as_ref(), usable.camera).await
    }

    pub async fn toggle_mic(&self) -> Result<bool, CallError> {
        let (handle, usable) = self.inner.joined_handle().await?;
        self.inner.mute.toggle_mic(handle.as_ref(), usable.microphone).await
    }

    /// Route the user to system settings after an explicit denial.
    pub async fn open_settings(&self) -> Result<(), CallError> {
        self.inner.negotiator.open_settings().await?;
        Ok(())
    }

    pub async fn on_background(&self) {
        let mut core = self.inner.core.lock().await;
        core.backgrounded_at = Some(Instant::now());
        tracing::debug!("app backgrounded in {:?}", core.state());
    }

    /// Re-validate cached state after returning to foreground.
    pub async fn on_foreground(&self) {
        self.inner.on_foreground().await;
    }
}

impl Inner {
    fn notify(&self, core: &SessionCore) {
        let Some(update) = core.update() else {
            return;
        };
        self.state_tx.send_replace(update.session.state);
        self.emitter.emit(update);
    }

    fn begin_attempt(&self, core: &mut SessionCore, session: CallSession) -> Arc<AttemptToken> {
        let token = Arc::new(AttemptToken::default());
        core.session = Some(session);
        core.reconciler.clear();
        core.handle = None;
        core.guard = Some(Arc::new(LifecycleGuard::new(
            self.navigator.clone(),
            self.config.leave_timeout(),
        )));
        core.attempt = Some(token.clone());
        token
    }

    async fn run_attempt(
        self: &Arc<Self>,
        session_id: &str,
        token: &AttemptToken,
    ) -> Result<CallState, CallError> {
        let (state, mode) = {
            let mut core = self.core.lock().await;
            match core.current(session_id) {
                Some(session) => (session.state, session.mode),
                None => return Err(CallError::Cancelled),
            }
        };

        if state == CallState::RequestingPermission {
            if let Some(settled) = self.negotiate(session_id, token, mode).await? {
                return Ok(settled);
            }
        }
        self.create_and_join(session_id, token).await
    }

    /// Returns `Some(state)` when the attempt ends at the permission step.
    async fn negotiate(
        &self,
        session_id: &str,
        token: &AttemptToken,
        mode: CallMode,
    ) -> Result<Option<CallState>, CallError> {
        let result = self.negotiator.request_access(mode.capabilities()).await;
        if token.is_cancelled() {
            tracing::debug!("session {session_id}: permission resolved after cancellation");
            return Err(CallError::Cancelled);
        }

        let core = &mut *self.core.lock().await;
        if core.current(session_id).is_none() {
            return Err(CallError::Cancelled);
        }

        match result {
            Ok(outcome) => {
                let proceed = outcome.can_proceed();
                let trigger = match (outcome.status, outcome.fallback_mode) {
                    (PermissionStatus::Granted | PermissionStatus::Limited, _) => {
                        Trigger::PermissionGranted
                    }
                    (PermissionStatus::Denied, Some(_)) => Trigger::PermissionDegraded,
                    (PermissionStatus::Denied, None) => Trigger::PermissionDeclined,
                };

                if let Some(session) = core.current(session_id) {
                    if let Some(fallback) = outcome.fallback_mode {
                        tracing::info!("session {session_id}: continuing as {fallback:?}");
                        session.mode = fallback;
                    }
                    if !proceed {
                        let message = if outcome.requires_settings() {
                            "camera and microphone access denied, enable it in system settings"
                        } else {
                            "permission request dismissed"
                        };
                        session.last_error =
                            Some(SessionError::new(ErrorKind::PermissionDenied, message));
                    }
                    session.permission = Some(outcome);
                }

                core.transition(session_id, trigger);
                if !proceed {
                    core.release();
                }
                self.notify(core);
                Ok((!proceed).then_some(core.state()))
            }
            Err(PermissionError::Cancelled) => Err(CallError::Cancelled),
            Err(e) => {
                tracing::warn!("session {session_id}: permission platform failure: {e}");
                if let Some(session) = core.current(session_id) {
                    session.last_error =
                        Some(SessionError::new(ErrorKind::PermissionFailure, e.to_string()));
                }
                core.transition(session_id, Trigger::PermissionDeclined);
                core.release();
                self.notify(core);
                Err(e.into())
            }
        }
    }

    async fn create_and_join(
        self: &Arc<Self>,
        session_id: &str,
        token: &AttemptToken,
    ) -> Result<CallState, CallError> {
        let created = self.engine.create().await;
        if token.is_cancelled() {
            if let Ok((handle, _)) = &created {
                handle.destroy();
            }
            return Err(CallError::Cancelled);
        }

        let (handle, events) = match created {
            Ok(created) => created,
            Err(e) => {
                let message = e.to_string();
                self.fail(
                    session_id,
                    Trigger::CreationFailed,
                    SessionError::new(ErrorKind::Creation, message.clone()),
                )
                .await;
                return Err(CallError::Creation(message));
            }
        };

        let (unsubscribe, unsubscribed) = oneshot::channel();
        let (target, options, mut state_rx) = {
            let core = &mut *self.core.lock().await;
            let guard = match (core.current_state(session_id), core.guard.clone()) {
                (Some(CallState::Creating), Some(guard)) if !token.is_cancelled() => guard,
                _ => {
                    handle.destroy();
                    return Err(CallError::Cancelled);
                }
            };
            if let Err(resources) = guard.install(SessionResources {
                engine: handle.clone(),
                unsubscribe,
            }) {
                resources.engine.destroy();
                return Err(CallError::Cancelled);
            }
            core.handle = Some(handle.clone());

            let Some(session) = core.current(session_id) else {
                return Err(CallError::Cancelled);
            };
            let usable = session.usable_capabilities();
            let options = JoinOptions {
                start_video_off: !(usable.camera && self.config.camera_on_join),
                start_audio_off: !(usable.microphone && self.config.mic_on_join),
            };
            let target = session.room_target.clone();
            self.mute.reset(MuteIntent {
                camera_requested_on: !options.start_video_off,
                mic_requested_on: !options.start_audio_off,
            });

            core.transition(session_id, Trigger::EngineReady);
            self.notify(core);
            (target, options, self.state_tx.subscribe())
        };

        tokio::spawn(self.clone().event_loop(session_id.to_string(), events, unsubscribed));

        let join_timeout = self.config.join_timeout();
        let deadline = Instant::now() + join_timeout;
        tracing::info!("session {session_id}: joining with {options:?}");

        let join_error = match tokio::time::timeout_at(deadline, handle.join(&target, options)).await {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some(SessionError::new(ErrorKind::Join, e.to_string())),
            Err(_) => Some(SessionError::new(
                ErrorKind::JoinTimeout,
                format!("join did not complete within {join_timeout:?}"),
            )),
        };
        if let Some(error) = join_error {
            if token.is_cancelled() {
                return Err(CallError::Cancelled);
            }
            let result = match error.kind {
                ErrorKind::JoinTimeout => CallError::JoinTimeout(join_timeout),
                _ => CallError::Join(error.message.clone()),
            };
            self.fail(session_id, Trigger::FatalError, error).await;
            return Err(result);
        }

        let settled = tokio::time::timeout_at(deadline, async {
            state_rx
                .wait_for(|state| *state != CallState::Joining)
                .await
                .map(|state| *state)
        })
        .await;

        if token.is_cancelled() {
            return Err(CallError::Cancelled);
        }
        if settled.is_err() {
            self.fail(
                session_id,
                Trigger::FatalError,
                SessionError::new(
                    ErrorKind::JoinTimeout,
                    format!("no joined-meeting event within {join_timeout:?}"),
                ),
            )
            .await;
            return Err(CallError::JoinTimeout(join_timeout));
        }

        let core = self.core.lock().await;
        match core.session.as_ref().filter(|s| s.session_id == session_id) {
            Some(session) if session.state == CallState::Error => Err(CallError::Join(
                session
                    .last_error
                    .as_ref()
                    .map(|e| e.message.clone())
                    .unwrap_or_default(),
            )),
            Some(session) => Ok(session.state),
            None => Err(CallError::Cancelled),
        }
    }

    /// Transition into `Error` and release the session's resources.
    async fn fail(&self, session_id: &str, trigger: Trigger, error: SessionError) {
        let guard = {
            let core = &mut *self.core.lock().await;
            if core.transition(session_id, trigger).is_none() {
                tracing::debug!("session {session_id}: dropping {:?} error", error.kind);
                return;
            }
            tracing::warn!("session {session_id}: {:?}: {}", error.kind, error.message);
            if let Some(session) = core.current(session_id) {
                session.last_error = Some(error);
            }
            core.reconciler.clear();
            core.handle = None;
            self.notify(core);
            core.guard.clone()
        };

        if let Some(guard) = guard {
            guard.teardown(TeardownReason::FatalError).await;
        }
    }

    /// Leave through `Leaving` to `Idle`, tearing down exactly once.
    ///
    /// `only` restricts the call to a specific session, for engine-driven
    /// exits that must not affect a newer session.
    async fn end(&self, reason: TeardownReason, error: Option<SessionError>, only: Option<&str>) {
        let (session_id, guard) = {
            let core = &mut *self.core.lock().await;
            let Some(session_id) = core.session_id() else {
                if reason == TeardownReason::BackNavigation {
                    self.navigator.go_back();
                }
                return;
            };
            if only.is_some_and(|id| id != session_id) {
                return;
            }

            let state = core.state();
            match state {
                CallState::Idle | CallState::Leaving => {
                    tracing::debug!("{reason:?} ignored, session already {state:?}");
                    if reason == TeardownReason::BackNavigation {
                        if let Some(guard) = &core.guard {
                            guard.navigate_away();
                        }
                    }
                    return;
                }
                CallState::Error => {
                    core.transition(&session_id, Trigger::Acknowledge);
                    self.notify(core);
                    if reason.navigates_away() {
                        if let Some(guard) = &core.guard {
                            guard.navigate_away();
                        }
                    }
                    return;
                }
                _ => {}
            }

            if let Some(token) = &core.attempt {
                token.cancel();
            }
            core.transition(&session_id, Trigger::Leave);
            self.notify(core);
            (session_id, core.guard.clone())
        };

        if let Some(guard) = &guard {
            guard.teardown(reason).await;
        }

        let core = &mut *self.core.lock().await;
        if core.current_state(&session_id).is_none() {
            return;
        }
        core.release();
        if core.transition(&session_id, Trigger::LeftOrTimeout).is_some() {
            if let (Some(error), Some(session)) = (error, core.current(&session_id)) {
                session.last_error = Some(error);
            }
            self.notify(core);
        }
    }

    async fn joined_handle(&self) -> Result<(Arc<dyn EngineHandle>, Capabilities), CallError> {
        let core = self.core.lock().await;
        let state = core.state();
        match (&core.session, &core.handle) {
            (Some(session), Some(handle)) if state == CallState::Joined => {
                Ok((handle.clone(), session.usable_capabilities()))
            }
            _ => Err(CallError::InvalidState(state)),
        }
    }

    async fn on_foreground(&self) {
        let (session_id, state, stale, handle) = {
            let mut core = self.core.lock().await;
            let elapsed = core.backgrounded_at.take().map(|since| since.elapsed());
            let stale = elapsed.is_some_and(|e| e >= self.config.background_threshold());
            tracing::info!("app foregrounded after {elapsed:?} in {:?}", core.state());
            let Some(session_id) = core.session_id() else {
                return;
            };
            (session_id, core.state(), stale, core.handle.clone())
        };

        if stale {
            self.negotiator.invalidate();
        }

        match (state, handle) {
            (CallState::RequestingPermission, _) if stale => {
                tracing::info!("session {session_id}: permission flow went stale in background");
                self.end(TeardownReason::BackgroundTimeout, None, Some(&session_id))
                    .await;
            }
            (CallState::Joined, Some(handle)) => {
                let meeting = handle.meeting_state();
                if meeting != MeetingState::Joined {
                    tracing::warn!("session {session_id}: engine reports {meeting:?} after foreground");
                    let error = SessionError::new(
                        ErrorKind::ConnectionLost,
                        format!("call was disconnected while in background ({meeting:?})"),
                    );
                    self.end(TeardownReason::BackgroundTimeout, Some(error), Some(&session_id))
                        .await;
                } else {
                    let core = &mut *self.core.lock().await;
                    if core.current_state(&session_id) == Some(CallState::Joined)
                        && core.reconciler.replace_all(handle.participants(), Utc::now())
                    {
                        self.notify(core);
                    }
                }
            }
            (CallState::Joining, Some(handle)) => {
                let meeting = handle.meeting_state();
                if matches!(meeting, MeetingState::Left | MeetingState::Error) {
                    self.fail(
                        &session_id,
                        Trigger::FatalError,
                        SessionError::new(
                            ErrorKind::Join,
                            format!("engine reports {meeting:?} while joining"),
                        ),
                    )
                    .await;
                }
            }
            _ => {}
        }
    }

    async fn event_loop(
        self: Arc<Self>,
        session_id: String,
        mut events: EngineEvents,
        mut unsubscribed: oneshot::Receiver<()>,
    ) {
        loop {
            let event = tokio::select! {
                biased;
                _ = &mut unsubscribed => {
                    tracing::debug!("session {session_id}: unsubscribed from engine events");
                    break;
                }
                event = events.recv() => match event {
                    Some(event) => event,
                    None => {
                        tracing::debug!("session {session_id}: engine event stream closed");
                        break;
                    }
                },
            };
            self.handle_event(&session_id, event).await;
        }
        tracing::info!("session {session_id}: event loop ended");
    }

    async fn handle_event(&self, session_id: &str, event: EngineEvent) {
        match event {
            EngineEvent::JoinedMeeting => {
                let core = &mut *self.core.lock().await;
                if core.current_state(session_id) != Some(CallState::Joining) {
                    tracing::debug!("session {session_id}: joined-meeting ignored");
                    return;
                }
                if let Some(handle) = core.handle.clone() {
                    core.reconciler.replace_all(handle.participants(), Utc::now());
                }
                core.transition(session_id, Trigger::JoinedEvent);
                self.notify(core);
            }

            EngineEvent::LeftMeeting => {
                let state = self.core.lock().await.current_state(session_id);
                match state {
                    Some(CallState::Joined) => {
                        tracing::info!("session {session_id}: meeting ended by engine");
                        self.end(TeardownReason::RemoteEnded, None, Some(session_id))
                            .await;
                    }
                    Some(CallState::Joining) => {
                        self.fail(
                            session_id,
                            Trigger::FatalError,
                            SessionError::new(ErrorKind::Join, "left meeting before join completed"),
                        )
                        .await;
                    }
                    _ => tracing::debug!("session {session_id}: left-meeting ignored in {state:?}"),
                }
            }

            EngineEvent::Error { message } => {
                tracing::error!("session {session_id}: engine error: {message}");
                self.fail(
                    session_id,
                    Trigger::FatalError,
                    SessionError::new(ErrorKind::Fatal, message),
                )
                .await;
            }

            EngineEvent::CameraError {
                kind,
                video_blocked,
                audio_blocked,
                message,
            } => {
                tracing::warn!("session {session_id}: device error {kind:?}: {message}");
                let core = &mut *self.core.lock().await;
                if !core.current_state(session_id).is_some_and(CallState::is_active) {
                    return;
                }
                let reason = kind.blocked_reason();
                let now = Utc::now();
                let mut changed = false;
                if video_blocked {
                    changed |= core.reconciler.record_device_fault(MediaKind::Video, reason, now);
                }
                if audio_blocked {
                    changed |= core.reconciler.record_device_fault(MediaKind::Audio, reason, now);
                }
                if changed {
                    self.notify(core);
                }
            }

            EngineEvent::ParticipantJoined(_)
            | EngineEvent::ParticipantUpdated(_)
            | EngineEvent::ParticipantLeft { .. } => {
                let core = &mut *self.core.lock().await;
                if !core.current_state(session_id).is_some_and(CallState::is_active) {
                    return;
                }
                if core.reconciler.apply(&event, Utc::now()) {
                    self.notify(core);
                }
            }
        }
    }
}
