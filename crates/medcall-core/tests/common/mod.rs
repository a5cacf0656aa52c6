#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Notify, mpsc, watch};

use medcall_core::{
    CallEngine, CallMode, CallSessionManager, CallStateListener, CallUpdate, Capabilities,
    EngineError, EngineEvent, EngineEvents, EngineHandle, FixedFallback, JoinOptions,
    MemoryDecisionStore, MeetingState, Navigator, ParticipantSnapshot, ParticipantTracks,
    PermissionError, PermissionNegotiator, PermissionPlatform, PromptResponse, RoomTarget,
    SessionConfig, TrackSnapshot, TrackStatus,
};

pub const LOCAL_ID: &str = "local";
pub const USER_ID: &str = "patient-1";

pub fn target() -> RoomTarget {
    RoomTarget::new("wss://media.example.test/consult-42").with_token("token")
}

pub fn track(status: TrackStatus, live: bool) -> TrackSnapshot {
    TrackSnapshot {
        status,
        live,
        ..TrackSnapshot::default()
    }
}

pub fn remote(id: &str, video: TrackSnapshot) -> ParticipantSnapshot {
    ParticipantSnapshot {
        id: id.to_string(),
        user_name: format!("Dr. {id}"),
        local: false,
        video: video.status != TrackStatus::Off,
        audio: true,
        tracks: ParticipantTracks {
            video,
            audio: track(TrackStatus::Playable, true),
            ..ParticipantTracks::default()
        },
    }
}

#[derive(Debug, Clone)]
pub enum JoinBehavior {
    /// Report the local participant and emit joined-meeting.
    Immediate,
    /// Like `Immediate`, but the local camera is attached and not yet live
    /// until the test reports its first frame.
    CameraWarmingUp,
    /// Accept the join and never report joined-meeting.
    Silent,
    Fail(String),
}

struct HandleState {
    meeting: MeetingState,
    participants: HashMap<String, ParticipantSnapshot>,
}

/// Scriptable engine instance. Commands are idempotent and, when `ack` is
/// set, reflected in the local participant and echoed as an update event.
pub struct FakeHandle {
    events: mpsc::UnboundedSender<EngineEvent>,
    state: Mutex<HandleState>,
    behavior: JoinBehavior,
    ack: bool,
    leave_delay: Option<Duration>,
    pub joins: AtomicUsize,
    pub leaves: AtomicUsize,
    pub destroys: AtomicUsize,
    pub video_commands: Mutex<Vec<bool>>,
    pub audio_commands: Mutex<Vec<bool>>,
    pub last_options: Mutex<Option<JoinOptions>>,
}

impl FakeHandle {
    pub fn push(&self, event: EngineEvent) {
        let _ = self.events.send(event);
    }

    pub fn set_meeting_state(&self, meeting: MeetingState) {
        self.state.lock().unwrap().meeting = meeting;
    }

    /// Update the engine's participant table and emit the matching event.
    pub fn upsert(&self, snapshot: ParticipantSnapshot) {
        let known = self
            .state
            .lock()
            .unwrap()
            .participants
            .insert(snapshot.id.clone(), snapshot.clone())
            .is_some();
        if known {
            self.push(EngineEvent::ParticipantUpdated(snapshot));
        } else {
            self.push(EngineEvent::ParticipantJoined(snapshot));
        }
    }

    pub fn remove(&self, id: &str) {
        self.state.lock().unwrap().participants.remove(id);
        self.push(EngineEvent::ParticipantLeft { id: id.to_string() });
    }

    /// Change engine truth without emitting anything, as if events were
    /// lost while the app was suspended.
    pub fn replace_silently(&self, snapshots: Vec<ParticipantSnapshot>) {
        let mut state = self.state.lock().unwrap();
        state.participants = snapshots.into_iter().map(|s| (s.id.clone(), s)).collect();
    }

    pub fn local(&self) -> Option<ParticipantSnapshot> {
        self.state.lock().unwrap().participants.get(LOCAL_ID).cloned()
    }

    fn update_local(&self, apply: impl FnOnce(&mut ParticipantSnapshot)) {
        let snapshot = {
            let mut state = self.state.lock().unwrap();
            let Some(local) = state.participants.get_mut(LOCAL_ID) else {
                return;
            };
            apply(local);
            local.clone()
        };
        self.push(EngineEvent::ParticipantUpdated(snapshot));
    }

    /// Local camera delivers frames: emit the live snapshot.
    pub fn camera_started(&self) {
        self.update_local(|local| {
            if local.video {
                local.tracks.video = track(TrackStatus::Sendable, true);
            }
        });
    }

    fn local_snapshot(options: JoinOptions, camera_live: bool) -> ParticipantSnapshot {
        let media = |on: bool, live: bool| {
            if on {
                track(TrackStatus::Sendable, live)
            } else {
                TrackSnapshot {
                    off: Some(medcall_core::OffReason::User),
                    ..TrackSnapshot::default()
                }
            }
        };
        ParticipantSnapshot {
            id: LOCAL_ID.to_string(),
            user_name: "Patient".to_string(),
            local: true,
            video: !options.start_video_off,
            audio: !options.start_audio_off,
            tracks: ParticipantTracks {
                video: media(!options.start_video_off, camera_live),
                audio: media(!options.start_audio_off, true),
                ..ParticipantTracks::default()
            },
        }
    }
}

#[async_trait]
impl EngineHandle for FakeHandle {
    async fn join(&self, _target: &RoomTarget, options: JoinOptions) -> Result<(), EngineError> {
        self.joins.fetch_add(1, Ordering::SeqCst);
        *self.last_options.lock().unwrap() = Some(options);
        self.set_meeting_state(MeetingState::Joining);
        match &self.behavior {
            JoinBehavior::Immediate | JoinBehavior::CameraWarmingUp => {
                let camera_live = matches!(self.behavior, JoinBehavior::Immediate);
                {
                    let mut state = self.state.lock().unwrap();
                    state.participants.insert(
                        LOCAL_ID.to_string(),
                        Self::local_snapshot(options, camera_live),
                    );
                    state.meeting = MeetingState::Joined;
                }
                self.push(EngineEvent::JoinedMeeting);
                Ok(())
            }
            JoinBehavior::Silent => Ok(()),
            JoinBehavior::Fail(message) => {
                self.set_meeting_state(MeetingState::Error);
                Err(EngineError::Join(message.clone()))
            }
        }
    }

    async fn leave(&self) -> Result<(), EngineError> {
        self.leaves.fetch_add(1, Ordering::SeqCst);
        match self.leave_delay {
            Some(delay) => tokio::time::sleep(delay).await,
            None => tokio::task::yield_now().await,
        }
        self.set_meeting_state(MeetingState::Left);
        Ok(())
    }

    fn destroy(&self) {
        self.destroys.fetch_add(1, Ordering::SeqCst);
    }

    async fn set_local_video(&self, on: bool) -> Result<(), EngineError> {
        self.video_commands.lock().unwrap().push(on);
        if self.ack {
            self.update_local(|local| {
                if local.video != on {
                    local.video = on;
                    local.tracks.video = if on {
                        track(TrackStatus::Sendable, true)
                    } else {
                        TrackSnapshot {
                            off: Some(medcall_core::OffReason::User),
                            ..TrackSnapshot::default()
                        }
                    };
                }
            });
        }
        Ok(())
    }

    async fn set_local_audio(&self, on: bool) -> Result<(), EngineError> {
        self.audio_commands.lock().unwrap().push(on);
        if self.ack {
            self.update_local(|local| local.audio = on);
        }
        Ok(())
    }

    fn participants(&self) -> HashMap<String, ParticipantSnapshot> {
        self.state.lock().unwrap().participants.clone()
    }

    fn meeting_state(&self) -> MeetingState {
        self.state.lock().unwrap().meeting
    }
}

/// Engine factory that hands out [`FakeHandle`]s and remembers them.
pub struct FakeEngine {
    pub creates: AtomicUsize,
    handles: Mutex<Vec<Arc<FakeHandle>>>,
    behavior: Mutex<JoinBehavior>,
    create_failures: AtomicUsize,
    ack: bool,
    leave_delay: Option<Duration>,
}

impl FakeEngine {
    pub fn new(behavior: JoinBehavior) -> Self {
        Self {
            creates: AtomicUsize::new(0),
            handles: Mutex::new(Vec::new()),
            behavior: Mutex::new(behavior),
            create_failures: AtomicUsize::new(0),
            ack: true,
            leave_delay: None,
        }
    }

    pub fn without_ack(mut self) -> Self {
        self.ack = false;
        self
    }

    pub fn with_leave_delay(mut self, delay: Duration) -> Self {
        self.leave_delay = Some(delay);
        self
    }

    /// Fail the next `n` create calls.
    pub fn fail_creates(&self, n: usize) {
        self.create_failures.store(n, Ordering::SeqCst);
    }

    pub fn set_behavior(&self, behavior: JoinBehavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    pub fn handles(&self) -> Vec<Arc<FakeHandle>> {
        self.handles.lock().unwrap().clone()
    }

    pub fn last(&self) -> Arc<FakeHandle> {
        self.handles().last().cloned().expect("no engine handle created")
    }

    pub fn total_leaves(&self) -> usize {
        self.handles().iter().map(|h| h.leaves.load(Ordering::SeqCst)).sum()
    }

    pub fn total_destroys(&self) -> usize {
        self.handles().iter().map(|h| h.destroys.load(Ordering::SeqCst)).sum()
    }
}

#[async_trait]
impl CallEngine for FakeEngine {
    async fn create(&self) -> Result<(Arc<dyn EngineHandle>, EngineEvents), EngineError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .create_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(EngineError::Create("media engine unavailable".into()));
        }

        let (events, rx) = mpsc::unbounded_channel();
        let handle = Arc::new(FakeHandle {
            events,
            state: Mutex::new(HandleState {
                meeting: MeetingState::New,
                participants: HashMap::new(),
            }),
            behavior: self.behavior.lock().unwrap().clone(),
            ack: self.ack,
            leave_delay: self.leave_delay,
            joins: AtomicUsize::new(0),
            leaves: AtomicUsize::new(0),
            destroys: AtomicUsize::new(0),
            video_commands: Mutex::new(Vec::new()),
            audio_commands: Mutex::new(Vec::new()),
            last_options: Mutex::new(None),
        });
        self.handles.lock().unwrap().push(handle.clone());
        Ok((handle, rx))
    }
}

/// Permission dialog answering from a queue, repeating the last answer.
pub struct FakePlatform {
    responses: Mutex<VecDeque<PromptResponse>>,
    last: Mutex<PromptResponse>,
    current: Mutex<Option<PromptResponse>>,
    gate: Option<Arc<Notify>>,
    pub prompts: AtomicUsize,
    pub checks: AtomicUsize,
    pub settings_opened: AtomicUsize,
}

impl FakePlatform {
    pub fn answering(responses: impl IntoIterator<Item = PromptResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            last: Mutex::new(PromptResponse::Granted),
            current: Mutex::new(None),
            gate: None,
            prompts: AtomicUsize::new(0),
            checks: AtomicUsize::new(0),
            settings_opened: AtomicUsize::new(0),
        }
    }

    /// Hold every dialog open until the gate is notified.
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// What a status check reports, as if the user changed system settings.
    pub fn set_current(&self, current: Option<PromptResponse>) {
        *self.current.lock().unwrap() = current;
    }

    pub fn prompts(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PermissionPlatform for FakePlatform {
    async fn request_permission(
        &self,
        _capabilities: Capabilities,
    ) -> Result<PromptResponse, PermissionError> {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        let next = self.responses.lock().unwrap().pop_front();
        let mut last = self.last.lock().unwrap();
        if let Some(next) = next {
            *last = next;
        }
        Ok(*last)
    }

    async fn check_permission(
        &self,
        _capabilities: Capabilities,
    ) -> Result<Option<PromptResponse>, PermissionError> {
        self.checks.fetch_add(1, Ordering::SeqCst);
        Ok(*self.current.lock().unwrap())
    }

    async fn open_system_settings(&self) -> Result<(), PermissionError> {
        self.settings_opened.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    go_backs: AtomicUsize,
}

impl RecordingNavigator {
    pub fn go_backs(&self) -> usize {
        self.go_backs.load(Ordering::SeqCst)
    }
}

impl Navigator for RecordingNavigator {
    fn go_back(&self) {
        self.go_backs.fetch_add(1, Ordering::SeqCst);
    }
}

/// Records every update and lets tests wait for a condition on the latest.
pub struct Capture {
    updates: Mutex<Vec<CallUpdate>>,
    seen: watch::Sender<usize>,
}

impl Capture {
    pub fn new() -> Self {
        let (seen, _) = watch::channel(0);
        Self {
            updates: Mutex::new(Vec::new()),
            seen,
        }
    }

    pub fn all(&self) -> Vec<CallUpdate> {
        self.updates.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<CallUpdate> {
        self.updates.lock().unwrap().last().cloned()
    }

    pub async fn wait_until(&self, predicate: impl Fn(&CallUpdate) -> bool) -> CallUpdate {
        let mut rx = self.seen.subscribe();
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                if let Some(update) = self.last().filter(|u| predicate(u)) {
                    return update;
                }
                rx.changed().await.unwrap();
            }
        })
        .await
        .expect("condition not reached")
    }
}

impl CallStateListener for Capture {
    fn on_state_change(&self, update: CallUpdate) {
        self.updates.lock().unwrap().push(update);
        self.seen.send_modify(|n| *n += 1);
    }
}

pub struct Harness {
    pub manager: Arc<CallSessionManager>,
    pub engine: Arc<FakeEngine>,
    pub platform: Arc<FakePlatform>,
    pub navigator: Arc<RecordingNavigator>,
    pub decisions: Arc<MemoryDecisionStore>,
    pub negotiator: PermissionNegotiator,
    pub updates: Arc<Capture>,
}

pub struct HarnessBuilder {
    engine: FakeEngine,
    platform: FakePlatform,
    fallback: Option<CallMode>,
    config: SessionConfig,
}

impl HarnessBuilder {
    pub fn engine(mut self, engine: FakeEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn platform(mut self, platform: FakePlatform) -> Self {
        self.platform = platform;
        self
    }

    pub fn fallback(mut self, fallback: Option<CallMode>) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Harness {
        let engine = Arc::new(self.engine);
        let platform = Arc::new(self.platform);
        let navigator = Arc::new(RecordingNavigator::default());
        let decisions = Arc::new(MemoryDecisionStore::new());
        let negotiator = PermissionNegotiator::new(
            platform.clone(),
            decisions.clone(),
            Arc::new(FixedFallback(self.fallback)),
            USER_ID,
            self.config.limited_grant_capabilities,
        );
        let manager = Arc::new(CallSessionManager::new(
            engine.clone(),
            negotiator.clone(),
            navigator.clone(),
            self.config,
        ));
        let updates = Arc::new(Capture::new());
        manager.add_listener(updates.clone());
        Harness {
            manager,
            engine,
            platform,
            navigator,
            decisions,
            negotiator,
            updates,
        }
    }
}

impl Harness {
    pub fn builder() -> HarnessBuilder {
        HarnessBuilder {
            engine: FakeEngine::new(JoinBehavior::Immediate),
            platform: FakePlatform::answering([PromptResponse::Granted]),
            fallback: None,
            config: SessionConfig::default(),
        }
    }

    pub fn new() -> Self {
        Self::builder().build()
    }

    pub async fn join(&self) {
        let state = self
            .manager
            .start(target(), CallMode::AudioVideo)
            .await
            .expect("join failed");
        assert_eq!(state, medcall_core::CallState::Joined);
    }
}
