use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use async_trait::async_trait;
use livekit::options::TrackPublishOptions;
use livekit::prelude::*;
use livekit::track::{StreamState, TrackSource as LkTrackSource};
use livekit::webrtc::audio_source::native::NativeAudioSource;
use livekit::webrtc::media_stream_track::RtcTrackState;
use livekit::webrtc::prelude::*;
use livekit::webrtc::video_source::native::NativeVideoSource;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use medcall_core::{
    BlockedReason, CallEngine, DeviceErrorKind, EngineError, EngineEvent, EngineEvents, EngineHandle,
    JoinOptions, MeetingState, OffReason, ParticipantSnapshot, ParticipantTracks, RoomTarget,
    TrackSnapshot, TrackStatus,
};

use crate::errors::LiveKitError;

const AUDIO_SAMPLE_RATE: u32 = 48_000;
const AUDIO_CHANNELS: u32 = 1;
const AUDIO_QUEUE_SIZE_MS: u32 = 100;

const VIDEO_WIDTH: u32 = 1280;
const VIDEO_HEIGHT: u32 = 720;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Creates one [`LiveKitHandle`] per call attempt.
#[derive(Default)]
pub struct LiveKitEngine {
    current: Mutex<Weak<LiveKitHandle>>,
}

impl LiveKitEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle of the most recent attempt, while it is alive.
    ///
    /// Native capture code uses it to reach the media sources and to report
    /// device failures.
    pub fn current(&self) -> Option<Arc<LiveKitHandle>> {
        lock(&self.current).upgrade()
    }
}

#[async_trait]
impl CallEngine for LiveKitEngine {
    async fn create(&self) -> Result<(Arc<dyn EngineHandle>, EngineEvents), EngineError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = Arc::new(LiveKitHandle::new(tx));
        *lock(&self.current) = Arc::downgrade(&handle);
        tracing::info!("livekit engine handle created");
        Ok((handle, rx))
    }
}

/// Track facts the LiveKit publications do not carry themselves.
#[derive(Default)]
struct TrackFlags {
    /// The native capture layer has delivered a camera frame since the
    /// camera was last published or unmuted.
    camera_live: AtomicBool,
    /// Remote publication sids whose subscription failed.
    failed: Mutex<HashSet<String>>,
    /// Remote publication sids paused by the server for bandwidth.
    paused: Mutex<HashSet<String>>,
}

impl TrackFlags {
    fn camera_live(&self) -> bool {
        self.camera_live.load(Ordering::SeqCst)
    }

    fn set_camera_live(&self, live: bool) {
        self.camera_live.store(live, Ordering::SeqCst);
    }

    fn mark(set: &Mutex<HashSet<String>>, sid: String, on: bool) {
        let mut set = lock(set);
        if on {
            set.insert(sid);
        } else {
            set.remove(&sid);
        }
    }
}

/// [`EngineHandle`] backed by a LiveKit [`Room`].
///
/// The room is connected on `join`. Room events are translated into
/// [`EngineEvent`]s by a forwarding task until the room disconnects or the
/// handle is destroyed.
pub struct LiveKitHandle {
    room: Mutex<Option<Arc<Room>>>,
    events: Mutex<Option<mpsc::UnboundedSender<EngineEvent>>>,
    meeting: Arc<Mutex<MeetingState>>,
    flags: Arc<TrackFlags>,
    forwarder: Mutex<Option<JoinHandle<()>>>,
    audio_source: Mutex<Option<NativeAudioSource>>,
    video_source: Mutex<Option<NativeVideoSource>>,
}

impl LiveKitHandle {
    fn new(events: mpsc::UnboundedSender<EngineEvent>) -> Self {
        Self {
            room: Mutex::new(None),
            events: Mutex::new(Some(events)),
            meeting: Arc::new(Mutex::new(MeetingState::New)),
            flags: Arc::new(TrackFlags::default()),
            forwarder: Mutex::new(None),
            audio_source: Mutex::new(None),
            video_source: Mutex::new(None),
        }
    }

    fn room(&self) -> Option<Arc<Room>> {
        lock(&self.room).clone()
    }

    fn set_meeting(&self, state: MeetingState) {
        *lock(&self.meeting) = state;
    }

    fn send(&self, event: EngineEvent) {
        if let Some(events) = lock(&self.events).as_ref() {
            let _ = events.send(event);
        }
    }

    /// Audio source for feeding PCM frames from native capture.
    pub fn audio_source(&self) -> Option<NativeAudioSource> {
        lock(&self.audio_source).clone()
    }

    /// Video source for feeding frames from native capture.
    pub fn video_source(&self) -> Option<NativeVideoSource> {
        lock(&self.video_source).clone()
    }

    /// Report a capture device failure observed by the native layer.
    pub fn report_device_error(
        &self,
        kind: DeviceErrorKind,
        video_blocked: bool,
        audio_blocked: bool,
        message: impl Into<String>,
    ) {
        let message = message.into();
        tracing::warn!("device error {kind:?}: {message}");
        self.send(EngineEvent::CameraError {
            kind,
            video_blocked,
            audio_blocked,
            message,
        });
    }

    /// Report that native capture delivered its first camera frame. Until
    /// then the local camera is attached but not live.
    pub fn report_capture_started(&self) {
        if self.flags.camera_live() {
            return;
        }
        self.flags.set_camera_live(true);
        tracing::info!("local camera capture started");
        if let Some(room) = self.room() {
            self.send(EngineEvent::ParticipantUpdated(local_snapshot(
                &room.local_participant(),
                &self.flags,
            )));
        }
    }

    async fn publish_microphone(&self, room: &Room) -> Result<(), LiveKitError> {
        let source = NativeAudioSource::new(
            AudioSourceOptions {
                echo_cancellation: true,
                noise_suppression: true,
                auto_gain_control: true,
            },
            AUDIO_SAMPLE_RATE,
            AUDIO_CHANNELS,
            AUDIO_QUEUE_SIZE_MS,
        );
        let track = LocalAudioTrack::create_audio_track(
            "microphone",
            RtcAudioSource::Native(source.clone()),
        );

        room.local_participant()
            .publish_track(
                LocalTrack::Audio(track),
                TrackPublishOptions {
                    source: LkTrackSource::Microphone,
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| LiveKitError::Room(format!("publish audio: {e}")))?;

        *lock(&self.audio_source) = Some(source);
        tracing::info!("microphone track published");
        Ok(())
    }

    async fn publish_camera(&self, room: &Room) -> Result<(), LiveKitError> {
        let source = NativeVideoSource::new(
            VideoResolution {
                width: VIDEO_WIDTH,
                height: VIDEO_HEIGHT,
            },
            false,
        );
        self.flags.set_camera_live(false);
        let track = LocalVideoTrack::create_video_track(
            "camera",
            RtcVideoSource::Native(source.clone()),
        );

        room.local_participant()
            .publish_track(
                LocalTrack::Video(track),
                TrackPublishOptions {
                    source: LkTrackSource::Camera,
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| LiveKitError::Room(format!("publish video: {e}")))?;

        *lock(&self.video_source) = Some(source);
        tracing::info!("camera track published");
        Ok(())
    }

    /// Mute, unmute or first-publish the local track for `source`.
    async fn set_local(&self, source: LkTrackSource, on: bool) -> Result<(), EngineError> {
        let room = self.room().ok_or(EngineError::Closed)?;
        let local = room.local_participant();
        let publication = local
            .track_publications()
            .into_values()
            .find(|p| p.source() == source);

        match (publication, on) {
            (Some(publication), true) if publication.is_muted() => {
                if source == LkTrackSource::Camera {
                    self.flags.set_camera_live(false);
                }
                publication.unmute()
            }
            (Some(publication), false) if !publication.is_muted() => publication.mute(),
            (Some(_), _) => tracing::debug!("{source:?} already {}", if on { "on" } else { "off" }),
            (None, true) => match source {
                LkTrackSource::Camera => self.publish_camera(&room).await?,
                _ => self.publish_microphone(&room).await?,
            },
            (None, false) => {}
        }

        self.send(EngineEvent::ParticipantUpdated(local_snapshot(
            &room.local_participant(),
            &self.flags,
        )));
        Ok(())
    }
}

#[async_trait]
impl EngineHandle for LiveKitHandle {
    async fn join(&self, target: &RoomTarget, options: JoinOptions) -> Result<(), EngineError> {
        let token = target
            .token
            .as_deref()
            .ok_or_else(|| EngineError::Join("room target has no access token".into()))?;

        self.set_meeting(MeetingState::Joining);

        let mut room_options = RoomOptions::default();
        room_options.auto_subscribe = true;

        let (room, room_events) = match Room::connect(&target.url, token, room_options).await {
            Ok(connected) => connected,
            Err(e) => {
                self.set_meeting(MeetingState::Error);
                return Err(EngineError::Join(e.to_string()));
            }
        };
        let room = Arc::new(room);
        *lock(&self.room) = Some(room.clone());

        if !options.start_audio_off {
            self.publish_microphone(&room).await?;
        }
        if !options.start_video_off {
            self.publish_camera(&room).await?;
        }

        let Some(events) = lock(&self.events).clone() else {
            return Err(EngineError::Closed);
        };

        self.set_meeting(MeetingState::Joined);
        let _ = events.send(EngineEvent::ParticipantJoined(local_snapshot(
            &room.local_participant(),
            &self.flags,
        )));
        for participant in room.remote_participants().values() {
            let _ = events.send(EngineEvent::ParticipantJoined(remote_snapshot(
                participant,
                &self.flags,
            )));
        }
        let _ = events.send(EngineEvent::JoinedMeeting);

        let forwarder = tokio::spawn(forward_events(
            room,
            room_events,
            events,
            self.meeting.clone(),
            self.flags.clone(),
        ));
        *lock(&self.forwarder) = Some(forwarder);
        Ok(())
    }

    async fn leave(&self) -> Result<(), EngineError> {
        if let Some(room) = self.room() {
            room.close()
                .await
                .map_err(|e| EngineError::Leave(e.to_string()))?;
        }
        self.set_meeting(MeetingState::Left);
        Ok(())
    }

    fn destroy(&self) {
        if let Some(forwarder) = lock(&self.forwarder).take() {
            forwarder.abort();
        }
        lock(&self.room).take();
        lock(&self.events).take();
        lock(&self.audio_source).take();
        lock(&self.video_source).take();

        let mut meeting = lock(&self.meeting);
        if matches!(*meeting, MeetingState::Joining | MeetingState::Joined) {
            *meeting = MeetingState::Left;
        }
        tracing::info!("livekit engine handle destroyed");
    }

    async fn set_local_video(&self, on: bool) -> Result<(), EngineError> {
        self.set_local(LkTrackSource::Camera, on).await
    }

    async fn set_local_audio(&self, on: bool) -> Result<(), EngineError> {
        self.set_local(LkTrackSource::Microphone, on).await
    }

    fn participants(&self) -> HashMap<String, ParticipantSnapshot> {
        let Some(room) = self.room() else {
            return HashMap::new();
        };
        let mut all: HashMap<String, ParticipantSnapshot> = room
            .remote_participants()
            .values()
            .map(|p| {
                let snapshot = remote_snapshot(p, &self.flags);
                (snapshot.id.clone(), snapshot)
            })
            .collect();
        let local = local_snapshot(&room.local_participant(), &self.flags);
        all.insert(local.id.clone(), local);
        all
    }

    fn meeting_state(&self) -> MeetingState {
        *lock(&self.meeting)
    }
}

async fn forward_events(
    room: Arc<Room>,
    mut room_events: mpsc::UnboundedReceiver<RoomEvent>,
    events: mpsc::UnboundedSender<EngineEvent>,
    meeting: Arc<Mutex<MeetingState>>,
    flags: Arc<TrackFlags>,
) {
    while let Some(event) = room_events.recv().await {
        let mapped = match event {
            RoomEvent::ParticipantConnected(participant) => {
                vec![EngineEvent::ParticipantJoined(remote_snapshot(&participant, &flags))]
            }

            RoomEvent::ParticipantDisconnected(participant) => {
                vec![EngineEvent::ParticipantLeft {
                    id: participant.sid().to_string(),
                }]
            }

            RoomEvent::TrackSubscribed {
                participant,
                publication,
                ..
            } => {
                TrackFlags::mark(&flags.failed, publication.sid().to_string(), false);
                vec![EngineEvent::ParticipantUpdated(remote_snapshot(&participant, &flags))]
            }

            RoomEvent::TrackUnpublished {
                participant,
                publication,
            } => {
                let sid = publication.sid().to_string();
                TrackFlags::mark(&flags.failed, sid.clone(), false);
                TrackFlags::mark(&flags.paused, sid, false);
                vec![EngineEvent::ParticipantUpdated(remote_snapshot(&participant, &flags))]
            }

            RoomEvent::TrackUnsubscribed { participant, .. }
            | RoomEvent::TrackPublished { participant, .. } => {
                vec![EngineEvent::ParticipantUpdated(remote_snapshot(&participant, &flags))]
            }

            RoomEvent::TrackSubscriptionFailed {
                participant,
                error,
                track_sid,
            } => {
                tracing::warn!("subscription to {track_sid} failed: {error}");
                TrackFlags::mark(&flags.failed, track_sid.to_string(), true);
                vec![EngineEvent::ParticipantUpdated(remote_snapshot(&participant, &flags))]
            }

            RoomEvent::TrackStreamStateChanged {
                participant,
                publication,
                stream_state,
            } => {
                let paused = matches!(stream_state, StreamState::Paused);
                tracing::debug!("stream {} paused={paused}", publication.sid());
                TrackFlags::mark(&flags.paused, publication.sid().to_string(), paused);
                vec![EngineEvent::ParticipantUpdated(remote_snapshot(&participant, &flags))]
            }

            RoomEvent::TrackMuted { participant, .. } | RoomEvent::TrackUnmuted { participant, .. } => {
                let snapshot = match &participant {
                    Participant::Local(local) => local_snapshot(local, &flags),
                    Participant::Remote(remote) => remote_snapshot(remote, &flags),
                };
                vec![EngineEvent::ParticipantUpdated(snapshot)]
            }

            RoomEvent::LocalTrackPublished { .. } | RoomEvent::LocalTrackUnpublished { .. } => {
                vec![EngineEvent::ParticipantUpdated(local_snapshot(
                    &room.local_participant(),
                    &flags,
                ))]
            }

            RoomEvent::Reconnecting => {
                tracing::info!("room reconnecting");
                Vec::new()
            }

            RoomEvent::Reconnected => {
                tracing::info!("room reconnected, resending participant state");
                room.remote_participants()
                    .values()
                    .map(|p| EngineEvent::ParticipantUpdated(remote_snapshot(p, &flags)))
                    .chain(std::iter::once(EngineEvent::ParticipantUpdated(
                        local_snapshot(&room.local_participant(), &flags),
                    )))
                    .collect()
            }

            RoomEvent::Disconnected { reason } => {
                tracing::info!("room disconnected: {reason:?}");
                *lock(&meeting) = MeetingState::Left;
                let _ = events.send(EngineEvent::LeftMeeting);
                break;
            }

            other => {
                tracing::debug!("unhandled room event: {other:?}");
                Vec::new()
            }
        };

        for event in mapped {
            if events.send(event).is_err() {
                tracing::debug!("engine event receiver dropped, stopping forwarder");
                return;
            }
        }
    }

    tracing::info!("room event forwarder ended");
}

/// What the adapter knows about one published track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Publication {
    Muted,
    SubscriptionFailed,
    /// Server paused the stream to save bandwidth.
    Paused,
    /// Published but no media track attached yet.
    Pending,
    /// Media track attached; `live` once frames can flow.
    Attached { live: bool },
}

/// Map one publication to the engine-side track snapshot.
fn track_snapshot(publication: Option<Publication>, local: bool) -> TrackSnapshot {
    let Some(publication) = publication else {
        return TrackSnapshot::default();
    };
    match publication {
        Publication::Muted => TrackSnapshot {
            status: TrackStatus::Off,
            off: Some(OffReason::User),
            ..TrackSnapshot::default()
        },
        Publication::SubscriptionFailed => TrackSnapshot {
            status: TrackStatus::Blocked,
            blocked: Some(BlockedReason::DeviceMissing),
            ..TrackSnapshot::default()
        },
        Publication::Paused => TrackSnapshot {
            status: TrackStatus::Off,
            off: Some(OffReason::Bandwidth),
            ..TrackSnapshot::default()
        },
        Publication::Pending => TrackSnapshot {
            status: TrackStatus::Loading,
            ..TrackSnapshot::default()
        },
        Publication::Attached { live } => TrackSnapshot {
            status: if local {
                TrackStatus::Sendable
            } else {
                TrackStatus::Playable
            },
            live,
            ..TrackSnapshot::default()
        },
    }
}

/// Engine-reported enabled state. A bandwidth pause or failed subscription
/// does not mean the participant turned the track off.
fn is_on(track: &TrackSnapshot) -> bool {
    match track.status {
        TrackStatus::Off => track.off == Some(OffReason::Bandwidth),
        TrackStatus::Blocked => track.blocked == Some(BlockedReason::DeviceMissing),
        _ => true,
    }
}

fn assign(tracks: &mut ParticipantTracks, source: LkTrackSource, snapshot: TrackSnapshot) {
    match source {
        LkTrackSource::Camera => tracks.video = snapshot,
        LkTrackSource::Microphone => tracks.audio = snapshot,
        LkTrackSource::Screenshare => tracks.screen_video = snapshot,
        _ => {}
    }
}

fn display_name(name: String, identity: String) -> String {
    if name.is_empty() { identity } else { name }
}

fn rtc_live(track: &RemoteTrack) -> bool {
    let state = match track {
        RemoteTrack::Audio(audio) => audio.rtc_track().state(),
        RemoteTrack::Video(video) => video.rtc_track().state(),
    };
    matches!(state, RtcTrackState::Live)
}

fn remote_publication(publication: &RemoteTrackPublication, flags: &TrackFlags) -> Publication {
    let sid = publication.sid().to_string();
    if publication.is_muted() {
        return Publication::Muted;
    }
    if lock(&flags.failed).contains(&sid) {
        return Publication::SubscriptionFailed;
    }
    if lock(&flags.paused).contains(&sid) {
        return Publication::Paused;
    }
    match publication.track() {
        Some(track) => Publication::Attached {
            live: rtc_live(&track),
        },
        None => Publication::Pending,
    }
}

fn remote_snapshot(p: &RemoteParticipant, flags: &TrackFlags) -> ParticipantSnapshot {
    let mut tracks = ParticipantTracks::default();
    for publication in p.track_publications().values() {
        let snapshot = track_snapshot(Some(remote_publication(publication, flags)), false);
        assign(&mut tracks, publication.source(), snapshot);
    }
    ParticipantSnapshot {
        id: p.sid().to_string(),
        user_name: display_name(p.name().to_string(), p.identity().to_string()),
        local: false,
        video: is_on(&tracks.video),
        audio: is_on(&tracks.audio),
        tracks,
    }
}

fn local_snapshot(p: &LocalParticipant, flags: &TrackFlags) -> ParticipantSnapshot {
    let mut tracks = ParticipantTracks::default();
    for publication in p.track_publications().values() {
        let source = publication.source();
        let state = if publication.is_muted() {
            Publication::Muted
        } else if source == LkTrackSource::Camera {
            Publication::Attached {
                live: flags.camera_live(),
            }
        } else {
            Publication::Attached { live: true }
        };
        assign(&mut tracks, source, track_snapshot(Some(state), true));
    }
    ParticipantSnapshot {
        id: p.sid().to_string(),
        user_name: display_name(p.name().to_string(), p.identity().to_string()),
        local: true,
        video: is_on(&tracks.video),
        audio: is_on(&tracks.audio),
        tracks,
    }
}
