use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::{EngineEvent, ParticipantSnapshot};
use crate::tracks::{BlockedReason, TrackPresence, TrackState};

/// Reconciled view of one participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantRecord {
    pub participant_id: String,
    pub display_name: String,
    pub is_local: bool,
    pub video_track: TrackState,
    pub audio_track: TrackState,
    pub last_updated: DateTime<Utc>,
}

impl ParticipantRecord {
    fn same_content(&self, other: &ParticipantRecord) -> bool {
        self.participant_id == other.participant_id
            && self.display_name == other.display_name
            && self.is_local == other.is_local
            && self.video_track == other.video_track
            && self.audio_track == other.audio_track
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TileKind {
    Camera,
    ScreenShare,
}

/// One entry in the call layout. Screen shares are synthetic tiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub tile_id: String,
    pub participant_id: String,
    pub kind: TileKind,
    pub is_local: bool,
    pub video: TrackState,
    pub audio: TrackState,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TileLayout {
    pub tiles: Vec<Tile>,
    /// Tile shown full-screen, if any.
    pub fullscreen: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Video,
    Audio,
}

/// Maintains `participant_id -> ParticipantRecord` from the engine's
/// participant events.
///
/// Every event updates the raw snapshot table and then recomputes all
/// records from it, so interleaved partial updates never accumulate.
#[derive(Debug, Clone, Default)]
pub struct TrackReconciler {
    snapshots: HashMap<String, ParticipantSnapshot>,
    records: HashMap<String, ParticipantRecord>,
    screen_shares: HashMap<String, Tile>,
    local_id: Option<String>,
    device_faults: HashMap<MediaKind, BlockedReason>,
}

impl TrackReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a participant event. Returns whether any record changed.
    pub fn apply(&mut self, event: &EngineEvent, now: DateTime<Utc>) -> bool {
        match event {
            EngineEvent::ParticipantJoined(snapshot) | EngineEvent::ParticipantUpdated(snapshot) => {
                self.snapshots.insert(snapshot.id.clone(), snapshot.clone());
            }
            EngineEvent::ParticipantLeft { id } => {
                if self.snapshots.remove(id).is_none() {
                    tracing::debug!("participant-left for unknown participant {id}");
                    return false;
                }
            }
            _ => return false,
        }
        self.recompute(now)
    }

    /// Replace the whole snapshot table, e.g. on joined-meeting or after
    /// returning from background.
    pub fn replace_all(
        &mut self,
        snapshots: HashMap<String, ParticipantSnapshot>,
        now: DateTime<Utc>,
    ) -> bool {
        self.snapshots = snapshots;
        self.recompute(now)
    }

    /// Mark a local device as failed until the engine reports it available.
    pub fn record_device_fault(
        &mut self,
        kind: MediaKind,
        reason: BlockedReason,
        now: DateTime<Utc>,
    ) -> bool {
        tracing::info!("local {kind:?} device fault: {reason:?}");
        self.device_faults.insert(kind, reason);
        self.recompute(now)
    }

    fn recompute(&mut self, now: DateTime<Utc>) -> bool {
        let local_id = self.pick_local();

        let mut records = HashMap::with_capacity(self.snapshots.len());
        let mut screen_shares = HashMap::new();

        for snapshot in self.snapshots.values() {
            let is_local = local_id.as_deref() == Some(snapshot.id.as_str());
            let mut video_track = TrackState::from_snapshot(&snapshot.tracks.video);
            let mut audio_track = TrackState::from_snapshot(&snapshot.tracks.audio);

            if is_local {
                video_track = Self::overlay_fault(&mut self.device_faults, MediaKind::Video, video_track);
                audio_track = Self::overlay_fault(&mut self.device_faults, MediaKind::Audio, audio_track);
            }

            let mut record = ParticipantRecord {
                participant_id: snapshot.id.clone(),
                display_name: snapshot.user_name.clone(),
                is_local,
                video_track,
                audio_track,
                last_updated: now,
            };
            if let Some(previous) = self.records.get(&snapshot.id) {
                if previous.same_content(&record) {
                    record.last_updated = previous.last_updated;
                }
            }

            let screen_video = TrackState::from_snapshot(&snapshot.tracks.screen_video);
            if screen_video.presence == TrackPresence::Available {
                let tile_id = format!("{}-screen", snapshot.id);
                screen_shares.insert(
                    tile_id.clone(),
                    Tile {
                        tile_id,
                        participant_id: snapshot.id.clone(),
                        kind: TileKind::ScreenShare,
                        is_local,
                        video: screen_video,
                        audio: TrackState::from_snapshot(&snapshot.tracks.screen_audio),
                    },
                );
            }

            records.insert(snapshot.id.clone(), record);
        }

        let changed = records.len() != self.records.len()
            || records.iter().any(|(id, record)| {
                self.records
                    .get(id)
                    .is_none_or(|previous| !previous.same_content(record))
            })
            || screen_shares != self.screen_shares
            || local_id != self.local_id;

        self.records = records;
        self.screen_shares = screen_shares;
        self.local_id = local_id;
        changed
    }

    /// Exactly one local participant: the engine should report one, but a
    /// transient duplicate resolves to the smallest id.
    fn pick_local(&self) -> Option<String> {
        let mut locals: Vec<&str> = self
            .snapshots
            .values()
            .filter(|s| s.local)
            .map(|s| s.id.as_str())
            .collect();
        locals.sort_unstable();
        if locals.len() > 1 {
            tracing::warn!("engine reported {} local participants, using {}", locals.len(), locals[0]);
        }
        locals.first().map(|id| id.to_string())
    }

    fn overlay_fault(
        faults: &mut HashMap<MediaKind, BlockedReason>,
        kind: MediaKind,
        track: TrackState,
    ) -> TrackState {
        if track.presence == TrackPresence::Available {
            if faults.remove(&kind).is_some() {
                tracing::info!("local {kind:?} device recovered");
            }
            return track;
        }
        match faults.get(&kind) {
            Some(reason) => TrackState::blocked(*reason),
            None => track,
        }
    }

    pub fn participant(&self, id: &str) -> Option<&ParticipantRecord> {
        self.records.get(id)
    }

    pub fn local(&self) -> Option<&ParticipantRecord> {
        self.local_id.as_deref().and_then(|id| self.records.get(id))
    }

    /// Local participant first, then remotes ordered by id.
    pub fn participants(&self) -> Vec<ParticipantRecord> {
        let mut all: Vec<ParticipantRecord> = self.records.values().cloned().collect();
        all.sort_by(|a, b| {
            b.is_local
                .cmp(&a.is_local)
                .then_with(|| a.participant_id.cmp(&b.participant_id))
        });
        all
    }

    pub fn remote_count(&self) -> usize {
        self.records.values().filter(|r| !r.is_local).count()
    }

    pub fn participant_count(&self) -> usize {
        self.records.len()
    }

    /// Tiles for layout: camera tiles for every participant plus one per
    /// active screen share. A screen share takes the full screen; otherwise
    /// a two-party call shows the remote participant full-screen.
    pub fn layout(&self) -> TileLayout {
        let mut tiles: Vec<Tile> = self
            .participants()
            .into_iter()
            .map(|r| Tile {
                tile_id: r.participant_id.clone(),
                participant_id: r.participant_id,
                kind: TileKind::Camera,
                is_local: r.is_local,
                video: r.video_track,
                audio: r.audio_track,
            })
            .collect();

        let mut shares: Vec<Tile> = self.screen_shares.values().cloned().collect();
        shares.sort_by(|a, b| a.tile_id.cmp(&b.tile_id));

        let fullscreen = shares
            .first()
            .map(|t| t.tile_id.clone())
            .or_else(|| {
                let remotes: Vec<&Tile> = tiles.iter().filter(|t| !t.is_local).collect();
                match remotes.as_slice() {
                    [only] => Some(only.tile_id.clone()),
                    _ => None,
                }
            });

        tiles.extend(shares);
        TileLayout { tiles, fullscreen }
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
        self.records.clear();
        self.screen_shares.clear();
        self.local_id = None;
        self.device_faults.clear();
    }
}
