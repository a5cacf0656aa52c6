mod common;

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use common::{FakePlatform, Harness, remote, target, track};
use medcall_core::{
    CallError, CallMode, CallState, ErrorKind, MeetingState, PromptResponse, TrackStatus,
};
use tokio::sync::Notify;

#[tokio::test(start_paused = true)]
async fn connection_lost_in_background_returns_to_idle() {
    let h = Harness::new();
    h.join().await;
    let handle = h.engine.last();

    h.manager.on_background().await;
    tokio::time::advance(Duration::from_secs(600)).await;
    handle.set_meeting_state(MeetingState::Left);
    h.manager.on_foreground().await;

    let session = h.manager.session().await.unwrap();
    assert_eq!(session.state, CallState::Idle);
    assert_eq!(session.last_error.unwrap().kind, ErrorKind::ConnectionLost);
    assert_eq!(handle.leaves.load(Ordering::SeqCst), 0);
    assert_eq!(handle.destroys.load(Ordering::SeqCst), 1);
    assert_eq!(h.navigator.go_backs(), 0);

    assert_eq!(h.manager.rejoin().await.unwrap(), CallState::Joined);
    assert_eq!(h.engine.creates.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn foreground_resyncs_participants_from_engine() {
    let h = Harness::new();
    h.join().await;
    let handle = h.engine.last();
    let local = handle.local().unwrap();

    h.manager.on_background().await;
    tokio::time::advance(Duration::from_secs(600)).await;
    handle.replace_silently(vec![local, remote("doctor", track(TrackStatus::Playable, true))]);
    h.manager.on_foreground().await;

    assert_eq!(h.manager.state().await, CallState::Joined);
    let participants = h.manager.participants().await;
    assert_eq!(participants.len(), 2);
    assert!(participants[1].video_track.is_render_ready());
    assert_eq!(h.manager.layout().await.fullscreen.as_deref(), Some("doctor"));
}

#[tokio::test(start_paused = true)]
async fn short_background_keeps_the_call() {
    let h = Harness::new();
    h.join().await;

    h.manager.on_background().await;
    tokio::time::advance(Duration::from_secs(5)).await;
    h.manager.on_foreground().await;

    assert_eq!(h.manager.state().await, CallState::Joined);
    assert_eq!(h.engine.total_destroys(), 0);
}

#[tokio::test(start_paused = true)]
async fn stale_permission_flow_is_invalidated() {
    let gate = Arc::new(Notify::new());
    let h = Harness::builder()
        .platform(FakePlatform::answering([PromptResponse::Granted]).gated(gate.clone()))
        .build();

    let manager = h.manager.clone();
    let attempt = tokio::spawn(async move { manager.start(target(), CallMode::AudioVideo).await });
    h.updates
        .wait_until(|u| u.session.state == CallState::RequestingPermission)
        .await;

    h.manager.on_background().await;
    tokio::time::advance(Duration::from_secs(600)).await;
    h.manager.on_foreground().await;

    assert_eq!(h.manager.state().await, CallState::Idle);
    assert!(!h.negotiator.is_in_flight());
    assert_eq!(h.navigator.go_backs(), 0);

    gate.notify_one();
    assert!(matches!(attempt.await.unwrap(), Err(CallError::Cancelled)));
    assert_eq!(h.engine.creates.load(Ordering::SeqCst), 0);
    assert_eq!(h.manager.state().await, CallState::Idle);

    gate.notify_one();
    assert_eq!(
        h.manager.start(target(), CallMode::AudioVideo).await.unwrap(),
        CallState::Joined
    );
}
