mod common;

use std::sync::atomic::Ordering;

use common::{FakePlatform, Harness, USER_ID, target};
use medcall_core::{
    CallError, CallMode, CallState, Capabilities, Decision, DecisionStore, ErrorKind,
    OutcomeSource, PermissionStatus, PromptResponse, SessionConfig,
};

#[tokio::test]
async fn explicit_denial_is_not_prompted_again() {
    let h = Harness::builder()
        .platform(FakePlatform::answering([PromptResponse::Denied]))
        .build();

    let state = h.manager.start(target(), CallMode::AudioVideo).await.unwrap();
    assert_eq!(state, CallState::Idle);

    let session = h.manager.session().await.unwrap();
    let outcome = session.permission.unwrap();
    assert_eq!(outcome.status, PermissionStatus::Denied);
    assert!(outcome.requires_settings());
    assert_eq!(session.last_error.unwrap().kind, ErrorKind::PermissionDenied);
    assert_eq!(
        h.decisions.get(USER_ID).map(|r| r.decision),
        Some(Decision::Denied)
    );

    let state = h.manager.start(target(), CallMode::AudioVideo).await.unwrap();
    assert_eq!(state, CallState::Idle);
    assert_eq!(h.platform.prompts(), 1);
    let outcome = h.manager.session().await.unwrap().permission.unwrap();
    assert_eq!(outcome.source, OutcomeSource::PriorDenial);

    h.manager.open_settings().await.unwrap();
    assert_eq!(h.platform.settings_opened.load(Ordering::SeqCst), 1);
    assert_eq!(h.engine.creates.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn access_reenabled_in_settings_lets_the_next_call_join() {
    let h = Harness::builder()
        .platform(FakePlatform::answering([PromptResponse::Denied]))
        .build();

    let state = h.manager.start(target(), CallMode::AudioVideo).await.unwrap();
    assert_eq!(state, CallState::Idle);
    assert!(h.manager.session().await.unwrap().permission.unwrap().requires_settings());

    h.manager.open_settings().await.unwrap();
    h.manager.on_background().await;
    h.platform.set_current(Some(PromptResponse::Granted));
    h.manager.on_foreground().await;

    let state = h.manager.start(target(), CallMode::AudioVideo).await.unwrap();
    assert_eq!(state, CallState::Joined);

    let session = h.manager.session().await.unwrap();
    assert_eq!(session.mode, CallMode::AudioVideo);
    assert!(session.last_error.is_none());
    assert_eq!(session.permission.unwrap().source, OutcomeSource::Settings);
    assert_eq!(h.platform.prompts(), 1);
    assert_eq!(
        h.decisions.get(USER_ID).map(|r| r.decision),
        Some(Decision::Granted)
    );

    let options = h.engine.last().last_options.lock().unwrap().unwrap();
    assert!(!options.start_video_off);
    assert!(!options.start_audio_off);
}

#[tokio::test]
async fn dismissal_may_prompt_again() {
    let h = Harness::builder()
        .platform(FakePlatform::answering([
            PromptResponse::Dismissed,
            PromptResponse::Granted,
        ]))
        .build();

    let state = h.manager.start(target(), CallMode::AudioVideo).await.unwrap();
    assert_eq!(state, CallState::Idle);
    let outcome = h.manager.session().await.unwrap().permission.unwrap();
    assert!(outcome.was_dismissed());
    assert!(!outcome.requires_settings());
    assert!(h.decisions.get(USER_ID).is_none());

    let state = h.manager.start(target(), CallMode::AudioVideo).await.unwrap();
    assert_eq!(state, CallState::Joined);
    assert_eq!(h.platform.prompts(), 2);
}

#[tokio::test]
async fn denial_with_audio_fallback_joins_degraded() {
    let h = Harness::builder()
        .platform(FakePlatform::answering([PromptResponse::Denied]))
        .fallback(Some(CallMode::AudioOnly))
        .build();

    let state = h.manager.start(target(), CallMode::AudioVideo).await.unwrap();
    assert_eq!(state, CallState::Joined);

    let session = h.manager.session().await.unwrap();
    assert_eq!(session.mode, CallMode::AudioOnly);
    assert!(session.last_error.is_none());

    let options = h.engine.last().last_options.lock().unwrap().unwrap();
    assert!(options.start_video_off);

    let err = h.manager.toggle_camera().await.unwrap_err();
    assert!(matches!(err, CallError::CameraUnavailable));

    let err = h.manager.toggle_mic().await.unwrap_err();
    assert!(matches!(err, CallError::MicrophoneUnavailable));
    assert!(h.engine.last().audio_commands.lock().unwrap().is_empty());
}

#[tokio::test]
async fn limited_grant_without_camera_joins_audio_only() {
    let config = SessionConfig {
        limited_grant_capabilities: Capabilities::MICROPHONE,
        ..SessionConfig::default()
    };
    let h = Harness::builder()
        .platform(FakePlatform::answering([PromptResponse::Limited]))
        .config(config)
        .build();

    assert_eq!(
        h.manager.start(target(), CallMode::AudioVideo).await.unwrap(),
        CallState::Joined
    );

    let session = h.manager.session().await.unwrap();
    assert_eq!(session.mode, CallMode::AudioOnly);
    assert_eq!(session.permission.unwrap().status, PermissionStatus::Limited);

    let options = h.engine.last().last_options.lock().unwrap().unwrap();
    assert!(options.start_video_off);
    assert!(!options.start_audio_off);
}

#[tokio::test]
async fn recorded_grant_skips_the_prompt() {
    let h = Harness::new();
    h.decisions.record(USER_ID, Decision::Granted).unwrap();

    h.join().await;
    assert_eq!(h.platform.prompts(), 0);
    assert_eq!(h.updates.all()[0].session.state, CallState::Creating);
}

#[tokio::test]
async fn prompt_skip_can_be_disabled() {
    let config = SessionConfig {
        skip_prompt_after_grant: false,
        ..SessionConfig::default()
    };
    let h = Harness::builder().config(config).build();
    h.decisions.record(USER_ID, Decision::Granted).unwrap();

    h.join().await;
    assert_eq!(h.platform.prompts(), 1);
}

#[tokio::test]
async fn join_options_follow_config() {
    let config = SessionConfig {
        camera_on_join: false,
        ..SessionConfig::default()
    };
    let h = Harness::builder().config(config).build();
    h.join().await;

    let options = h.engine.last().last_options.lock().unwrap().unwrap();
    assert!(options.start_video_off);
    assert!(!options.start_audio_off);
    assert!(!h.manager.mute_intent().camera_requested_on);
    assert!(h.manager.mute_intent().mic_requested_on);
}
