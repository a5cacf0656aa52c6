use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{oneshot, watch};

use crate::engine::{EngineHandle, MeetingState};
use crate::platform::Navigator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TeardownReason {
    UserLeft,
    BackNavigation,
    BackgroundTimeout,
    FatalError,
    /// The engine left the meeting on its own (host ended, kicked).
    RemoteEnded,
}

impl TeardownReason {
    /// Fatal errors keep the call screen up for the retry affordance, and a
    /// connection lost in background keeps it up for the rejoin prompt.
    pub fn navigates_away(self) -> bool {
        !matches!(self, TeardownReason::FatalError | TeardownReason::BackgroundTimeout)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeardownOutcome {
    Performed,
    AlreadyTornDown,
}

/// What a session holds that teardown must release.
pub struct SessionResources {
    pub engine: Arc<dyn EngineHandle>,
    /// Stops the session's event loop, unsubscribing from engine events.
    pub unsubscribe: oneshot::Sender<()>,
}

/// One-shot latches for session teardown and navigation-away.
///
/// The first `teardown` call performs the engine disconnect and resource
/// release; every later or concurrent call returns immediately. Navigation
/// has its own latch because it is also triggered outside teardown.
pub struct LifecycleGuard {
    torn_down: AtomicBool,
    navigated: AtomicBool,
    resources: Mutex<Option<SessionResources>>,
    navigator: Arc<dyn Navigator>,
    leave_timeout: Duration,
    released: watch::Sender<bool>,
}

impl LifecycleGuard {
    pub fn new(navigator: Arc<dyn Navigator>, leave_timeout: Duration) -> Self {
        let (released, _) = watch::channel(false);
        Self {
            torn_down: AtomicBool::new(false),
            navigated: AtomicBool::new(false),
            resources: Mutex::new(None),
            navigator,
            leave_timeout,
            released,
        }
    }

    fn resources(&self) -> MutexGuard<'_, Option<SessionResources>> {
        self.resources.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Hand the session's resources to the guard.
    ///
    /// Fails, returning the resources, if teardown already ran; the caller
    /// must then release them itself.
    pub fn install(&self, resources: SessionResources) -> Result<(), SessionResources> {
        let mut slot = self.resources();
        if self.torn_down.load(Ordering::SeqCst) {
            return Err(resources);
        }
        *slot = Some(resources);
        Ok(())
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::SeqCst)
    }

    pub fn has_navigated(&self) -> bool {
        self.navigated.load(Ordering::SeqCst)
    }

    pub async fn teardown(&self, reason: TeardownReason) -> TeardownOutcome {
        if self.torn_down.swap(true, Ordering::SeqCst) {
            tracing::debug!("teardown ({reason:?}) skipped, already torn down");
            return TeardownOutcome::AlreadyTornDown;
        }
        tracing::info!("tearing down session: {reason:?}");

        let resources = self.resources().take();
        if let Some(SessionResources { engine, unsubscribe }) = resources {
            let _ = unsubscribe.send(());

            if matches!(engine.meeting_state(), MeetingState::Joining | MeetingState::Joined) {
                match tokio::time::timeout(self.leave_timeout, engine.leave()).await {
                    Ok(Ok(())) => tracing::debug!("engine left meeting"),
                    Ok(Err(e)) => tracing::warn!("engine leave failed: {e}"),
                    Err(_) => tracing::warn!("engine leave timed out after {:?}", self.leave_timeout),
                }
            }
            engine.destroy();
        }

        self.released.send_replace(true);

        if reason.navigates_away() {
            self.navigate_away();
        }
        TeardownOutcome::Performed
    }

    /// Leave the call screen, at most once.
    pub fn navigate_away(&self) -> bool {
        if self.navigated.swap(true, Ordering::SeqCst) {
            tracing::debug!("navigation already performed");
            return false;
        }
        self.navigator.go_back();
        true
    }

    /// Resolves once teardown has released the session's resources.
    pub async fn released(&self) {
        let mut rx = self.released.subscribe();
        let _ = rx.wait_for(|released| *released).await;
    }
}
