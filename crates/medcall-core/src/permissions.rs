use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use futures_util::future::{BoxFuture, FutureExt, Shared};
use serde::{Deserialize, Serialize};

use crate::decisions::{Decision, DecisionRecord, DecisionStore};
use crate::errors::PermissionError;
use crate::platform::{FallbackPolicy, PermissionPlatform, PromptResponse};
use crate::session::CallMode;

/// Set of media capabilities requested from the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Capabilities {
    pub camera: bool,
    pub microphone: bool,
}

impl Capabilities {
    pub const NONE: Self = Self { camera: false, microphone: false };
    pub const CAMERA: Self = Self { camera: true, microphone: false };
    pub const MICROPHONE: Self = Self { camera: false, microphone: true };
    pub const CAMERA_AND_MICROPHONE: Self = Self { camera: true, microphone: true };

    pub fn intersect(self, other: Self) -> Self {
        Self {
            camera: self.camera && other.camera,
            microphone: self.microphone && other.microphone,
        }
    }

    pub fn contains(self, other: Self) -> bool {
        self.intersect(other) == other
    }

    pub fn is_empty(self) -> bool {
        self == Self::NONE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PermissionStatus {
    Granted,
    Limited,
    Denied,
}

/// How an outcome was reached; drives what the UI offers next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutcomeSource {
    /// The platform dialog answered with an explicit choice.
    Prompt,
    /// The dialog was closed without a choice. Nothing was recorded.
    Dismissed,
    /// A recorded denial exists; the dialog was not shown again.
    PriorDenial,
    /// A recorded denial was lifted in system settings; no dialog shown.
    Settings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionOutcome {
    pub status: PermissionStatus,
    pub fallback_mode: Option<CallMode>,
    pub source: OutcomeSource,
    /// Capabilities actually usable for this attempt.
    pub usable: Capabilities,
}

impl PermissionOutcome {
    pub fn can_proceed(&self) -> bool {
        matches!(self.status, PermissionStatus::Granted | PermissionStatus::Limited)
            || self.fallback_mode.is_some()
    }

    /// The platform will not show its dialog again; route to system settings.
    pub fn requires_settings(&self) -> bool {
        self.status == PermissionStatus::Denied && self.source != OutcomeSource::Dismissed
    }

    pub fn was_dismissed(&self) -> bool {
        self.source == OutcomeSource::Dismissed
    }
}

type SharedRequest = Shared<BoxFuture<'static, Result<PermissionOutcome, PermissionError>>>;

struct InFlight {
    id: u64,
    generation: u64,
    future: SharedRequest,
}

struct NegotiatorInner {
    platform: Arc<dyn PermissionPlatform>,
    decisions: Arc<dyn DecisionStore>,
    fallback: Arc<dyn FallbackPolicy>,
    user_id: String,
    limited_capabilities: Capabilities,
    in_flight: Mutex<Option<InFlight>>,
    next_id: AtomicU64,
    generation: AtomicU64,
}

/// Acquires camera/microphone access at most once per concurrent burst of
/// requests.
///
/// Later callers arriving while a platform dialog is open await the same
/// in-flight request instead of opening a second dialog.
#[derive(Clone)]
pub struct PermissionNegotiator {
    inner: Arc<NegotiatorInner>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl PermissionNegotiator {
    pub fn new(
        platform: Arc<dyn PermissionPlatform>,
        decisions: Arc<dyn DecisionStore>,
        fallback: Arc<dyn FallbackPolicy>,
        user_id: impl Into<String>,
        limited_capabilities: Capabilities,
    ) -> Self {
        Self {
            inner: Arc::new(NegotiatorInner {
                platform,
                decisions,
                fallback,
                user_id: user_id.into(),
                limited_capabilities,
                in_flight: Mutex::new(None),
                next_id: AtomicU64::new(0),
                generation: AtomicU64::new(0),
            }),
        }
    }

    pub fn recorded_decision(&self) -> Option<DecisionRecord> {
        self.inner.decisions.get(&self.inner.user_id)
    }

    pub fn has_recorded_grant(&self) -> bool {
        self.recorded_decision()
            .is_some_and(|r| r.decision == Decision::Granted)
    }

    pub fn is_in_flight(&self) -> bool {
        lock(&self.inner.in_flight).is_some()
    }

    /// Request access, joining any request already in flight.
    ///
    /// Resolves with `Err(PermissionError::Cancelled)` if [`invalidate`]
    /// was called while the request was pending.
    ///
    /// [`invalidate`]: PermissionNegotiator::invalidate
    pub async fn request_access(
        &self,
        capabilities: Capabilities,
    ) -> Result<PermissionOutcome, PermissionError> {
        let (id, generation, future) = {
            let mut slot = lock(&self.inner.in_flight);
            match slot.as_ref() {
                Some(pending) => {
                    tracing::debug!("permission request {} already in flight, awaiting it", pending.id);
                    (pending.id, pending.generation, pending.future.clone())
                }
                None => {
                    let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
                    let generation = self.inner.generation.load(Ordering::SeqCst);
                    let inner = self.inner.clone();
                    let future = async move { inner.negotiate(capabilities).await }
                        .boxed()
                        .shared();
                    *slot = Some(InFlight {
                        id,
                        generation,
                        future: future.clone(),
                    });
                    tracing::info!("permission request {id} started for {capabilities:?}");
                    (id, generation, future)
                }
            }
        };

        let result = future.await;

        {
            let mut slot = lock(&self.inner.in_flight);
            if slot.as_ref().is_some_and(|pending| pending.id == id) {
                *slot = None;
            }
        }

        if self.inner.generation.load(Ordering::SeqCst) != generation {
            tracing::info!("permission request {id} resolved after invalidation, discarding");
            return Err(PermissionError::Cancelled);
        }
        result
    }

    /// Drop any in-flight request; its eventual result is discarded.
    pub fn invalidate(&self) {
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        if lock(&self.inner.in_flight).take().is_some() {
            tracing::info!("in-flight permission request invalidated");
        }
    }

    pub async fn open_settings(&self) -> Result<(), PermissionError> {
        self.inner.platform.open_system_settings().await
    }
}

impl NegotiatorInner {
    async fn negotiate(&self, requested: Capabilities) -> Result<PermissionOutcome, PermissionError> {
        if let Some(record) = self.decisions.get(&self.user_id) {
            if record.decision == Decision::Denied {
                return Ok(self.after_denial(requested, record).await);
            }
        }

        let response = self.platform.request_permission(requested).await?;
        tracing::info!("platform permission response: {response:?}");

        match response {
            PromptResponse::Granted | PromptResponse::Limited => {
                Ok(self.accept(response, requested, OutcomeSource::Prompt).await)
            }
            PromptResponse::Denied => {
                self.record(Decision::Denied);
                Ok(self.denied(requested, OutcomeSource::Prompt).await)
            }
            PromptResponse::Dismissed => Ok(self.denied(requested, OutcomeSource::Dismissed).await),
        }
    }

    /// A denial is on record: never prompt, but honour access the user has
    /// since re-enabled in system settings.
    async fn after_denial(&self, requested: Capabilities, record: DecisionRecord) -> PermissionOutcome {
        let current = match self.platform.check_permission(requested).await {
            Ok(current) => current,
            Err(e) => {
                tracing::warn!("permission status check failed: {e}");
                None
            }
        };

        match current {
            Some(response @ (PromptResponse::Granted | PromptResponse::Limited)) => {
                tracing::info!(
                    "user {} re-enabled access ({response:?}) after denying it at {}",
                    self.user_id,
                    record.decided_at
                );
                self.accept(response, requested, OutcomeSource::Settings).await
            }
            _ => {
                tracing::info!(
                    "user {} denied access at {}, not prompting again",
                    self.user_id,
                    record.decided_at
                );
                self.denied(requested, OutcomeSource::PriorDenial).await
            }
        }
    }

    async fn accept(
        &self,
        response: PromptResponse,
        requested: Capabilities,
        source: OutcomeSource,
    ) -> PermissionOutcome {
        self.record(Decision::Granted);
        if response == PromptResponse::Limited {
            return self.limited(requested, source).await;
        }
        PermissionOutcome {
            status: PermissionStatus::Granted,
            fallback_mode: None,
            source,
            usable: requested,
        }
    }

    async fn limited(&self, requested: Capabilities, source: OutcomeSource) -> PermissionOutcome {
        let usable = requested.intersect(self.limited_capabilities);
        if usable == requested {
            return PermissionOutcome {
                status: PermissionStatus::Limited,
                fallback_mode: None,
                source,
                usable,
            };
        }
        if usable.microphone {
            return PermissionOutcome {
                status: PermissionStatus::Limited,
                fallback_mode: Some(CallMode::AudioOnly),
                source,
                usable,
            };
        }
        tracing::warn!("limited grant leaves no usable audio, treating as denial");
        PermissionOutcome {
            usable,
            ..self.denied(requested, source).await
        }
    }

    async fn denied(&self, requested: Capabilities, source: OutcomeSource) -> PermissionOutcome {
        let fallback_mode = self.fallback.choose(requested).await;
        PermissionOutcome {
            status: PermissionStatus::Denied,
            fallback_mode,
            source,
            usable: Capabilities::NONE,
        }
    }

    fn record(&self, decision: Decision) {
        if let Err(e) = self.decisions.record(&self.user_id, decision) {
            tracing::warn!("failed to record permission decision: {e}");
        }
    }
}
