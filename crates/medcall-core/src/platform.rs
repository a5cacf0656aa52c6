//! Host platform collaborators: permission dialogs, navigation, and the
//! user's choice to continue degraded after a denial.

use async_trait::async_trait;

use crate::errors::PermissionError;
use crate::permissions::Capabilities;
use crate::session::CallMode;

/// Raw answer from the platform permission dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptResponse {
    Granted,
    Limited,
    Denied,
    /// The dialog was closed without an affirmative choice.
    Dismissed,
}

#[async_trait]
pub trait PermissionPlatform: Send + Sync {
    async fn request_permission(
        &self,
        capabilities: Capabilities,
    ) -> Result<PromptResponse, PermissionError>;

    /// Current authorization for `capabilities`, read without showing a
    /// dialog. `None` when the platform cannot tell.
    async fn check_permission(
        &self,
        capabilities: Capabilities,
    ) -> Result<Option<PromptResponse>, PermissionError>;

    async fn open_system_settings(&self) -> Result<(), PermissionError>;
}

/// Caller-supplied degraded continuation offered after a denial.
#[async_trait]
pub trait FallbackPolicy: Send + Sync {
    /// `None` means the user declined to continue.
    async fn choose(&self, denied: Capabilities) -> Option<CallMode>;
}

/// Fixed answer, for hosts that decide without asking the user.
#[derive(Debug, Clone, Copy)]
pub struct FixedFallback(pub Option<CallMode>);

#[async_trait]
impl FallbackPolicy for FixedFallback {
    async fn choose(&self, _denied: Capabilities) -> Option<CallMode> {
        self.0
    }
}

/// Leaves the call screen.
pub trait Navigator: Send + Sync {
    fn go_back(&self);
}
