use serde::{Deserialize, Serialize};

/// Lifecycle state of a call session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CallState {
    #[default]
    Idle,
    RequestingPermission,
    Creating,
    Joining,
    Joined,
    Leaving,
    Error,
}

/// Inputs that drive [`CallState`] transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// `permission_recorded` skips the prompt when a durable grant exists.
    Start { permission_recorded: bool },
    /// Granted or limited outcome.
    PermissionGranted,
    /// Denied, and the user continues in a degraded mode.
    PermissionDegraded,
    /// Denied and declined, dismissed without fallback, or platform failure.
    PermissionDeclined,
    EngineReady,
    CreationFailed,
    JoinedEvent,
    FatalError,
    Leave,
    LeftOrTimeout,
    Retry { permission_valid: bool },
    Acknowledge,
}

impl CallState {
    /// Transition table. `None` means the trigger is ignored in this state.
    pub fn on(self, trigger: Trigger) -> Option<CallState> {
        use CallState::*;
        use Trigger::*;

        match (self, trigger) {
            (Idle, Start { permission_recorded: false }) => Some(RequestingPermission),
            (Idle, Start { permission_recorded: true }) => Some(Creating),

            (RequestingPermission, PermissionGranted | PermissionDegraded) => Some(Creating),
            (RequestingPermission, PermissionDeclined) => Some(Idle),

            (Creating, EngineReady) => Some(Joining),
            (Creating, CreationFailed) => Some(Error),

            (Joining, JoinedEvent) => Some(Joined),
            (Joining | Joined, FatalError) => Some(Error),

            (RequestingPermission | Creating | Joining | Joined, Leave) => Some(Leaving),
            (Leaving, LeftOrTimeout) => Some(Idle),

            (Error, Retry { permission_valid: false }) => Some(RequestingPermission),
            (Error, Retry { permission_valid: true }) => Some(Creating),
            (Error, Acknowledge) => Some(Idle),

            _ => None,
        }
    }

    /// States in which an attempt is in progress or connected.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            CallState::RequestingPermission
                | CallState::Creating
                | CallState::Joining
                | CallState::Joined
        )
    }
}
