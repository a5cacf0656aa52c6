use std::sync::{Arc, RwLock};

use crate::participants::{ParticipantRecord, TileLayout};
use crate::session::CallSession;

/// Everything the UI may read about the call, emitted after every processed
/// transition or reconciliation pass.
#[derive(Debug, Clone)]
pub struct CallUpdate {
    pub session: CallSession,
    pub participants: Vec<ParticipantRecord>,
    pub layout: TileLayout,
}

/// Trait for receiving call updates from the core.
/// Implementations must be Send + Sync (called from tokio tasks) and must
/// not block.
pub trait CallStateListener: Send + Sync {
    fn on_state_change(&self, update: CallUpdate);
}

/// Internal emitter that dispatches updates to registered listeners.
#[derive(Clone, Default)]
pub struct EventEmitter {
    listeners: Arc<RwLock<Vec<Arc<dyn CallStateListener>>>>,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&self, listener: Arc<dyn CallStateListener>) {
        self.listeners
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(listener);
    }

    pub fn emit(&self, update: CallUpdate) {
        let listeners = self
            .listeners
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        for listener in listeners.iter() {
            listener.on_state_change(update.clone());
        }
    }
}
