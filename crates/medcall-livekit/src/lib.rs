//! LiveKit engine adapter for the medcall call session core.
//!
//! Implements [`medcall_core::CallEngine`] on top of a LiveKit room and
//! resolves consultation links into connection targets.

pub mod auth;
pub mod engine;
pub mod errors;

pub use auth::AuthService;
pub use engine::{LiveKitEngine, LiveKitHandle};
pub use errors::LiveKitError;
