//! Call lifecycle
//!
//! Telephony types, the shared call registry and the coordinator that
//! reacts to telephony events.

pub mod coordinator;
pub mod manager;
pub mod types;

pub use coordinator::{CallCoordinator, CoordinatorPlatform};
pub use manager::{CallManager, PhoneState};
pub use types::{AudioRoute, Call, CallAudioState, CallDirection, CallId, CallState, TelephonyEvent};
