//! Telephony data model
//!
//! Calls are owned by the telephony subsystem. The services only ever hold
//! snapshots of them, keyed by an opaque [`CallId`].

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque handle identifying a call for its whole lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallId(Uuid);

impl CallId {
    /// Allocate a fresh handle
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CallId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Who originated the call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallDirection {
    Incoming,
    Outgoing,
}

/// Telecom call state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallState {
    New,
    Ringing,
    Dialing,
    Connecting,
    Active,
    Holding,
    SelectPhoneAccount,
    Disconnecting,
    Disconnected,
}

impl CallState {
    /// Whether the call is going away
    pub fn is_terminal(&self) -> bool {
        matches!(self, CallState::Disconnecting | CallState::Disconnected)
    }
}

/// Snapshot of a call as delivered by the telephony subsystem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Call {
    pub id: CallId,
    pub direction: CallDirection,
    pub state: CallState,
    /// Remote number, when the network exposes it
    pub handle: Option<String>,
}

impl Call {
    pub fn new(direction: CallDirection, state: CallState) -> Self {
        Self {
            id: CallId::new(),
            direction,
            state,
            handle: None,
        }
    }

    pub fn incoming() -> Self {
        Self::new(CallDirection::Incoming, CallState::Ringing)
    }

    pub fn outgoing() -> Self {
        Self::new(CallDirection::Outgoing, CallState::Dialing)
    }

    pub fn with_handle(mut self, handle: impl Into<String>) -> Self {
        self.handle = Some(handle.into());
        self
    }

    pub fn is_outgoing(&self) -> bool {
        self.direction == CallDirection::Outgoing
    }
}

/// Audio output route for the active call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioRoute {
    Earpiece,
    Bluetooth,
    WiredHeadset,
    Speaker,
    Streaming,
}

/// Audio state reported by the telephony subsystem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallAudioState {
    pub is_muted: bool,
    pub route: AudioRoute,
    pub supported_routes: Vec<AudioRoute>,
}

impl CallAudioState {
    pub fn supports(&self, route: AudioRoute) -> bool {
        self.supported_routes.contains(&route)
    }
}

/// Events delivered by the telephony subsystem
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TelephonyEvent {
    CallAdded(Call),
    CallRemoved(CallId),
    CallStateChanged { id: CallId, state: CallState },
    /// The subsystem may report a missing audio state; it is ignored
    AudioStateChanged(Option<CallAudioState>),
}
