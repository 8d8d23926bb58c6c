//! Shared call registry
//!
//! Holds the tracked calls, the primary-call designation, the last audio
//! state and whether an in-call service is currently bound. One instance
//! lives for the whole process and is handed explicitly to whoever needs
//! it; clones share the same state.

use super::types::{Call, CallAudioState, CallId, CallState};
use parking_lot::RwLock;
use std::sync::Arc;

/// Summary of the tracked calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhoneState {
    NoCall,
    SingleCall(Call),
    /// `active` is the primary call, `other` the next most recent one
    TwoCalls { active: Call, other: Call },
}

#[derive(Debug, Default)]
struct Inner {
    /// Ordered by time added; the last entry is primary
    calls: Vec<Call>,
    audio_state: Option<CallAudioState>,
    service_bound: bool,
}

/// Cloneable handle to the shared call registry
#[derive(Debug, Clone, Default)]
pub struct CallManager {
    inner: Arc<RwLock<Inner>>,
}

impl CallManager {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a call and make it primary
    ///
    /// Re-adding a tracked id replaces its snapshot and promotes it.
    pub fn add(&self, call: Call) {
        let mut inner = self.inner.write();
        inner.calls.retain(|c| c.id != call.id);
        tracing::debug!(call_id = %call.id, "Tracking call");
        inner.calls.push(call);
    }

    /// Stop tracking a call, returning its last snapshot
    pub fn remove(&self, id: CallId) -> Option<Call> {
        let mut inner = self.inner.write();
        let index = inner.calls.iter().position(|c| c.id == id)?;
        tracing::debug!(call_id = %id, "Untracking call");
        Some(inner.calls.remove(index))
    }

    /// The most recently added call still tracked
    pub fn primary(&self) -> Option<Call> {
        self.inner.read().calls.last().cloned()
    }

    /// Whether the call is the primary call
    pub fn is_primary(&self, id: CallId) -> bool {
        self.inner.read().calls.last().map(|c| c.id) == Some(id)
    }

    /// Get the current phone state
    pub fn state(&self) -> PhoneState {
        let inner = self.inner.read();
        let mut recent = inner.calls.iter().rev();
        match (recent.next(), recent.next()) {
            (None, _) => PhoneState::NoCall,
            (Some(active), None) => PhoneState::SingleCall(active.clone()),
            (Some(active), Some(other)) => PhoneState::TwoCalls {
                active: active.clone(),
                other: other.clone(),
            },
        }
    }

    /// Record a state change on a tracked call; false if it is unknown
    pub fn update_call_state(&self, id: CallId, state: CallState) -> bool {
        let mut inner = self.inner.write();
        match inner.calls.iter_mut().find(|c| c.id == id) {
            Some(call) => {
                call.state = state;
                true
            }
            None => false,
        }
    }

    /// Get all tracked calls, oldest first
    pub fn calls(&self) -> Vec<Call> {
        self.inner.read().calls.clone()
    }

    /// Get the number of tracked calls
    pub fn call_count(&self) -> usize {
        self.inner.read().calls.len()
    }

    /// Record the latest audio state
    pub fn set_audio_state(&self, state: CallAudioState) {
        tracing::debug!(route = ?state.route, muted = state.is_muted, "Audio state changed");
        self.inner.write().audio_state = Some(state);
    }

    /// Get the latest audio state
    pub fn audio_state(&self) -> Option<CallAudioState> {
        self.inner.read().audio_state.clone()
    }

    /// Mark the in-call service as bound
    pub fn bind_service(&self) {
        self.inner.write().service_bound = true;
    }

    /// Clear the in-call service reference
    pub fn unbind_service(&self) {
        self.inner.write().service_bound = false;
    }

    /// Whether an in-call service is bound
    pub fn is_service_bound(&self) -> bool {
        self.inner.read().service_bound
    }
}
