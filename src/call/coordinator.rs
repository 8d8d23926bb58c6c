//! Call lifecycle coordinator
//!
//! Reacts to telephony events: keeps the shared call registry current,
//! tells the recorder to start and stop, and decides between a basic
//! notification and the full-screen call screen. Events are handled
//! strictly one after another.

use super::manager::{CallManager, PhoneState};
use super::types::{Call, CallAudioState, CallId, CallState, TelephonyEvent};
use crate::config::SharedSettings;
use crate::platform::traits::{CallNotifier, CallScreenLauncher, DeviceStatus, LaunchResult};
use crate::recording::command::RecordingCommandSender;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Platform collaborators the coordinator drives
#[derive(Clone)]
pub struct CoordinatorPlatform {
    pub notifier: Arc<dyn CallNotifier>,
    pub launcher: Arc<dyn CallScreenLauncher>,
    pub device: Arc<dyn DeviceStatus>,
    pub settings: SharedSettings,
}

pub struct CallCoordinator {
    calls: CallManager,
    recorder: RecordingCommandSender,
    platform: CoordinatorPlatform,
    /// Calls with a registered state listener
    listeners: HashSet<CallId>,
}

impl CallCoordinator {
    /// Create a coordinator with no registered listeners
    pub fn new(calls: CallManager, recorder: RecordingCommandSender, platform: CoordinatorPlatform) -> Self {
        Self {
            calls,
            recorder,
            platform,
            listeners: HashSet::new(),
        }
    }

    /// Get the shared call registry
    pub fn calls(&self) -> &CallManager {
        &self.calls
    }

    /// Whether a state listener is registered for the call
    pub fn is_listening(&self, id: CallId) -> bool {
        self.listeners.contains(&id)
    }

    /// Route one telephony event to its handler
    pub fn handle(&mut self, event: TelephonyEvent) {
        match event {
            TelephonyEvent::CallAdded(call) => self.on_call_added(call),
            TelephonyEvent::CallRemoved(id) => self.on_call_removed(id),
            TelephonyEvent::CallStateChanged { id, state } => self.on_call_state_changed(id, state),
            TelephonyEvent::AudioStateChanged(state) => self.on_audio_state_changed(state),
        }
    }

    /// Track a new call, start recording and present it
    pub fn on_call_added(&mut self, call: Call) {
        tracing::info!(call_id = %call.id, direction = ?call.direction, "Call added");
        self.listeners.insert(call.id);
        self.calls.add(call.clone());
        self.calls.bind_service();

        let (auto_record, always_fullscreen) = {
            let settings = self.platform.settings.read();
            (settings.auto_record_enabled, settings.always_show_fullscreen)
        };
        self.recorder.start(auto_record);

        if self.should_force_fullscreen(&call, always_fullscreen) {
            self.platform.notifier.setup_notification(true);
            if let LaunchResult::Failed(reason) = self.platform.launcher.launch() {
                tracing::warn!(call_id = %call.id, "Full-screen call screen failed: {}", reason);
                self.platform.notifier.setup_notification(false);
            }
        } else {
            self.platform.notifier.setup_notification(false);
        }
    }

    fn should_force_fullscreen(&self, call: &Call, always_fullscreen: bool) -> bool {
        let device = &self.platform.device;
        !device.is_interactive() || call.is_outgoing() || device.is_device_locked() || always_fullscreen
    }

    /// Stop tracking a call and stop recording
    pub fn on_call_removed(&mut self, id: CallId) {
        tracing::info!(call_id = %id, "Call removed");
        if !self.listeners.remove(&id) {
            tracing::debug!(call_id = %id, "Removed call had no listener");
        }

        let was_primary = self.calls.is_primary(id);
        self.calls.remove(id);
        self.recorder.stop();

        if self.calls.state() == PhoneState::NoCall {
            self.calls.unbind_service();
            self.platform.notifier.cancel_notification();
        } else {
            self.platform.notifier.setup_notification(false);
            if was_primary {
                if let LaunchResult::Failed(reason) = self.platform.launcher.launch() {
                    tracing::warn!("Could not surface the next call: {}", reason);
                }
            }
        }
    }

    /// Refresh or cancel the notification for a tracked call
    pub fn on_call_state_changed(&mut self, id: CallId, state: CallState) {
        if !self.listeners.contains(&id) {
            tracing::debug!(call_id = %id, ?state, "State change for untracked call");
            return;
        }

        tracing::debug!(call_id = %id, ?state, "Call state changed");
        self.calls.update_call_state(id, state);
        if state.is_terminal() {
            self.platform.notifier.cancel_notification();
        } else {
            self.platform.notifier.setup_notification(false);
        }
    }

    /// Forward the audio state to the call registry
    pub fn on_audio_state_changed(&mut self, state: Option<CallAudioState>) {
        if let Some(state) = state {
            self.calls.set_audio_state(state);
        }
    }

    /// Drop listeners and cancel the notification
    pub fn teardown(&mut self) {
        self.listeners.clear();
        self.platform.notifier.cancel_notification();
    }

    /// Handle telephony events until the subsystem goes away
    pub async fn run(mut self, mut events: mpsc::UnboundedReceiver<TelephonyEvent>) {
        tracing::info!("Call coordinator started");
        while let Some(event) = events.recv().await {
            self.handle(event);
        }
        self.teardown();
        tracing::info!("Call coordinator stopped");
    }
}
