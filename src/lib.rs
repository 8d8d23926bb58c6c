//! Dialer call services
//!
//! Two cooperating services for a phone dialer:
//! - the call coordinator reacts to telephony events, maintains the shared
//!   call registry and drives the call notification and full-screen UI
//! - the recording service captures voice-communication audio of the
//!   active call into a media-index entry
//!
//! They only talk through a FIFO command channel. All operating-system
//! functionality is injected through the traits in [`platform`].

pub mod call;
pub mod config;
pub mod platform;
pub mod recording;
pub mod utils;

use call::{CallCoordinator, CallManager, CoordinatorPlatform, TelephonyEvent};
use recording::{command_channel, RecordingPlatform, RecordingService};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utils::error::{AppError, AppResult};

/// Install the global tracing subscriber
///
/// Honors `RUST_LOG`; a subscriber installed earlier is left in place.
pub fn init_tracing() {
    let installed = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dialer_services=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("Starting dialer services v{}", env!("CARGO_PKG_VERSION"));
    }
}

/// Running coordinator and recording service
pub struct DialerServices {
    calls: CallManager,
    events: mpsc::UnboundedSender<TelephonyEvent>,
    coordinator: JoinHandle<()>,
    recorder: JoinHandle<()>,
}

impl DialerServices {
    /// Spawn both services on the current tokio runtime
    pub fn spawn(calls: CallManager, coordinator: CoordinatorPlatform, recording: RecordingPlatform) -> Self {
        let (commands, command_rx) = command_channel();
        let (events, event_rx) = mpsc::unbounded_channel();

        let recorder = tokio::spawn(RecordingService::new(recording).run(command_rx));
        let coordinator = tokio::spawn(CallCoordinator::new(calls.clone(), commands, coordinator).run(event_rx));

        Self {
            calls,
            events,
            coordinator,
            recorder,
        }
    }

    pub fn calls(&self) -> &CallManager {
        &self.calls
    }

    /// Hand a telephony event to the coordinator
    pub fn deliver(&self, event: TelephonyEvent) -> AppResult<()> {
        self.events
            .send(event)
            .map_err(|e| AppError::Telephony(format!("coordinator is gone, dropped {:?}", e.0)))
    }

    /// Close the telephony channel and wait for both services to finish
    ///
    /// The coordinator drains its events first; its exit closes the command
    /// channel, which lets the recorder drain and tear down in turn.
    pub async fn shutdown(self) -> AppResult<()> {
        drop(self.events);
        self.coordinator.await?;
        self.recorder.await?;
        Ok(())
    }
}
