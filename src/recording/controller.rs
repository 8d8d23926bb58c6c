//! Recording controller
//!
//! Handles start/stop commands for one recorder instance. Every failure is
//! logged and turned into a decision to keep running or to terminate; none
//! of them reach the sender of the command.

use super::command::RecordingCommand;
use super::session::{pending_media_values, recording_file_name, ControllerState, RecordingSession};
use crate::config::{RecordingSettings, SharedSettings};
use crate::platform::traits::{
    AuthorizationProvider, EngineError, ForegroundHost, MediaIndex, MediaUri, Permission, RecorderConfig,
    RecorderEngine, RecorderFactory, NOTIFICATION_PERMISSION_MIN_VERSION,
};
use chrono::Local;
use std::io;
use std::sync::Arc;
use thiserror::Error;

/// Reasons a start attempt gives up
#[derive(Error, Debug)]
pub enum RecordingError {
    #[error("Missing RECORD_AUDIO permission")]
    PermissionDenied,

    #[error("Failed to create URI for recording")]
    MediaEntryUnavailable,

    #[error("File descriptor is null for {0}")]
    OutputUnavailable(MediaUri),

    #[error("Failed to open {uri}: {source}")]
    OutputOpen {
        uri: MediaUri,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// What the host should do with the controller after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    KeepRunning,
    Terminate,
}

/// Platform collaborators the controller drives
#[derive(Clone)]
pub struct RecordingPlatform {
    pub authorization: Arc<dyn AuthorizationProvider>,
    pub media: Arc<dyn MediaIndex>,
    pub recorders: Arc<dyn RecorderFactory>,
    pub foreground: Arc<dyn ForegroundHost>,
    pub settings: SharedSettings,
}

/// A single recorder instance
pub struct RecordingController {
    platform: RecordingPlatform,
    state: ControllerState,
    session: Option<RecordingSession>,
    in_foreground: bool,
}

impl RecordingController {
    /// Create a controller with no session
    pub fn new(platform: RecordingPlatform) -> Self {
        Self {
            platform,
            state: ControllerState::Idle,
            session: None,
            in_foreground: false,
        }
    }

    /// Get the current controller state
    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Get the active session, if any
    pub fn session(&self) -> Option<&RecordingSession> {
        self.session.as_ref()
    }

    /// Whether a session is active
    pub fn is_recording(&self) -> bool {
        self.session.is_some()
    }

    /// Whether the foreground indicator is raised
    pub fn is_foreground(&self) -> bool {
        self.in_foreground
    }

    /// Handle one command
    pub async fn handle(&mut self, command: RecordingCommand) -> CommandOutcome {
        if self.state == ControllerState::Terminated {
            tracing::warn!("Ignoring {:?} for a terminated recorder", command);
            return CommandOutcome::Terminate;
        }

        match command {
            RecordingCommand::Start { auto_record_enabled } => {
                self.handle_start(auto_record_enabled).await
            }
            RecordingCommand::Stop => {
                self.stop().await;
                CommandOutcome::Terminate
            }
        }
    }

    async fn handle_start(&mut self, auto_record_enabled: bool) -> CommandOutcome {
        if let Err(e) = self.check_authorization() {
            tracing::error!("{}", e);
            return CommandOutcome::Terminate;
        }

        if self.state == ControllerState::Idle {
            self.state = ControllerState::Running;
        }

        if !auto_record_enabled {
            tracing::info!("Auto record disabled, not capturing");
            return CommandOutcome::KeepRunning;
        }

        let settings = self.platform.settings.read().recording.clone();
        self.raise_foreground(&settings);

        match self.start_recording(&settings).await {
            Ok(()) => CommandOutcome::KeepRunning,
            Err(RecordingError::Engine(EngineError::IllegalState(reason))) => {
                tracing::error!("Mic in use or recorder failed: {}", reason);
                CommandOutcome::Terminate
            }
            Err(e) => {
                tracing::error!("Recording failed: {}", e);
                CommandOutcome::Terminate
            }
        }
    }

    fn check_authorization(&self) -> Result<(), RecordingError> {
        let authorization = &self.platform.authorization;
        if !authorization.is_granted(Permission::RecordAudio) {
            return Err(RecordingError::PermissionDenied);
        }

        let version = authorization.platform_version();
        if version >= NOTIFICATION_PERMISSION_MIN_VERSION
            && !authorization.is_granted(Permission::PostNotifications)
        {
            tracing::warn!("POST_NOTIFICATIONS not granted on platform version {}", version);
        }
        Ok(())
    }

    fn raise_foreground(&mut self, settings: &RecordingSettings) {
        self.platform.foreground.start_foreground(&settings.foreground_notice());
        self.in_foreground = true;
    }

    fn lower_foreground(&mut self) {
        self.platform.foreground.stop_foreground();
        self.in_foreground = false;
    }

    async fn start_recording(&mut self, settings: &RecordingSettings) -> Result<(), RecordingError> {
        if self.session.is_some() {
            tracing::warn!("Recording already in progress");
            return Ok(());
        }

        let display_name = recording_file_name(settings, Local::now());
        let values = pending_media_values(settings, display_name.clone());
        let uri = self
            .platform
            .media
            .insert(&values)
            .ok_or(RecordingError::MediaEntryUnavailable)?;

        let engine = match self.begin_capture(&uri).await {
            Ok(engine) => engine,
            Err(e) => {
                self.dispose_failed_entry(&uri, settings);
                return Err(e);
            }
        };

        let mut session = RecordingSession::new(uri, display_name, engine);
        match self.platform.media.set_pending(&session.uri, false) {
            Ok(()) => session.pending = false,
            Err(e) => tracing::error!(uri = %session.uri, "Failed to finalize recording entry: {}", e),
        }

        tracing::info!(uri = %session.uri, "Recording started: {}", session.display_name);
        self.session = Some(session);
        self.state = ControllerState::Recording;
        Ok(())
    }

    /// Open the entry and bring a configured engine up to capturing
    async fn begin_capture(&mut self, uri: &MediaUri) -> Result<Box<dyn RecorderEngine>, RecordingError> {
        let output = match self.platform.media.open_write(uri) {
            Ok(Some(output)) => output,
            Ok(None) => return Err(RecordingError::OutputUnavailable(uri.clone())),
            Err(source) => {
                return Err(RecordingError::OutputOpen {
                    uri: uri.clone(),
                    source,
                })
            }
        };

        let mut engine = self.platform.recorders.create();
        let started: Result<(), EngineError> = async {
            engine.configure(&RecorderConfig::voice_call(), output)?;
            engine.prepare().await?;
            engine.start().await
        }
        .await;

        match started {
            Ok(()) => Ok(engine),
            Err(e) => {
                engine.release();
                Err(e.into())
            }
        }
    }

    fn dispose_failed_entry(&self, uri: &MediaUri, settings: &RecordingSettings) {
        if !settings.discard_failed_entries {
            tracing::warn!(%uri, "Pending recording entry left behind");
            return;
        }
        match self.platform.media.delete(uri) {
            Ok(()) => tracing::info!(%uri, "Discarded pending recording entry"),
            Err(e) => tracing::error!(%uri, "Failed to discard pending recording entry: {}", e),
        }
    }

    /// Stop and release the active session, if any
    pub async fn stop(&mut self) {
        let Some(mut session) = self.session.take() else {
            tracing::debug!("Stop requested with no recording in progress");
            return;
        };

        if let Err(e) = session.engine.stop().await {
            tracing::error!(uri = %session.uri, "Stop failed: {}", e);
        }
        session.engine.release();
        if session.pending {
            self.settle_pending_entry(&mut session);
        }

        tracing::info!(
            uri = %session.uri,
            "Recording stopped after {}ms",
            session.duration_ms()
        );
        self.lower_foreground();
        self.state = ControllerState::Running;
    }

    /// Commit an entry whose finalize failed at start, or dispose of it
    fn settle_pending_entry(&self, session: &mut RecordingSession) {
        match self.platform.media.set_pending(&session.uri, false) {
            Ok(()) => {
                session.pending = false;
                tracing::info!(uri = %session.uri, "Recording entry finalized on stop");
            }
            Err(e) => {
                tracing::error!(uri = %session.uri, "Failed to finalize recording entry on stop: {}", e);
                let settings = self.platform.settings.read().recording.clone();
                self.dispose_failed_entry(&session.uri, &settings);
            }
        }
    }

    /// Release everything before the instance goes away
    pub async fn teardown(&mut self) {
        self.stop().await;
        if self.in_foreground {
            self.lower_foreground();
        }
        self.state = ControllerState::Terminated;
    }
}
