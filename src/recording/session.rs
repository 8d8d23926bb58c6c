//! Recording session state
//!
//! A controller owns at most one session at a time.

use crate::config::RecordingSettings;
use crate::platform::traits::{MediaUri, MediaValues, RecorderEngine};
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Current state of a recording controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControllerState {
    /// Created, no command handled yet
    #[default]
    Idle,
    /// Alive, hosting the foreground status or waiting for commands
    Running,
    /// Capturing audio
    Recording,
    /// Torn down; the instance must be dropped
    Terminated,
}

/// Display name for a recording started at `now`
pub fn recording_file_name(settings: &RecordingSettings, now: DateTime<Local>) -> String {
    format!(
        "{}{}.{}",
        settings.file_prefix,
        now.format("%Y%m%d_%H%M%S"),
        settings.file_extension
    )
}

/// Media-index insert request for a new pending recording
pub fn pending_media_values(settings: &RecordingSettings, display_name: String) -> MediaValues {
    MediaValues {
        display_name,
        mime_type: settings.mime_type.clone(),
        relative_path: settings.relative_path.clone(),
        is_pending: true,
    }
}

/// An in-flight recording
pub struct RecordingSession {
    pub uri: MediaUri,
    pub display_name: String,
    /// False once the media entry has been committed
    pub pending: bool,
    pub started_at: DateTime<Utc>,
    pub(crate) engine: Box<dyn RecorderEngine>,
}

impl RecordingSession {
    pub(crate) fn new(uri: MediaUri, display_name: String, engine: Box<dyn RecorderEngine>) -> Self {
        Self {
            uri,
            display_name,
            pending: true,
            started_at: Utc::now(),
            engine,
        }
    }

    pub fn duration_ms(&self) -> i64 {
        (Utc::now() - self.started_at).num_milliseconds()
    }
}

impl fmt::Debug for RecordingSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingSession")
            .field("uri", &self.uri)
            .field("display_name", &self.display_name)
            .field("pending", &self.pending)
            .field("started_at", &self.started_at)
            .finish_non_exhaustive()
    }
}
