//! Dialer service settings
//!
//! Persisted as JSON. Missing fields fall back to their defaults so older
//! settings files keep loading.

use crate::platform::traits::{ForegroundNotice, NotificationChannel, NotificationImportance};
use crate::utils::error::{AppError, AppResult};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Settings shared between the services and whoever edits preferences
pub type SharedSettings = Arc<RwLock<DialerSettings>>;

/// User preferences for the call services
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialerSettings {
    /// Record every call automatically
    #[serde(default = "default_true")]
    pub auto_record_enabled: bool,

    /// Always present calls full screen, even on an unlocked, awake device
    #[serde(default)]
    pub always_show_fullscreen: bool,

    #[serde(default)]
    pub recording: RecordingSettings,
}

impl Default for DialerSettings {
    fn default() -> Self {
        Self {
            auto_record_enabled: true,
            always_show_fullscreen: false,
            recording: RecordingSettings::default(),
        }
    }
}

impl DialerSettings {
    pub fn shared(self) -> SharedSettings {
        Arc::new(RwLock::new(self))
    }
}

/// Where and how recordings are stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordingSettings {
    pub file_prefix: String,
    pub file_extension: String,
    pub mime_type: String,
    pub relative_path: String,
    pub foreground_id: u32,
    pub channel_id: String,
    pub channel_name: String,
    /// Delete the pending entry when a start attempt fails after insert
    pub discard_failed_entries: bool,
}

impl Default for RecordingSettings {
    fn default() -> Self {
        Self {
            file_prefix: "CallRecord_".to_string(),
            file_extension: "m4a".to_string(),
            mime_type: "audio/mp4".to_string(),
            relative_path: "Music/CallRecordings".to_string(),
            foreground_id: 101,
            channel_id: "call_recording_channel".to_string(),
            channel_name: "Call Recording".to_string(),
            discard_failed_entries: false,
        }
    }
}

impl RecordingSettings {
    /// Ongoing notice shown while a recording is in progress
    pub fn foreground_notice(&self) -> ForegroundNotice {
        ForegroundNotice {
            id: self.foreground_id,
            channel: NotificationChannel {
                id: self.channel_id.clone(),
                name: self.channel_name.clone(),
                importance: NotificationImportance::Low,
            },
            title: "Call Recording".to_string(),
            text: "Recording call in progress".to_string(),
            ongoing: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Read settings from `path`
pub fn load(path: &Path) -> AppResult<DialerSettings> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Read settings, falling back to defaults when the file is missing or unreadable
pub fn load_or_default(path: &Path) -> DialerSettings {
    match load(path) {
        Ok(settings) => settings,
        Err(AppError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => DialerSettings::default(),
        Err(e) => {
            tracing::warn!("Ignoring settings at {:?}: {}", path, e);
            DialerSettings::default()
        }
    }
}

/// Write settings as pretty JSON, creating parent directories
pub fn save(path: &Path, settings: &DialerSettings) -> AppResult<()> {
    let parent = path
        .parent()
        .ok_or_else(|| AppError::Settings(format!("{:?} has no parent directory", path)))?;
    fs::create_dir_all(parent)?;
    let contents = serde_json::to_string_pretty(settings)?;
    fs::write(path, contents)?;
    Ok(())
}
