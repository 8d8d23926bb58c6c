//! Platform collaborator traits
//!
//! Everything the services need from the operating system sits behind the
//! traits in this module: authorization checks, the media index, the
//! recorder engine, foreground status, notifications, device state and
//! the full-screen call screen.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Write};
use thiserror::Error;

/// First platform version that gates notifications behind a runtime permission
pub const NOTIFICATION_PERMISSION_MIN_VERSION: u32 = 33;

/// Runtime permissions queried before recording
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    RecordAudio,
    PostNotifications,
}

/// Synchronous authorization checks
pub trait AuthorizationProvider: Send + Sync {
    fn is_granted(&self, permission: Permission) -> bool;

    /// Platform API level
    fn platform_version(&self) -> u32;
}

/// Opaque identity of a media-index entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaUri(String);

impl MediaUri {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MediaUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Insert request for the media index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaValues {
    pub display_name: String,
    pub mime_type: String,
    pub relative_path: String,
    pub is_pending: bool,
}

/// Write-capable handle to a media-index entry
pub struct OutputHandle {
    uri: MediaUri,
    writer: Box<dyn Write + Send>,
}

impl OutputHandle {
    pub fn new(uri: MediaUri, writer: Box<dyn Write + Send>) -> Self {
        Self { uri, writer }
    }

    pub fn uri(&self) -> &MediaUri {
        &self.uri
    }
}

impl Write for OutputHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

impl fmt::Debug for OutputHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputHandle").field("uri", &self.uri).finish()
    }
}

/// The platform's media index
pub trait MediaIndex: Send + Sync {
    /// Create an entry; `None` when the index refuses to allocate one
    fn insert(&self, values: &MediaValues) -> Option<MediaUri>;

    /// Open an entry for writing; `Ok(None)` when no descriptor is available
    fn open_write(&self, uri: &MediaUri) -> io::Result<Option<OutputHandle>>;

    fn set_pending(&self, uri: &MediaUri, pending: bool) -> io::Result<()>;

    fn delete(&self, uri: &MediaUri) -> io::Result<()>;
}

/// Capture source for the recorder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioSource {
    Mic,
    VoiceCommunication,
    VoiceCall,
}

/// Container written by the recorder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Mpeg4,
    ThreeGpp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioEncoder {
    Aac,
    AmrNb,
}

/// Recorder configuration applied before `prepare`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecorderConfig {
    pub source: AudioSource,
    pub format: OutputFormat,
    pub encoder: AudioEncoder,
}

impl RecorderConfig {
    /// Voice-communication audio in an AAC/MPEG-4 container
    pub fn voice_call() -> Self {
        Self {
            source: AudioSource::VoiceCommunication,
            format: OutputFormat::Mpeg4,
            encoder: AudioEncoder::Aac,
        }
    }
}

/// Recorder engine failures
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The engine refused in its current state, e.g. microphone in use
    #[error("Illegal state: {0}")]
    IllegalState(String),
}

/// A single-use audio recorder
#[async_trait]
pub trait RecorderEngine: Send {
    fn configure(&mut self, config: &RecorderConfig, output: OutputHandle) -> Result<(), EngineError>;

    async fn prepare(&mut self) -> Result<(), EngineError>;

    async fn start(&mut self) -> Result<(), EngineError>;

    async fn stop(&mut self) -> Result<(), EngineError>;

    /// Free engine resources; the engine is unusable afterwards
    fn release(&mut self);
}

/// Creates recorder engines
pub trait RecorderFactory: Send + Sync {
    fn create(&self) -> Box<dyn RecorderEngine>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationImportance {
    Low,
    Default,
    High,
}

/// Notification channel the foreground indicator is posted on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationChannel {
    pub id: String,
    pub name: String,
    pub importance: NotificationImportance,
}

/// Minimal ongoing notification that keeps the recorder process alive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForegroundNotice {
    pub id: u32,
    pub channel: NotificationChannel,
    pub title: String,
    pub text: String,
    pub ongoing: bool,
}

/// Foreground status of the recorder process
pub trait ForegroundHost: Send + Sync {
    /// Create the notice's channel if needed and enter the foreground
    fn start_foreground(&self, notice: &ForegroundNotice);

    /// Leave the foreground and remove the notice
    fn stop_foreground(&self);
}

/// The dialer's call notification
pub trait CallNotifier: Send + Sync {
    /// Show or refresh; `urgent` allows full-screen presentation
    fn setup_notification(&self, urgent: bool);

    fn cancel_notification(&self);
}

/// Outcome of launching the full-screen call screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchResult {
    Launched,
    Failed(String),
}

pub trait CallScreenLauncher: Send + Sync {
    fn launch(&self) -> LaunchResult;
}

/// Screen and keyguard state
pub trait DeviceStatus: Send + Sync {
    fn is_interactive(&self) -> bool;

    fn is_device_locked(&self) -> bool;
}
