//! Platform integration
//!
//! Traits for every operating-system collaborator, plus a filesystem-backed
//! media index.

pub mod fs_media;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use fs_media::{FsMediaIndex, MediaRecord};
pub use traits::{
    AuthorizationProvider, CallNotifier, CallScreenLauncher, DeviceStatus, EngineError, ForegroundHost,
    ForegroundNotice, LaunchResult, MediaIndex, MediaUri, MediaValues, OutputHandle, Permission, RecorderConfig,
    RecorderEngine, RecorderFactory,
};
