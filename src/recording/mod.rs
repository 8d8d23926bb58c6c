//! Call recording
//!
//! - `command`: the FIFO command channel into the recorder
//! - `controller`: one recorder instance and its start/stop handling
//! - `service`: hosts controller instances and serves the channel
//! - `session`: session state and file naming

pub mod command;
pub mod controller;
pub mod service;
pub mod session;

pub use command::{command_channel, RecordingCommand, RecordingCommandReceiver, RecordingCommandSender};
pub use controller::{CommandOutcome, RecordingController, RecordingError, RecordingPlatform};
pub use service::RecordingService;
pub use session::{ControllerState, RecordingSession};
