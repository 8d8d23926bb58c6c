//! Commands sent to the recording service
//!
//! Delivery is FIFO and fire-and-forget: the sender never learns whether
//! a session actually started or stopped.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum RecordingCommand {
    #[serde(rename = "START_RECORDING")]
    Start {
        #[serde(rename = "autoRecordEnabled", default = "default_auto_record")]
        auto_record_enabled: bool,
    },
    #[serde(rename = "STOP_RECORDING")]
    Stop,
}

fn default_auto_record() -> bool {
    true
}

pub type RecordingCommandReceiver = mpsc::UnboundedReceiver<RecordingCommand>;

/// Sending half of the command channel
#[derive(Debug, Clone)]
pub struct RecordingCommandSender {
    tx: mpsc::UnboundedSender<RecordingCommand>,
}

impl RecordingCommandSender {
    /// Ask the recorder to start
    pub fn start(&self, auto_record_enabled: bool) {
        self.send(RecordingCommand::Start { auto_record_enabled });
    }

    /// Ask the recorder to stop
    pub fn stop(&self) {
        self.send(RecordingCommand::Stop);
    }

    /// Queue a command; a closed channel is logged and ignored
    pub fn send(&self, command: RecordingCommand) {
        if self.tx.send(command).is_err() {
            tracing::warn!("Recording service is gone, dropping {:?}", command);
        }
    }
}

/// Create the command channel between the call coordinator and the recorder
pub fn command_channel() -> (RecordingCommandSender, RecordingCommandReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (RecordingCommandSender { tx }, rx)
}
