//! Recording service host
//!
//! Plays the part of the OS service lifecycle: a controller instance is
//! created on demand for the next command, and torn down and dropped as
//! soon as it asks to terminate. Commands are handled one at a time in
//! arrival order.

use super::command::{RecordingCommand, RecordingCommandReceiver};
use super::controller::{CommandOutcome, RecordingController, RecordingPlatform};

pub struct RecordingService {
    platform: RecordingPlatform,
    controller: Option<RecordingController>,
    instances_created: usize,
}

impl RecordingService {
    /// Create a service with no live controller
    pub fn new(platform: RecordingPlatform) -> Self {
        Self {
            platform,
            controller: None,
            instances_created: 0,
        }
    }

    /// The live controller, if one is running
    pub fn controller(&self) -> Option<&RecordingController> {
        self.controller.as_ref()
    }

    /// Get how many controllers have been created so far
    pub fn instances_created(&self) -> usize {
        self.instances_created
    }

    /// Deliver one command, creating a controller if none is alive
    pub async fn dispatch(&mut self, command: RecordingCommand) {
        let platform = &self.platform;
        let created = &mut self.instances_created;
        let controller = self.controller.get_or_insert_with(|| {
            tracing::debug!("Creating recording controller");
            *created += 1;
            RecordingController::new(platform.clone())
        });

        if controller.handle(command).await == CommandOutcome::Terminate {
            self.shutdown().await;
        }
    }

    /// Tear down and drop the live controller
    pub async fn shutdown(&mut self) {
        if let Some(mut controller) = self.controller.take() {
            controller.teardown().await;
            tracing::debug!("Recording controller destroyed");
        }
    }

    /// Serve commands until every sender is gone
    pub async fn run(mut self, mut commands: RecordingCommandReceiver) {
        tracing::info!("Recording service started");
        while let Some(command) = commands.recv().await {
            self.dispatch(command).await;
        }
        self.shutdown().await;
        tracing::info!("Recording service stopped");
    }
}
