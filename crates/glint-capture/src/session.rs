use glint_core::TargetId;
use serde::{Deserialize, Serialize};

/// Capture loop state. `in_flight` guards the one-outstanding-frame
/// invariant: a new capture never starts while a frame is being sent.
#[derive(Clone, Debug, Default)]
pub struct CaptureSession {
    pub active: bool,
    pub target: Option<TargetId>,
    pub in_flight: bool,
}

impl CaptureSession {
    pub fn start(&mut self, target: TargetId) {
        self.active = true;
        self.target = Some(target);
    }

    pub fn stop(&mut self) {
        self.active = false;
        self.target = None;
    }
}

/// Snapshot reported to controllers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureStatus {
    pub running: bool,
    pub target: Option<TargetId>,
}
