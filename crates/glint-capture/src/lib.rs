//! Capture agent: a sequential capture-and-send loop that screenshots a
//! target and submits each frame to the backend, with at most one frame
//! in flight at any time.

pub mod agent;
pub mod error;
pub mod session;
pub mod sink;
pub mod source;

pub use agent::{CaptureAgent, CaptureCommand, CaptureHandle};
pub use error::CaptureError;
pub use session::{CaptureSession, CaptureStatus};
pub use sink::{FrameSink, HttpFrameSink, SubmitOutcome};
pub use source::{Frame, FrameSource, ScreenFrameSource};
