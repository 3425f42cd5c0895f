use std::time::Duration;

use glint_core::TargetId;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, trace};

use crate::error::CaptureError;
use crate::session::{CaptureSession, CaptureStatus};
use crate::sink::{FrameSink, SubmitOutcome};
use crate::source::FrameSource;

/// Pause after a completed send before the next capture, so control
/// commands and the host stay responsive.
pub const YIELD_DELAY: Duration = Duration::from_millis(50);
/// Pause after a failed capture before retrying.
pub const RETRY_DELAY: Duration = Duration::from_millis(500);

const COMMAND_BUFFER: usize = 16;

/// Control commands for a running agent.
#[derive(Debug)]
pub enum CaptureCommand {
    Start {
        target: TargetId,
        reply: oneshot::Sender<CaptureStatus>,
    },
    Stop {
        reply: oneshot::Sender<CaptureStatus>,
    },
    Status {
        reply: oneshot::Sender<CaptureStatus>,
    },
}

/// Clonable control handle for a [`CaptureAgent`].
#[derive(Clone)]
pub struct CaptureHandle {
    commands: mpsc::Sender<CaptureCommand>,
}

impl CaptureHandle {
    pub async fn start(&self, target: TargetId) -> Option<CaptureStatus> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(CaptureCommand::Start { target, reply })
            .await
            .ok()?;
        rx.await.ok()
    }

    pub async fn stop(&self) -> Option<CaptureStatus> {
        let (reply, rx) = oneshot::channel();
        self.commands.send(CaptureCommand::Stop { reply }).await.ok()?;
        rx.await.ok()
    }

    pub async fn status(&self) -> Option<CaptureStatus> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(CaptureCommand::Status { reply })
            .await
            .ok()?;
        rx.await.ok()
    }
}

/// The capture-and-send loop. Strictly sequential: capture, submit, short
/// yield, repeat. Control commands are applied between steps and during
/// the pauses, never mid-step, so a stop issued during a send applies
/// after that send completes and no frame is ever abandoned half-way.
pub struct CaptureAgent<F, K> {
    source: F,
    sink: K,
    session: CaptureSession,
    commands: mpsc::Receiver<CaptureCommand>,
    yield_delay: Duration,
    retry_delay: Duration,
}

impl<F, K> CaptureAgent<F, K>
where
    F: FrameSource,
    K: FrameSink,
{
    pub fn new(source: F, sink: K) -> (Self, CaptureHandle) {
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let agent = Self {
            source,
            sink,
            session: CaptureSession::default(),
            commands: rx,
            yield_delay: YIELD_DELAY,
            retry_delay: RETRY_DELAY,
        };
        (agent, CaptureHandle { commands: tx })
    }

    /// Shrink the loop delays. Used by tests.
    pub fn with_delays(mut self, yield_delay: Duration, retry_delay: Duration) -> Self {
        self.yield_delay = yield_delay;
        self.retry_delay = retry_delay;
        self
    }

    pub async fn run(mut self) {
        loop {
            if !self.session.active {
                match self.commands.recv().await {
                    Some(command) => self.handle(command),
                    None => return,
                }
                continue;
            }

            // Apply everything queued before committing to another step.
            loop {
                match self.commands.try_recv() {
                    Ok(command) => self.handle(command),
                    Err(mpsc::error::TryRecvError::Empty) => break,
                    Err(mpsc::error::TryRecvError::Disconnected) => return,
                }
            }

            if self.session.active {
                self.step().await;
            }
        }
    }

    fn handle(&mut self, command: CaptureCommand) {
        match command {
            CaptureCommand::Start { target, reply } => {
                info!(target_id = %target, "capture session started");
                self.session.start(target);
                let _ = reply.send(self.status());
            }
            CaptureCommand::Stop { reply } => {
                if self.session.active {
                    info!("capture session stopped");
                }
                self.session.stop();
                let _ = reply.send(self.status());
            }
            CaptureCommand::Status { reply } => {
                let _ = reply.send(self.status());
            }
        }
    }

    fn status(&self) -> CaptureStatus {
        CaptureStatus {
            running: self.session.active,
            target: self.session.target.clone(),
        }
    }

    async fn step(&mut self) {
        let Some(target) = self.session.target.clone() else {
            self.session.active = false;
            return;
        };

        debug_assert!(!self.session.in_flight, "capture step reentered");
        self.session.in_flight = true;

        let frame = match self.source.capture(&target).await {
            Ok(frame) => frame,
            Err(CaptureError::TargetLost) => {
                info!(target_id = %target, "capture target lost, ending session");
                self.session.stop();
                self.session.in_flight = false;
                return;
            }
            Err(e) => {
                debug!(error = %e, target_id = %target, "frame capture failed, will retry");
                self.session.in_flight = false;
                self.pause(self.retry_delay).await;
                return;
            }
        };

        match self.sink.submit(&target, &frame).await {
            Ok(SubmitOutcome::Accepted { changed }) => {
                trace!(target_id = %target, changed, "frame accepted")
            }
            Ok(SubmitOutcome::NoCodeDetected) => {
                trace!(target_id = %target, "no code detected in frame")
            }
            Ok(SubmitOutcome::Busy) => {
                debug!(target_id = %target, "receiver busy, frame dropped")
            }
            Err(e) => debug!(error = %e, target_id = %target, "frame transmit failed"),
        }

        self.session.in_flight = false;
        self.pause(self.yield_delay).await;
    }

    /// Sleep out the full duration while still answering control commands.
    /// Only runs between steps, so a command applied here never touches an
    /// in-flight frame.
    async fn pause(&mut self, duration: Duration) {
        let deadline = tokio::time::sleep(duration);
        tokio::pin!(deadline);
        loop {
            tokio::select! {
                _ = &mut deadline => return,
                command = self.commands.recv() => match command {
                    Some(command) => self.handle(command),
                    None => return,
                },
            }
        }
    }
}
