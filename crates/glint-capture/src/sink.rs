use std::time::Duration;

use async_trait::async_trait;
use glint_core::TargetId;
use serde::{Deserialize, Serialize};

use crate::error::CaptureError;
use crate::source::Frame;

/// Frame submission endpoint, relative to the API base.
pub const SUBMIT_PATH: &str = "/receive_screenshot";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// How the receiver disposed of a frame. All three are normal loop
/// completions; `Busy` just means the receiver is holding its current
/// content and this frame was dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted { changed: bool },
    NoCodeDetected,
    Busy,
}

/// Receives captured frames.
#[async_trait]
pub trait FrameSink: Send + Sync {
    async fn submit(&self, target: &TargetId, frame: &Frame) -> Result<SubmitOutcome, CaptureError>;
}

#[derive(Serialize)]
struct SubmitRequest<'a> {
    tab_id: &'a str,
    image: &'a str,
}

#[derive(Default, Deserialize)]
struct SubmitResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    changed: bool,
    #[serde(default)]
    locked: bool,
}

/// HTTP sink posting frames to the backend.
pub struct HttpFrameSink {
    client: reqwest::Client,
    url: String,
}

impl HttpFrameSink {
    pub fn new(base: impl Into<String>) -> Result<Self, CaptureError> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| CaptureError::Transmit(e.to_string()))?;
        Ok(Self {
            client,
            url: format!("{}{}", base.into().trim_end_matches('/'), SUBMIT_PATH),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl FrameSink for HttpFrameSink {
    async fn submit(&self, target: &TargetId, frame: &Frame) -> Result<SubmitOutcome, CaptureError> {
        let response = self
            .client
            .post(&self.url)
            .json(&SubmitRequest {
                tab_id: target.as_str(),
                image: &frame.image_data,
            })
            .send()
            .await
            .map_err(|e| CaptureError::Transmit(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::LOCKED {
            return Ok(SubmitOutcome::Busy);
        }
        if !status.is_success() {
            return Err(CaptureError::Transmit(format!("receiver returned {status}")));
        }

        // A success status with an unreadable body still counts as handled.
        let body: SubmitResponse = response.json().await.unwrap_or_default();
        if body.locked {
            return Ok(SubmitOutcome::Busy);
        }
        if body.success {
            Ok(SubmitOutcome::Accepted {
                changed: body.changed,
            })
        } else {
            Ok(SubmitOutcome::NoCodeDetected)
        }
    }
}
