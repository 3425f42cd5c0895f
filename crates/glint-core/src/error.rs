/// Failure taxonomy for the synchronization engine. There is no fatal
/// class: every variant is either retried on the next scheduled cycle or
/// absorbed into a passive UI state.
#[derive(Clone, Debug, thiserror::Error)]
pub enum SyncError {
    // Retried next cycle
    #[error("network error: {0}")]
    Network(String),
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    // Degrades to in-memory state
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    // Ends the capture loop gracefully
    #[error("capture target lost")]
    TargetLost,

    // Retried on a later render
    #[error("render backend not ready: {0}")]
    BackendNotReady(String),
    #[error("render failed: {0}")]
    RenderFailed(String),
}

impl SyncError {
    /// True for failures that the next poll cycle retries silently.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Network(_)
                | Self::MalformedPayload(_)
                | Self::BackendNotReady(_)
                | Self::RenderFailed(_)
        )
    }

    /// Short classification string for structured logging.
    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::MalformedPayload(_) => "malformed_payload",
            Self::StorageUnavailable(_) => "storage_unavailable",
            Self::TargetLost => "target_lost",
            Self::BackendNotReady(_) => "backend_not_ready",
            Self::RenderFailed(_) => "render_failed",
        }
    }
}
