/// Failure taxonomy for the capture loop. Only `TargetLost` ends a
/// session; everything else is retried or skipped.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("capture target lost")]
    TargetLost,
    #[error("target not capturable: {0}")]
    NotCapturable(String),
    #[error("frame encode failed: {0}")]
    Encode(String),
    #[error("frame transmit failed: {0}")]
    Transmit(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(CaptureError::TargetLost.to_string(), "capture target lost");
        assert_eq!(
            CaptureError::Transmit("503".into()).to_string(),
            "frame transmit failed: 503"
        );
    }
}
