use std::io::Cursor;

use async_trait::async_trait;
use base64::prelude::{Engine as _, BASE64_STANDARD};
use glint_core::TargetId;
use screenshots::Screen;

use crate::error::CaptureError;

/// One captured frame, already encoded for the wire as a PNG data URL.
#[derive(Clone, Debug)]
pub struct Frame {
    pub image_data: String,
}

/// Produces frames of a capture target.
#[async_trait]
pub trait FrameSource: Send + Sync {
    /// Capture the target once. `Err(TargetLost)` means the target is
    /// gone for good and the session should end.
    async fn capture(&self, target: &TargetId) -> Result<Frame, CaptureError>;
}

/// Captures the display containing a fixed point. The default point
/// (0, 0) selects the primary display.
pub struct ScreenFrameSource {
    x: i32,
    y: i32,
}

impl ScreenFrameSource {
    pub fn primary() -> Self {
        Self { x: 0, y: 0 }
    }

    pub fn at_point(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[async_trait]
impl FrameSource for ScreenFrameSource {
    async fn capture(&self, target: &TargetId) -> Result<Frame, CaptureError> {
        tracing::trace!(target_id = %target, "capturing display frame");
        let (x, y) = (self.x, self.y);
        let image = tokio::task::spawn_blocking(move || {
            let screen = Screen::from_point(x, y).map_err(|_| CaptureError::TargetLost)?;
            screen
                .capture()
                .map_err(|e| CaptureError::NotCapturable(e.to_string()))
        })
        .await
        .map_err(|e| CaptureError::NotCapturable(e.to_string()))??;
        encode_frame(&image)
    }
}

/// PNG-encode a captured image and wrap it as a data URL.
pub fn encode_frame(image: &image::RgbaImage) -> Result<Frame, CaptureError> {
    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), image::ImageOutputFormat::Png)
        .map_err(|e| CaptureError::Encode(e.to_string()))?;
    Ok(Frame {
        image_data: format!("data:image/png;base64,{}", BASE64_STANDARD.encode(&png)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_produces_png_data_url() {
        let image = image::RgbaImage::from_pixel(4, 4, image::Rgba([255, 0, 0, 255]));
        let frame = encode_frame(&image).unwrap();

        assert!(frame.image_data.starts_with("data:image/png;base64,"));
        let payload = frame.image_data.trim_start_matches("data:image/png;base64,");
        let bytes = BASE64_STANDARD.decode(payload).unwrap();
        // PNG signature
        assert_eq!(&bytes[..4], &[0x89, b'P', b'N', b'G']);
    }
}
