//! Encoding captured frames for submission and for the history preview.

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use image::codecs::jpeg::JpegEncoder;

use super::{CaptureTrigger, Frame};

/// A frame that passed the gate, encoded and ready to submit.
#[derive(Debug, Clone)]
pub struct CaptureEvent {
    pub timestamp: DateTime<Utc>,
    pub trigger: CaptureTrigger,
    pub image_bytes: Vec<u8>,
}

impl CaptureEvent {
    pub fn file_name(&self) -> String {
        format!("capture-{}.jpg", self.timestamp.timestamp_millis())
    }
}

pub fn encode_jpeg(frame: &Frame, quality: u8) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    let quality = quality.clamp(1, 100);
    JpegEncoder::new_with_quality(&mut bytes, quality)
        .encode_image(&frame.image)
        .context("failed to encode frame as JPEG")?;
    Ok(bytes)
}

pub fn data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_encode_produces_jpeg() {
        let frame = Frame::new(RgbImage::from_pixel(16, 8, Rgb([10, 200, 30])));
        let bytes = encode_jpeg(&frame, 80).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        assert_eq!(image::guess_format(&bytes).unwrap(), image::ImageFormat::Jpeg);
    }

    #[test]
    fn test_data_url_prefix() {
        assert_eq!(data_url("image/jpeg", b"abc"), "data:image/jpeg;base64,YWJj");
    }
}
