//! JPEG encoding of a rasterised page.
//!
//! pdfium hands back RGBA bitmaps; JPEG has no alpha channel, so pages are
//! flattened to RGB first. Quality comes from the config, default 85.

use crate::error::ConvertError;
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// Encode a rasterised page as JPEG at the given quality (1–100).
pub fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, ConvertError> {
    let rgb = img.to_rgb8();
    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(Cursor::new(&mut buf), quality);
    encoder
        .encode_image(&rgb)
        .map_err(|e| ConvertError::EncodeFailed {
            detail: format!("JPEG encoding: {e}"),
        })?;

    debug!(
        "Encoded {}x{} page → {} JPEG bytes (q={})",
        img.width(),
        img.height(),
        buf.len(),
        quality
    );
    Ok(buf)
}
