//! Configuration for conversion jobs.
//!
//! All behaviour is controlled through [`ConvertConfig`], built via its
//! [`ConvertConfigBuilder`]. Keeping every knob in one struct makes it easy
//! to share a config across jobs and to see at a glance why two runs
//! produced different artifacts.

use crate::error::ConvertError;
use crate::progress::SharedProgressCallback;
use std::fmt;

/// Configuration for a conversion job.
///
/// Built via [`ConvertConfig::builder()`] or [`ConvertConfig::default()`].
///
/// # Example
/// ```rust
/// use docshift::ConvertConfig;
///
/// let config = ConvertConfig::builder()
///     .raster_scale(2.0)
///     .jpeg_quality(85)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConvertConfig {
    /// Scale factor applied when rasterising a PDF page to an image.
    /// Range: 0.5–8.0. Default: 2.0.
    pub raster_scale: f32,

    /// JPEG quality for PDF→JPEG artifacts. Range: 1–100. Default: 85.
    pub jpeg_quality: u8,

    /// Page margin in millimetres for generated PDFs. Default: 10.0.
    pub margin_mm: f32,

    /// Width in millimetres an embedded image is scaled to on an A4 page.
    /// Default: 190.0 (A4 width minus both margins).
    pub image_width_mm: f32,

    /// Base font size in points for text flowed into generated PDFs.
    /// Default: 11.0.
    pub font_size: f32,

    /// Lay spreadsheet pages out in landscape orientation. Default: true.
    ///
    /// Sheets are wide and shallow; landscape fits roughly 40% more columns
    /// per page before truncation.
    pub sheet_landscape: bool,

    /// Optional progress callback receiving phase transitions.
    pub progress: Option<SharedProgressCallback>,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            raster_scale: 2.0,
            jpeg_quality: 85,
            margin_mm: 10.0,
            image_width_mm: 190.0,
            font_size: 11.0,
            sheet_landscape: true,
            progress: None,
        }
    }
}

impl fmt::Debug for ConvertConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConvertConfig")
            .field("raster_scale", &self.raster_scale)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("margin_mm", &self.margin_mm)
            .field("image_width_mm", &self.image_width_mm)
            .field("font_size", &self.font_size)
            .field("sheet_landscape", &self.sheet_landscape)
            .field("progress", &self.progress.as_ref().map(|_| "<dyn ProgressCallback>"))
            .finish()
    }
}

impl ConvertConfig {
    /// Create a new builder for `ConvertConfig`.
    pub fn builder() -> ConvertConfigBuilder {
        ConvertConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConvertConfig`].
#[derive(Debug)]
pub struct ConvertConfigBuilder {
    config: ConvertConfig,
}

impl ConvertConfigBuilder {
    pub fn raster_scale(mut self, scale: f32) -> Self {
        self.config.raster_scale = scale.clamp(0.5, 8.0);
        self
    }

    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.config.jpeg_quality = quality.clamp(1, 100);
        self
    }

    pub fn margin_mm(mut self, mm: f32) -> Self {
        self.config.margin_mm = mm.max(0.0);
        self
    }

    pub fn image_width_mm(mut self, mm: f32) -> Self {
        self.config.image_width_mm = mm.max(1.0);
        self
    }

    pub fn font_size(mut self, pt: f32) -> Self {
        self.config.font_size = pt.clamp(4.0, 72.0);
        self
    }

    pub fn sheet_landscape(mut self, v: bool) -> Self {
        self.config.sheet_landscape = v;
        self
    }

    pub fn progress(mut self, callback: SharedProgressCallback) -> Self {
        self.config.progress = Some(callback);
        self
    }

    /// Build the configuration, validating cross-field constraints.
    pub fn build(self) -> Result<ConvertConfig, ConvertError> {
        let c = &self.config;
        if !c.raster_scale.is_finite() || c.raster_scale <= 0.0 {
            return Err(ConvertError::InvalidConfig(format!(
                "raster_scale must be a positive number, got {}",
                c.raster_scale
            )));
        }
        if c.jpeg_quality == 0 || c.jpeg_quality > 100 {
            return Err(ConvertError::InvalidConfig(format!(
                "jpeg_quality must be 1–100, got {}",
                c.jpeg_quality
            )));
        }
        if c.image_width_mm + 2.0 * c.margin_mm > 210.0 {
            return Err(ConvertError::InvalidConfig(format!(
                "image_width_mm {} plus margins {} does not fit an A4 page",
                c.image_width_mm, c.margin_mm
            )));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_stable() {
        let c = ConvertConfig::default();
        assert_eq!(c.raster_scale, 2.0);
        assert_eq!(c.jpeg_quality, 85);
        assert!(c.sheet_landscape);
    }

    #[test]
    fn builder_clamps_out_of_range_values() {
        let c = ConvertConfig::builder()
            .raster_scale(100.0)
            .jpeg_quality(0)
            .font_size(1.0)
            .build()
            .unwrap();
        assert_eq!(c.raster_scale, 8.0);
        assert_eq!(c.jpeg_quality, 1);
        assert_eq!(c.font_size, 4.0);
    }

    #[test]
    fn oversized_image_width_rejected() {
        let mut config = ConvertConfig::default();
        config.image_width_mm = 200.0;
        config.margin_mm = 20.0;
        let err = ConvertConfigBuilder { config }.build().unwrap_err();
        assert!(matches!(err, ConvertError::InvalidConfig(_)));
    }

    #[test]
    fn debug_elides_callback() {
        use crate::progress::NoopProgressCallback;
        use std::sync::Arc;

        let c = ConvertConfig::builder()
            .progress(Arc::new(NoopProgressCallback))
            .build()
            .unwrap();
        let dbg = format!("{c:?}");
        assert!(dbg.contains("<dyn ProgressCallback>"));
    }
}
