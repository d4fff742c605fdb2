//! Conversion artifacts and how they leave the process.
//!
//! An [`Artifact`] is the in-memory result of a conversion: final bytes, a
//! suggested file name derived from the input's stem, and a MIME type. It can
//! leave the process two ways:
//!
//! * [`Artifact::write_to`] — save to disk. Atomic (temp file + rename) so a
//!   failed job never leaves a partial output behind.
//! * [`Artifact::to_data_url`] — a `data:` URL for callers that embed the
//!   result instead of saving it.

use crate::error::ConvertError;
use crate::format::TargetFormat;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::Path;
use tracing::debug;

/// The in-memory binary result of a conversion, prior to emission.
#[derive(Debug, Clone)]
pub struct Artifact {
    bytes: Vec<u8>,
    file_name: String,
    mime_type: &'static str,
}

impl Artifact {
    /// Build an artifact for `target`, naming it after the input file's stem.
    pub fn new(bytes: Vec<u8>, input_path: &Path, target: TargetFormat) -> Self {
        let stem = input_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("converted");
        Self {
            bytes,
            file_name: format!("{stem}.{}", target.extension()),
            mime_type: target.mime_type(),
        }
    }

    /// Suggested file name (input stem + target extension).
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// MIME type of the artifact bytes.
    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }

    /// Raw artifact bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Size of the artifact in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Consume the artifact, returning its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Render the artifact as a base64 `data:` URL.
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type,
            STANDARD.encode(&self.bytes)
        )
    }

    /// Write the artifact to `path` atomically (temp file + rename).
    ///
    /// A crash or error mid-write leaves at most a `.tmp` file behind, never
    /// a truncated output at the destination path.
    pub async fn write_to(&self, path: impl AsRef<Path>) -> Result<(), ConvertError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    ConvertError::OutputWriteFailed {
                        path: path.to_path_buf(),
                        source: e,
                    }
                })?;
            }
        }

        // Keep the destination extension in the staging name so siblings
        // sharing a stem ("report.pdf", "report.epub") never collide.
        let tmp_path = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => path.with_extension(format!("{ext}.tmp")),
            None => path.with_extension("tmp"),
        };
        tokio::fs::write(&tmp_path, &self.bytes).await.map_err(|e| {
            ConvertError::OutputWriteFailed {
                path: path.to_path_buf(),
                source: e,
            }
        })?;

        tokio::fs::rename(&tmp_path, path).await.map_err(|e| {
            ConvertError::OutputWriteFailed {
                path: path.to_path_buf(),
                source: e,
            }
        })?;

        debug!("Wrote {} bytes to {}", self.bytes.len(), path.display());
        Ok(())
    }
}
