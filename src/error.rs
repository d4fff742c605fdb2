//! Error types for the docshift library.
//!
//! The taxonomy separates three distinct situations a caller reacts to
//! differently:
//!
//! * **User-input errors** — the job never starts (missing file, empty file,
//!   bytes nobody can identify). Fix the input and try again.
//! * **Capability errors** — the requested `(source, target)` pair is not
//!   something this tool does ([`ConvertError::UnsupportedConversion`]).
//!   Reported before any collaborator library is touched.
//! * **Pipeline failures** — decode, render, or encode went wrong mid-job.
//!   Tagged per stage so callers can tell "your file is corrupt" apart from
//!   "the PDF builder choked".

use crate::format::{SourceFormat, TargetFormat};
use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the docshift library.
#[derive(Debug, Error)]
pub enum ConvertError {
    // ── User-input errors ─────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists but contains zero bytes.
    #[error("Input file is empty: '{path}'")]
    EmptyInput { path: PathBuf },

    /// The file's leading bytes match no format this tool can read.
    #[error("Unrecognized input format for '{path}'\nFirst bytes: {magic:?}\nSupported inputs: PDF, PNG/JPEG/GIF/BMP images, DOCX, XLSX.")]
    UnrecognizedInput { path: PathBuf, magic: [u8; 4] },

    // ── Capability errors ─────────────────────────────────────────────────
    /// The `(source, target)` pair is outside the supported conversion matrix.
    ///
    /// Returned before any decoding or layout collaborator is invoked.
    #[error("Converting {from} to {to} is not supported.\nSupported: pdf→epub, pdf→jpeg, image→pdf, docx→pdf, xlsx→pdf.")]
    UnsupportedConversion {
        from: SourceFormat,
        to: TargetFormat,
    },

    // ── Pipeline failures ─────────────────────────────────────────────────
    /// The source document could not be parsed or rasterised.
    #[error("Failed to decode {format} input: {detail}")]
    DecodeFailed {
        format: SourceFormat,
        detail: String,
    },

    /// Building the output document (page layout, text flow, image embed) failed.
    #[error("Failed to render output document: {detail}")]
    RenderFailed { detail: String },

    /// Final byte-encoding of the artifact failed.
    #[error("Failed to encode output artifact: {detail}")]
    EncodeFailed { detail: String },

    // ── Job guard ─────────────────────────────────────────────────────────
    /// A conversion is already running on this [`crate::Converter`].
    ///
    /// Jobs are single-flight: a second request is rejected, never queued or
    /// interleaved with the running one.
    #[error("A conversion job is already in flight; wait for it to finish before starting another.")]
    JobInFlight,

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error (task panic, runtime construction failure).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConvertError {
    /// True for errors caused by the caller's input, where the job never
    /// started and retrying with the same input cannot succeed.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            ConvertError::FileNotFound { .. }
                | ConvertError::PermissionDenied { .. }
                | ConvertError::EmptyInput { .. }
                | ConvertError::UnrecognizedInput { .. }
                | ConvertError::UnsupportedConversion { .. }
        )
    }
}
