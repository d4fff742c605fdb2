//! Source and target format tags.
//!
//! The pipeline dispatches on a `(SourceFormat, TargetFormat)` pair.
//! Source formats are detected from leading magic bytes rather than trusted
//! from the file extension — DOCX and XLSX are both ZIP containers, so for
//! the `PK` signature the extension breaks the tie.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// What kind of document the input bytes contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceFormat {
    /// A paginated PDF document.
    Pdf,
    /// A raster image (PNG, JPEG, GIF, BMP).
    Image,
    /// A word-processor package (DOCX).
    WordProcessor,
    /// A spreadsheet package (XLSX).
    Spreadsheet,
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SourceFormat::Pdf => "PDF",
            SourceFormat::Image => "image",
            SourceFormat::WordProcessor => "DOCX document",
            SourceFormat::Spreadsheet => "XLSX spreadsheet",
        };
        f.write_str(s)
    }
}

/// The format the user asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetFormat {
    /// EPUB-style package with one section per source page.
    Epub,
    /// JPEG raster of the first page.
    Jpeg,
    /// Page-layout PDF document.
    Pdf,
    /// Editable word-processor document. Requested but not implemented:
    /// dispatch reports a capability error without touching any collaborator.
    Docx,
}

impl TargetFormat {
    /// File extension for artifacts of this format.
    pub fn extension(&self) -> &'static str {
        match self {
            TargetFormat::Epub => "epub",
            TargetFormat::Jpeg => "jpg",
            TargetFormat::Pdf => "pdf",
            TargetFormat::Docx => "docx",
        }
    }

    /// MIME type for artifacts of this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            TargetFormat::Epub => "application/epub+zip",
            TargetFormat::Jpeg => "image/jpeg",
            TargetFormat::Pdf => "application/pdf",
            TargetFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TargetFormat::Epub => "EPUB",
            TargetFormat::Jpeg => "JPEG",
            TargetFormat::Pdf => "PDF",
            TargetFormat::Docx => "DOCX",
        };
        f.write_str(s)
    }
}

impl FromStr for TargetFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "epub" => Ok(TargetFormat::Epub),
            "jpg" | "jpeg" => Ok(TargetFormat::Jpeg),
            "pdf" => Ok(TargetFormat::Pdf),
            "docx" => Ok(TargetFormat::Docx),
            other => Err(format!(
                "unknown target format '{other}' (expected epub, jpeg, pdf, or docx)"
            )),
        }
    }
}

/// Detect the source format from leading bytes, falling back to the file
/// extension to split the shared ZIP signature.
///
/// Returns `None` when the bytes match nothing this tool reads.
pub fn detect_source(bytes: &[u8], path: &Path) -> Option<SourceFormat> {
    if bytes.len() < 4 {
        return None;
    }

    if bytes.starts_with(b"%PDF") {
        return Some(SourceFormat::Pdf);
    }

    // Raster images
    if bytes.starts_with(&[0x89, b'P', b'N', b'G'])
        || bytes.starts_with(&[0xFF, 0xD8, 0xFF])
        || bytes.starts_with(b"GIF8")
        || bytes.starts_with(b"BM")
    {
        return Some(SourceFormat::Image);
    }

    // OOXML containers: both DOCX and XLSX begin with a local ZIP header.
    if bytes.starts_with(&[b'P', b'K', 0x03, 0x04]) {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        return match ext.as_deref() {
            Some("docx") => Some(SourceFormat::WordProcessor),
            Some("xlsx") | Some("xlsm") => Some(SourceFormat::Spreadsheet),
            _ => None,
        };
    }

    None
}

/// Whether the `(source, target)` pair is one of the implemented converters.
///
/// `(Pdf, Docx)` is deliberately absent: the pair can be requested but the
/// pipeline reports it as unsupported.
pub fn is_supported(source: SourceFormat, target: TargetFormat) -> bool {
    matches!(
        (source, target),
        (SourceFormat::Pdf, TargetFormat::Epub)
            | (SourceFormat::Pdf, TargetFormat::Jpeg)
            | (SourceFormat::Image, TargetFormat::Pdf)
            | (SourceFormat::WordProcessor, TargetFormat::Pdf)
            | (SourceFormat::Spreadsheet, TargetFormat::Pdf)
    )
}
