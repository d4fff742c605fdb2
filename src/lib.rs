//! # docshift
//!
//! Convert documents between formats entirely on the local machine — no
//! server, no upload, nothing persisted beyond the output file you asked for.
//!
//! ## Supported conversions
//!
//! | From | To | Notes |
//! |------|----|-------|
//! | PDF  | EPUB | one section per page, structural approximation |
//! | PDF  | JPEG | first page only, rasterised at a configurable scale |
//! | image (PNG/JPEG/GIF/BMP) | PDF | image embedded on a single A4 page |
//! | DOCX | PDF | text and tables flowed onto A4 pages |
//! | XLSX | PDF | first sheet, rendered as a landscape table |
//!
//! PDF → DOCX is recognised but deliberately unimplemented; requesting it
//! returns [`ConvertError::UnsupportedConversion`] without touching any
//! decoder.
//!
//! ## Pipeline overview
//!
//! ```text
//! input file
//!  │
//!  ├─ 1. Detect   read bytes, sniff magic (PDF / image / DOCX / XLSX)
//!  ├─ 2. Decode   pdfium / docx-rs / calamine (spawn_blocking)
//!  ├─ 3. Render   printpdf layout or pdfium rasterisation
//!  ├─ 4. Encode   final artifact bytes (XHTML package, JPEG, PDF)
//!  └─ 5. Emit     atomic write to disk, or bytes / data URL in memory
//! ```
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use docshift::{convert, ConvertConfig, TargetFormat};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConvertConfig::default();
//!     let output = convert("report.docx", TargetFormat::Pdf, &config).await?;
//!     output.artifact.write_to("report.pdf").await?;
//!     eprintln!("{} bytes in {}ms", output.artifact.len(), output.stats.total_ms);
//!     Ok(())
//! }
//! ```
//!
//! ## Single-flight jobs
//!
//! A [`Converter`] enforces at most one running job; a second request while
//! one is in flight is rejected with [`ConvertError::JobInFlight`] rather
//! than queued. The free [`convert`] function uses a fresh converter per
//! call. Progress is reported through a [`ProgressCallback`] as the job
//! moves through its phases; displayed percentages are deterministic,
//! monotone, and capped at 90 until completion.
//!
//! ## Feature flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docshift` binary (clap + anyhow + indicatif + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod artifact;
pub mod config;
pub mod convert;
pub mod error;
pub mod format;
pub mod job;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use artifact::Artifact;
pub use config::{ConvertConfig, ConvertConfigBuilder};
pub use convert::{convert, convert_sync, convert_to_file, inspect, ConversionOutput};
pub use error::ConvertError;
pub use format::{SourceFormat, TargetFormat};
pub use job::{Converter, JobStats};
pub use pipeline::decode::DocumentInfo;
pub use progress::{
    NoopProgressCallback, Phase, ProgressCallback, ProgressTracker, SharedProgressCallback,
};
