//! Conversion entry points and pipeline dispatch.
//!
//! One job binds one input file to one target format. The
//! `(SourceFormat, TargetFormat)` pair is validated against the support
//! matrix *before* the job claims the in-flight slot or any collaborator
//! library runs, so capability errors and user-input errors are reported
//! instantly. Within a job, stages execute strictly in sequence; CPU-bound
//! collaborator calls (pdfium, printpdf, docx-rs, calamine) run inside
//! `spawn_blocking`.

use crate::artifact::Artifact;
use crate::config::ConvertConfig;
use crate::error::ConvertError;
use crate::format::{self, SourceFormat, TargetFormat};
use crate::job::{Converter, JobStats};
use crate::pipeline::decode::DocumentInfo;
use crate::pipeline::{decode, ebook, input, layout, raster, sheet, wordproc};
use crate::progress::{Phase, ProgressTracker};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// A successful conversion: the artifact plus per-stage statistics.
#[derive(Debug, Clone)]
pub struct ConversionOutput {
    pub artifact: Artifact,
    pub stats: JobStats,
}

/// Convert a file to the target format.
///
/// This is the one-shot convenience entry point: each call runs on a fresh
/// [`Converter`], so it never returns [`ConvertError::JobInFlight`]. Hold a
/// [`Converter`] instead when several triggers must share the
/// single-job-at-a-time guard.
///
/// # Errors
/// - User-input errors (missing/empty/unrecognized file) before the job starts
/// - [`ConvertError::UnsupportedConversion`] for pairs outside the matrix
/// - Stage-tagged failures (`DecodeFailed`, `RenderFailed`, `EncodeFailed`)
pub async fn convert(
    input_path: impl AsRef<Path>,
    target: TargetFormat,
    config: &ConvertConfig,
) -> Result<ConversionOutput, ConvertError> {
    Converter::new().convert(input_path, target, config).await
}

/// Convert a file and write the artifact next to `output_path` atomically.
pub async fn convert_to_file(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    target: TargetFormat,
    config: &ConvertConfig,
) -> Result<JobStats, ConvertError> {
    let output = convert(input_path, target, config).await?;
    output.artifact.write_to(output_path).await?;
    Ok(output.stats)
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    input_path: impl AsRef<Path>,
    target: TargetFormat,
    config: &ConvertConfig,
) -> Result<ConversionOutput, ConvertError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ConvertError::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(convert(input_path, target, config))
}

/// Report PDF metadata and page count without converting anything.
pub async fn inspect(input_path: impl AsRef<Path>) -> Result<DocumentInfo, ConvertError> {
    let resolved = input::resolve_input(input_path.as_ref()).await?;
    if resolved.source != SourceFormat::Pdf {
        return Err(ConvertError::UnsupportedConversion {
            from: resolved.source,
            to: TargetFormat::Pdf,
        });
    }
    decode::inspect(resolved.bytes).await
}

impl Converter {
    /// Convert a file to the target format, holding this converter's
    /// single-flight guard for the duration of the job.
    ///
    /// Input resolution and the support-matrix check run before the slot is
    /// claimed, so user-input and capability errors are reported even while
    /// another job runs, and fire no progress events. Once a job does start,
    /// a competing request gets [`ConvertError::JobInFlight`] immediately:
    /// requests are rejected, never queued, and two jobs can never
    /// interleave their output.
    pub async fn convert(
        &self,
        input_path: impl AsRef<Path>,
        target: TargetFormat,
        config: &ConvertConfig,
    ) -> Result<ConversionOutput, ConvertError> {
        // ── Step 1: Resolve input and sniff its format ───────────────────
        let resolved = input::resolve_input(input_path.as_ref()).await?;

        // ── Step 2: Validate the pair before claiming the slot ───────────
        if !format::is_supported(resolved.source, target) {
            return Err(ConvertError::UnsupportedConversion {
                from: resolved.source,
                to: target,
            });
        }

        let _guard = self.try_begin()?;
        let mut tracker = ProgressTracker::new(config.progress.clone());

        match run_job(resolved, target, config, &mut tracker).await {
            Ok(output) => {
                tracker.finish();
                Ok(output)
            }
            Err(e) => {
                tracker.fail(&e.to_string());
                Err(e)
            }
        }
    }
}

/// The job body: dispatch a resolved input, then package the artifact.
async fn run_job(
    resolved: input::ResolvedInput,
    target: TargetFormat,
    config: &ConvertConfig,
    tracker: &mut ProgressTracker,
) -> Result<ConversionOutput, ConvertError> {
    let total_start = Instant::now();
    let input::ResolvedInput {
        path,
        bytes,
        source,
    } = resolved;
    info!("Starting conversion: {} → {}", path.display(), target);

    tracker.enter(Phase::Detecting);
    let input_bytes = bytes.len();
    debug!("Dispatching {} → {}", source, target);

    // Generated documents carry the input's stem as their title.
    let title = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("converted")
        .to_string();

    // ── Step 3: Run the selected converter ───────────────────────────────
    let timed = dispatch(bytes, source, target, config, &title, tracker).await?;

    // ── Step 4: Package the artifact ─────────────────────────────────────
    let artifact = Artifact::new(timed.bytes, &path, target);
    let stats = JobStats {
        source,
        target,
        input_bytes,
        output_bytes: artifact.len(),
        decode_ms: timed.decode_ms,
        render_ms: timed.render_ms,
        encode_ms: timed.encode_ms,
        total_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Conversion complete: {} → {} ({} bytes in, {} bytes out, {}ms)",
        source, target, stats.input_bytes, stats.output_bytes, stats.total_ms
    );

    Ok(ConversionOutput { artifact, stats })
}

/// Artifact bytes plus where the time went.
struct TimedResult {
    bytes: Vec<u8>,
    decode_ms: u64,
    render_ms: u64,
    encode_ms: u64,
}

/// Select and run exactly one converter for the validated pair.
async fn dispatch(
    bytes: Vec<u8>,
    source: SourceFormat,
    target: TargetFormat,
    config: &ConvertConfig,
    title: &str,
    tracker: &mut ProgressTracker,
) -> Result<TimedResult, ConvertError> {
    match (source, target) {
        // Paginated document → e-book package: pages 1..N, in order.
        (SourceFormat::Pdf, TargetFormat::Epub) => {
            tracker.enter(Phase::Decoding);
            let decode_start = Instant::now();
            let texts = decode::page_texts(bytes).await?;
            let decode_ms = decode_start.elapsed().as_millis() as u64;

            tracker.enter(Phase::Encoding);
            let encode_start = Instant::now();
            let package = ebook::build_package(title, &texts)?;
            Ok(TimedResult {
                bytes: package,
                decode_ms,
                render_ms: 0,
                encode_ms: encode_start.elapsed().as_millis() as u64,
            })
        }

        // Paginated document → raster: first page only, fixed scale.
        (SourceFormat::Pdf, TargetFormat::Jpeg) => {
            tracker.enter(Phase::Decoding);
            let render_start = Instant::now();
            let image = decode::rasterize_first_page(bytes, config.raster_scale).await?;
            let render_ms = render_start.elapsed().as_millis() as u64;

            tracker.enter(Phase::Encoding);
            let encode_start = Instant::now();
            let jpeg = raster::encode_jpeg(&image, config.jpeg_quality)?;
            Ok(TimedResult {
                bytes: jpeg,
                decode_ms: 0,
                render_ms,
                encode_ms: encode_start.elapsed().as_millis() as u64,
            })
        }

        // Raster image → single-page layout document.
        (SourceFormat::Image, TargetFormat::Pdf) => {
            tracker.enter(Phase::Rendering);
            let render_start = Instant::now();
            let cfg = config.clone();
            let title = title.to_string();
            let pdf = tokio::task::spawn_blocking(move || {
                layout::image_document(&bytes, &cfg, &title)
            })
            .await
            .map_err(|e| ConvertError::Internal(format!("layout task panicked: {e}")))??;
            Ok(TimedResult {
                bytes: pdf,
                decode_ms: 0,
                render_ms: render_start.elapsed().as_millis() as u64,
                encode_ms: 0,
            })
        }

        // Word-processor package → flowed layout document.
        (SourceFormat::WordProcessor, TargetFormat::Pdf) => {
            tracker.enter(Phase::Decoding);
            let decode_start = Instant::now();
            let blocks =
                tokio::task::spawn_blocking(move || wordproc::parse_blocks(&bytes))
                    .await
                    .map_err(|e| ConvertError::Internal(format!("parse task panicked: {e}")))??;
            let decode_ms = decode_start.elapsed().as_millis() as u64;

            tracker.enter(Phase::Rendering);
            let render_start = Instant::now();
            let cfg = config.clone();
            let title = title.to_string();
            let pdf = tokio::task::spawn_blocking(move || {
                layout::text_document(&blocks, &cfg, &title)
            })
            .await
            .map_err(|e| ConvertError::Internal(format!("layout task panicked: {e}")))??;
            Ok(TimedResult {
                bytes: pdf,
                decode_ms,
                render_ms: render_start.elapsed().as_millis() as u64,
                encode_ms: 0,
            })
        }

        // Spreadsheet → landscape table document; first sheet only.
        (SourceFormat::Spreadsheet, TargetFormat::Pdf) => {
            tracker.enter(Phase::Decoding);
            let decode_start = Instant::now();
            let table = tokio::task::spawn_blocking(move || sheet::first_sheet_table(&bytes))
                .await
                .map_err(|e| ConvertError::Internal(format!("sheet task panicked: {e}")))??;
            let decode_ms = decode_start.elapsed().as_millis() as u64;

            tracker.enter(Phase::Rendering);
            let render_start = Instant::now();
            let cfg = config.clone();
            let title = title.to_string();
            let pdf = tokio::task::spawn_blocking(move || {
                layout::table_document(&table, &cfg, &title)
            })
            .await
            .map_err(|e| ConvertError::Internal(format!("layout task panicked: {e}")))??;
            Ok(TimedResult {
                bytes: pdf,
                decode_ms,
                render_ms: render_start.elapsed().as_millis() as u64,
                encode_ms: 0,
            })
        }

        // Already rejected by the support-matrix check; unreachable by
        // construction, but keep dispatch total.
        (from, to) => Err(ConvertError::UnsupportedConversion { from, to }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn input_errors_reported_even_while_busy() {
        let conv = Converter::new();
        let _held = conv.try_begin().unwrap();

        let err = conv
            .convert("/no/such/file.pdf", TargetFormat::Pdf, &ConvertConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ConvertError::FileNotFound { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn capability_errors_do_not_claim_the_slot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.pdf");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(b"%PDF-1.7\nstub").unwrap();

        let conv = Converter::new();
        let err = conv
            .convert(&path, TargetFormat::Docx, &ConvertConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ConvertError::UnsupportedConversion { .. }));
        // The rejection must not have touched the in-flight flag.
        assert!(!conv.is_busy());
        conv.try_begin().expect("slot never claimed");
    }
}
