//! Integration tests for the dispatch contract.
//!
//! Everything here runs without a pdfium shared library: user-input errors
//! and capability errors are reported before any decoding collaborator is
//! loaded, and the DOCX and XLSX paths use pure-Rust collaborators.

use docshift::{
    convert, convert_to_file, Converter, ConvertConfig, ConvertError, Phase, ProgressCallback,
    SourceFormat, TargetFormat,
};
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

fn write_fixture(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut f = std::fs::File::create(&path).unwrap();
    f.write_all(bytes).unwrap();
    path
}

fn docx_fixture(paragraphs: &[&str]) -> Vec<u8> {
    use docx_rs::{Docx, Paragraph, Run};
    let mut docx = Docx::new();
    for p in paragraphs {
        docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*p)));
    }
    let mut cursor = std::io::Cursor::new(Vec::new());
    docx.build().pack(&mut cursor).unwrap();
    cursor.into_inner()
}

fn xlsx_fixture() -> Vec<u8> {
    use rust_xlsxwriter::Workbook;
    let mut wb = Workbook::new();
    let first = wb.add_worksheet();
    first.set_name("Figures").unwrap();
    first.write_string(0, 0, "quarter").unwrap();
    first.write_string(0, 1, "revenue").unwrap();
    first.write_string(1, 0, "Q1").unwrap();
    first.write_number(1, 1, 1200.0).unwrap();
    let second = wb.add_worksheet();
    second.set_name("Scratch").unwrap();
    second.write_string(0, 0, "ignore me").unwrap();
    wb.save_to_buffer().unwrap()
}

fn png_fixture(w: u32, h: u32) -> Vec<u8> {
    use image::{Rgba, RgbaImage};
    let img = RgbaImage::from_pixel(w, h, Rgba([30, 60, 90, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

// ── User-input errors: job never starts ──────────────────────────────────────

#[tokio::test]
async fn missing_file_yields_user_error_and_no_artifact() {
    for target in [
        TargetFormat::Epub,
        TargetFormat::Jpeg,
        TargetFormat::Pdf,
        TargetFormat::Docx,
    ] {
        let err = convert("/no/such/input.pdf", target, &ConvertConfig::default())
            .await
            .unwrap_err();
        assert!(
            matches!(err, ConvertError::FileNotFound { .. }),
            "target {target}: {err:?}"
        );
        assert!(err.is_user_error());
    }
}

#[tokio::test]
async fn empty_file_rejected_before_dispatch() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, "empty.pdf", b"");
    let err = convert(&path, TargetFormat::Epub, &ConvertConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ConvertError::EmptyInput { .. }));
}

// ── Capability errors: collaborators never touched ───────────────────────────

#[tokio::test]
async fn pdf_to_docx_is_a_capability_error() {
    // The file only needs the magic bytes: the unsupported pair must be
    // rejected before pdfium would ever parse it (a pdfium load of this
    // truncated "document" would fail with DecodeFailed instead).
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, "doc.pdf", b"%PDF-1.7\nnot really a pdf");

    let err = convert(&path, TargetFormat::Docx, &ConvertConfig::default())
        .await
        .unwrap_err();
    match err {
        ConvertError::UnsupportedConversion { from, to } => {
            assert_eq!(from, SourceFormat::Pdf);
            assert_eq!(to, TargetFormat::Docx);
        }
        other => panic!("expected UnsupportedConversion, got {other:?}"),
    }
}

#[tokio::test]
async fn off_matrix_pairs_rejected_without_decoding() {
    let dir = tempfile::tempdir().unwrap();
    // A "DOCX" that is only a zip header: decoding it would fail loudly,
    // so an UnsupportedConversion proves the decoder never ran.
    let path = write_fixture(&dir, "broken.docx", &[b'P', b'K', 0x03, 0x04, 0, 0]);

    let err = convert(&path, TargetFormat::Epub, &ConvertConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ConvertError::UnsupportedConversion { .. }));
}

// ── Working conversions (pure-Rust collaborators) ────────────────────────────

#[tokio::test]
async fn docx_to_pdf_produces_one_pdf_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(
        &dir,
        "notes.docx",
        &docx_fixture(&["First paragraph.", "Second paragraph."]),
    );

    let output = convert(&path, TargetFormat::Pdf, &ConvertConfig::default())
        .await
        .unwrap();
    assert!(output.artifact.bytes().starts_with(b"%PDF"));
    assert_eq!(output.artifact.file_name(), "notes.pdf");
    assert_eq!(output.artifact.mime_type(), "application/pdf");
    assert_eq!(output.stats.source, SourceFormat::WordProcessor);
    assert_eq!(output.stats.target, TargetFormat::Pdf);
    assert_eq!(output.stats.output_bytes, output.artifact.len());
}

#[tokio::test]
async fn xlsx_to_pdf_produces_one_pdf_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, "figures.xlsx", &xlsx_fixture());

    let output = convert(&path, TargetFormat::Pdf, &ConvertConfig::default())
        .await
        .unwrap();
    assert!(output.artifact.bytes().starts_with(b"%PDF"));
    assert_eq!(output.artifact.file_name(), "figures.pdf");
    assert_eq!(output.artifact.mime_type(), "application/pdf");
    assert_eq!(output.stats.source, SourceFormat::Spreadsheet);
    assert_eq!(output.stats.target, TargetFormat::Pdf);
    assert_eq!(output.stats.output_bytes, output.artifact.len());
}

#[tokio::test]
async fn image_to_pdf_produces_one_pdf_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, "photo.png", &png_fixture(64, 48));

    let output = convert(&path, TargetFormat::Pdf, &ConvertConfig::default())
        .await
        .unwrap();
    assert!(output.artifact.bytes().starts_with(b"%PDF"));
    assert_eq!(output.artifact.file_name(), "photo.pdf");
}

#[tokio::test]
async fn convert_to_file_writes_exactly_one_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(&dir, "memo.docx", &docx_fixture(&["hello"]));
    let dest = dir.path().join("memo.pdf");

    let stats = convert_to_file(&input, &dest, TargetFormat::Pdf, &ConvertConfig::default())
        .await
        .unwrap();

    let written = std::fs::read(&dest).unwrap();
    assert_eq!(written.len(), stats.output_bytes);
    assert!(written.starts_with(b"%PDF"));
    assert!(!dir.path().join("memo.pdf.tmp").exists());
    assert!(!dir.path().join("memo.tmp").exists());
}

// ── Progress contract ────────────────────────────────────────────────────────

#[derive(Default)]
struct RecordingProgress {
    starts: AtomicUsize,
    percents: Mutex<Vec<u8>>,
    completes: AtomicUsize,
    errors: AtomicUsize,
}

impl ProgressCallback for RecordingProgress {
    fn on_job_start(&self) {
        self.starts.fetch_add(1, Ordering::SeqCst);
    }
    fn on_phase(&self, _phase: Phase, percent: u8) {
        self.percents.lock().unwrap().push(percent);
    }
    fn on_job_complete(&self, percent: u8) {
        assert_eq!(percent, 100);
        self.completes.fetch_add(1, Ordering::SeqCst);
    }
    fn on_job_error(&self, _error: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn progress_is_monotone_capped_then_hundred_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, "p.docx", &docx_fixture(&["body text"]));

    let cb = Arc::new(RecordingProgress::default());
    let config = ConvertConfig::builder()
        .progress(cb.clone())
        .build()
        .unwrap();

    convert(&path, TargetFormat::Pdf, &config).await.unwrap();

    let seen = cb.percents.lock().unwrap().clone();
    assert!(!seen.is_empty());
    assert!(seen.windows(2).all(|w| w[0] <= w[1]), "not monotone: {seen:?}");
    assert!(seen.iter().all(|&p| p <= 90), "cap exceeded: {seen:?}");
    assert_eq!(cb.completes.load(Ordering::SeqCst), 1);
    assert_eq!(cb.errors.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn rejected_requests_fire_no_progress_events() {
    let dir = tempfile::tempdir().unwrap();
    let cb = Arc::new(RecordingProgress::default());
    let config = ConvertConfig::builder()
        .progress(cb.clone())
        .build()
        .unwrap();

    // Missing file: the job never starts.
    let err = convert("/no/such/thing.docx", TargetFormat::Pdf, &config)
        .await
        .unwrap_err();
    assert!(err.is_user_error());

    // Unsupported pair: rejected before the job starts.
    let path = write_fixture(&dir, "doc.pdf", b"%PDF-1.7\nstub");
    let err = convert(&path, TargetFormat::Docx, &config).await.unwrap_err();
    assert!(matches!(err, ConvertError::UnsupportedConversion { .. }));

    assert_eq!(cb.starts.load(Ordering::SeqCst), 0);
    assert!(cb.percents.lock().unwrap().is_empty());
    assert_eq!(cb.completes.load(Ordering::SeqCst), 0);
    assert_eq!(cb.errors.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failed_job_reports_error_not_completion() {
    let dir = tempfile::tempdir().unwrap();
    // Valid zip magic + docx extension, but not a real package: decode fails.
    let path = write_fixture(&dir, "corrupt.docx", &[b'P', b'K', 0x03, 0x04, 1, 2, 3]);

    let cb = Arc::new(RecordingProgress::default());
    let config = ConvertConfig::builder()
        .progress(cb.clone())
        .build()
        .unwrap();

    let err = convert(&path, TargetFormat::Pdf, &config).await.unwrap_err();
    assert!(matches!(err, ConvertError::DecodeFailed { .. }));
    assert_eq!(cb.completes.load(Ordering::SeqCst), 0);
    assert_eq!(cb.errors.load(Ordering::SeqCst), 1);
}

// ── Single-flight guard ──────────────────────────────────────────────────────

/// Callback that parks the job long enough for a competing request to race it.
struct SlowProgress {
    release: Mutex<Option<std::sync::mpsc::Receiver<()>>>,
    started: std::sync::mpsc::Sender<()>,
}

impl ProgressCallback for SlowProgress {
    fn on_phase(&self, phase: Phase, _percent: u8) {
        if phase == Phase::Decoding {
            self.started.send(()).ok();
            if let Some(rx) = self.release.lock().unwrap().take() {
                rx.recv_timeout(std::time::Duration::from_secs(10)).ok();
            }
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn second_job_rejected_while_first_runs() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, "slow.docx", &docx_fixture(&["text"]));

    let (started_tx, started_rx) = std::sync::mpsc::channel();
    let (release_tx, release_rx) = std::sync::mpsc::channel();
    let cb = Arc::new(SlowProgress {
        release: Mutex::new(Some(release_rx)),
        started: started_tx,
    });
    let config = ConvertConfig::builder().progress(cb).build().unwrap();

    let converter = Converter::new();
    let racing = converter.clone();
    let job_path = path.clone();
    let first = tokio::spawn(async move {
        racing.convert(&job_path, TargetFormat::Pdf, &config).await
    });

    // Wait until the first job is provably inside its decode phase.
    tokio::task::spawn_blocking(move || {
        started_rx.recv_timeout(std::time::Duration::from_secs(10))
    })
    .await
    .unwrap()
    .unwrap();

    let err = converter
        .convert(&path, TargetFormat::Pdf, &ConvertConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ConvertError::JobInFlight));

    release_tx.send(()).unwrap();
    let output = first.await.unwrap().unwrap();
    assert!(output.artifact.bytes().starts_with(b"%PDF"));

    // Slot is free again after completion.
    assert!(!converter.is_busy());
}
