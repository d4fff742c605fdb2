//! CLI binary for docshift.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConvertConfig`, drives an indicatif bar from the library's phase
//! callbacks, and writes the artifact to disk.

use anyhow::{Context, Result};
use clap::Parser;
use docshift::{
    convert, inspect, ConvertConfig, Phase, ProgressCallback, SharedProgressCallback, TargetFormat,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress bar fed by the library's phase transitions.
///
/// The bar length is the display percentage (0–100); the library guarantees
/// the value is monotone and stays at or below 90 until the job completes.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(100);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}%  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(style);
        bar.set_prefix("Converting");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }
}

impl ProgressCallback for CliProgress {
    fn on_job_start(&self) {
        self.bar.set_message("starting…");
    }

    fn on_phase(&self, phase: Phase, percent: u8) {
        self.bar.set_position(percent as u64);
        self.bar.set_message(phase.to_string());
    }

    fn on_job_complete(&self, percent: u8) {
        self.bar.set_position(percent as u64);
        self.bar.finish_and_clear();
    }

    fn on_job_error(&self, _error: &str) {
        // Dismiss immediately; main prints the error itself.
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # DOCX to PDF, output name derived from the input
  docshift report.docx --to pdf

  # PDF to EPUB with an explicit output path
  docshift book.pdf --to epub -o book.epub

  # First page of a PDF as a JPEG, 3x scale, quality 90
  docshift slides.pdf --to jpeg --scale 3 --quality 90

  # Image onto an A4 PDF page
  docshift photo.png --to pdf

  # Spreadsheet's first sheet as a landscape PDF table
  docshift figures.xlsx --to pdf

  # Inspect PDF metadata, no conversion
  docshift --inspect-only document.pdf

SUPPORTED CONVERSIONS:
  pdf  → epub    one section per page (structural approximation)
  pdf  → jpeg    first page only
  png/jpeg/gif/bmp → pdf
  docx → pdf     text and tables, A4 portrait
  xlsx → pdf     first sheet, A4 landscape

  pdf → docx is not supported and is reported as such.

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH   Path to an existing libpdfium shared library
  RUST_LOG          Overrides the log filter (tracing-subscriber EnvFilter)
"#;

/// Convert documents between formats locally.
#[derive(Parser, Debug)]
#[command(
    name = "docshift",
    version,
    about = "Convert PDF, DOCX, XLSX, and image files between formats locally",
    long_about = "Convert documents entirely on this machine: PDF to EPUB or JPEG, and \
images, DOCX, or XLSX to PDF. Nothing is uploaded and nothing is kept beyond the output file.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Input file (PDF, PNG/JPEG/GIF/BMP, DOCX, or XLSX).
    input: PathBuf,

    /// Target format: epub, jpeg, pdf, or docx.
    #[arg(short = 't', long = "to", required_unless_present = "inspect_only")]
    to: Option<TargetFormat>,

    /// Output path. Default: input name with the target extension, in the
    /// current directory.
    #[arg(short, long, env = "DOCSHIFT_OUTPUT")]
    output: Option<PathBuf>,

    /// Rasterisation scale for pdf→jpeg (0.5–8).
    #[arg(long, env = "DOCSHIFT_SCALE", default_value_t = 2.0)]
    scale: f32,

    /// JPEG quality for pdf→jpeg (1–100).
    #[arg(long, env = "DOCSHIFT_QUALITY", default_value_t = 85)]
    quality: u8,

    /// Page margin in millimetres for generated PDFs.
    #[arg(long, env = "DOCSHIFT_MARGIN", default_value_t = 10.0)]
    margin: f32,

    /// Render spreadsheet pages in portrait instead of landscape.
    #[arg(long, env = "DOCSHIFT_PORTRAIT")]
    portrait: bool,

    /// Print job statistics as JSON to stderr.
    #[arg(long, env = "DOCSHIFT_JSON")]
    json: bool,

    /// Disable the progress bar.
    #[arg(long, env = "DOCSHIFT_NO_PROGRESS")]
    no_progress: bool,

    /// Print PDF metadata only, no conversion.
    #[arg(long)]
    inspect_only: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOCSHIFT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "DOCSHIFT_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let meta = inspect(&cli.input).await.context("Failed to inspect PDF")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&meta).context("Failed to serialise metadata")?
            );
        } else {
            println!("File:         {}", cli.input.display());
            if let Some(ref t) = meta.title {
                println!("Title:        {t}");
            }
            if let Some(ref a) = meta.author {
                println!("Author:       {a}");
            }
            if let Some(ref s) = meta.subject {
                println!("Subject:      {s}");
            }
            println!("Pages:        {}", meta.page_count);
            println!("PDF Version:  {}", meta.pdf_version);
            if let Some(ref p) = meta.producer {
                println!("Producer:     {p}");
            }
            if let Some(ref c) = meta.creator {
                println!("Creator:      {c}");
            }
        }
        return Ok(());
    }

    let target = cli.to.expect("clap enforces --to unless --inspect-only");

    // ── Build config ─────────────────────────────────────────────────────
    let progress: Option<SharedProgressCallback> = if show_progress {
        Some(CliProgress::new() as SharedProgressCallback)
    } else {
        None
    };

    let mut builder = ConvertConfig::builder()
        .raster_scale(cli.scale)
        .jpeg_quality(cli.quality)
        .margin_mm(cli.margin)
        .sheet_landscape(!cli.portrait);
    if let Some(cb) = progress {
        builder = builder.progress(cb);
    }
    let config = builder.build().context("Invalid configuration")?;

    // ── Run conversion ───────────────────────────────────────────────────
    let output = convert(&cli.input, target, &config)
        .await
        .context("Conversion failed")?;

    let dest = match cli.output {
        Some(path) => path,
        None => PathBuf::from(output.artifact.file_name()),
    };
    output
        .artifact
        .write_to(&dest)
        .await
        .context("Failed to write output")?;

    if cli.json {
        eprintln!(
            "{}",
            serde_json::to_string_pretty(&output.stats).context("Failed to serialise stats")?
        );
    }

    if !cli.quiet {
        eprintln!(
            "{} {} → {}  {}",
            green("✔"),
            cli.input.display(),
            bold(&dest.display().to_string()),
            dim(&format!(
                "{} bytes, {}ms",
                output.stats.output_bytes, output.stats.total_ms
            )),
        );
        if output.stats.source == docshift::SourceFormat::Pdf
            && target == TargetFormat::Jpeg
        {
            eprintln!("   {}", dim("note: only the first page is rasterised"));
        }
    }

    Ok(())
}
