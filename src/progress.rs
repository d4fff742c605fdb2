//! Phase-based progress reporting.
//!
//! The pipeline reports deterministic display percentages derived from which
//! phase it is in, not from timers. The underlying collaborator libraries
//! expose no granular progress events, so the percentage is still cosmetic,
//! but a phase-weighted value is reproducible and testable where timer ticks
//! would not be.
//!
//! Guarantees enforced by [`ProgressTracker`]:
//!
//! * the displayed percentage is monotonically non-decreasing,
//! * it never exceeds [`COMPLETION_CAP`] (90) while the job is running,
//! * it reports exactly 100 exactly once, on successful completion.

use std::fmt;
use std::sync::Arc;

/// Display percentage ceiling while a job is still running.
pub const COMPLETION_CAP: u8 = 90;

/// Pipeline phase, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Phase {
    /// Input read and its format identified.
    Detecting,
    /// Parsing the source document (pdfium, docx-rs, calamine, image).
    Decoding,
    /// Building the output document (page layout, text flow, rasterisation).
    Rendering,
    /// Producing the final artifact bytes.
    Encoding,
    /// Job finished successfully.
    Done,
}

impl Phase {
    /// Display percentage shown when this phase begins.
    ///
    /// Weights reflect where wall-clock time is typically spent: decoding and
    /// rendering dominate, encoding is cheap. `Done` is the only value that
    /// may exceed [`COMPLETION_CAP`].
    pub fn percent(&self) -> u8 {
        match self {
            Phase::Detecting => 5,
            Phase::Decoding => 40,
            Phase::Rendering => 75,
            Phase::Encoding => COMPLETION_CAP,
            Phase::Done => 100,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Detecting => "detecting",
            Phase::Decoding => "decoding",
            Phase::Rendering => "rendering",
            Phase::Encoding => "encoding",
            Phase::Done => "done",
        };
        f.write_str(s)
    }
}

/// Called by the pipeline as a job moves through its phases.
///
/// Implementations must be `Send + Sync`. All methods have default no-op
/// implementations so callers only override what they care about.
pub trait ProgressCallback: Send + Sync {
    /// Called once when the job starts, after input validation has admitted
    /// it and before any decoding begins. Requests rejected up front
    /// (missing file, unsupported pair, busy converter) fire no events.
    fn on_job_start(&self) {}

    /// Called each time the job enters a new phase.
    ///
    /// `percent` is the monotone display value (never above 90 here).
    fn on_phase(&self, phase: Phase, percent: u8) {
        let _ = (phase, percent);
    }

    /// Called exactly once on success, always with `percent == 100`.
    fn on_job_complete(&self, percent: u8) {
        let _ = percent;
    }

    /// Called once on failure; the indicator should be dismissed without the
    /// 100% hold.
    fn on_job_error(&self, error: &str) {
        let _ = error;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConvertConfig`].
pub type SharedProgressCallback = Arc<dyn ProgressCallback>;

/// Per-job progress state: turns phase transitions into monotone display
/// percentages and forwards them to an optional callback.
pub struct ProgressTracker {
    callback: Option<SharedProgressCallback>,
    displayed: u8,
    finished: bool,
}

impl ProgressTracker {
    pub fn new(callback: Option<SharedProgressCallback>) -> Self {
        if let Some(ref cb) = callback {
            cb.on_job_start();
        }
        Self {
            callback,
            displayed: 0,
            finished: false,
        }
    }

    /// Enter a phase. The display value only moves forward, and is clamped
    /// to [`COMPLETION_CAP`] until [`finish`](Self::finish) is called.
    pub fn enter(&mut self, phase: Phase) {
        if self.finished {
            return;
        }
        let target = phase.percent().min(COMPLETION_CAP);
        self.displayed = self.displayed.max(target);
        if let Some(ref cb) = self.callback {
            cb.on_phase(phase, self.displayed);
        }
    }

    /// Mark the job successful: the display jumps to 100, exactly once.
    pub fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        self.displayed = 100;
        if let Some(ref cb) = self.callback {
            cb.on_job_complete(100);
        }
    }

    /// Mark the job failed: the indicator is dismissed, no 100% hold.
    pub fn fail(&mut self, error: &str) {
        if self.finished {
            return;
        }
        self.finished = true;
        if let Some(ref cb) = self.callback {
            cb.on_job_error(error);
        }
    }

    /// Current display percentage.
    pub fn displayed(&self) -> u8 {
        self.displayed
    }
}
