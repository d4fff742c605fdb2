//! Single-flight job guard and per-job statistics.
//!
//! A [`Converter`] owns an atomic in-flight flag; a second job started while
//! one is running is rejected with [`ConvertError::JobInFlight`]. Jobs are
//! never queued and their outputs can never interleave.

use crate::error::ConvertError;
use crate::format::{SourceFormat, TargetFormat};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Owns the at-most-one-job-in-flight invariant.
///
/// Cheap to clone (`Arc` internally); clones share the same guard, so a UI
/// can hand copies to several triggers and still get single-flight
/// behaviour.
#[derive(Clone, Default)]
pub struct Converter {
    busy: Arc<AtomicBool>,
}

impl Converter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a job is currently running.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Try to claim the in-flight slot. The returned guard releases it on
    /// drop, including on panic and early `?` returns.
    pub(crate) fn try_begin(&self) -> Result<JobGuard, ConvertError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(ConvertError::JobInFlight);
        }
        Ok(JobGuard {
            busy: Arc::clone(&self.busy),
        })
    }
}

/// RAII release of the in-flight flag.
#[derive(Debug)]
pub(crate) struct JobGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for JobGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::SeqCst);
    }
}

/// Timings and sizes for one completed job.
#[derive(Debug, Clone, Serialize)]
pub struct JobStats {
    /// Detected input format.
    pub source: SourceFormat,
    /// Requested output format.
    pub target: TargetFormat,
    /// Size of the input file in bytes.
    pub input_bytes: usize,
    /// Size of the produced artifact in bytes.
    pub output_bytes: usize,
    /// Time spent parsing the source document.
    pub decode_ms: u64,
    /// Time spent building the output document.
    pub render_ms: u64,
    /// Time spent producing the final artifact bytes.
    pub encode_ms: u64,
    /// End-to-end wall-clock time.
    pub total_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_begin_is_rejected_while_guard_held() {
        let conv = Converter::new();
        let guard = conv.try_begin().expect("first claim succeeds");
        assert!(conv.is_busy());

        let err = conv.try_begin().unwrap_err();
        assert!(matches!(err, ConvertError::JobInFlight));

        drop(guard);
        assert!(!conv.is_busy());
        conv.try_begin().expect("slot free again after drop");
    }

    #[test]
    fn clones_share_the_guard() {
        let a = Converter::new();
        let b = a.clone();
        let _guard = a.try_begin().unwrap();
        assert!(matches!(b.try_begin(), Err(ConvertError::JobInFlight)));
    }

    #[test]
    fn guard_released_on_panic() {
        let conv = Converter::new();
        let inner = conv.clone();
        let result = std::panic::catch_unwind(move || {
            let _guard = inner.try_begin().unwrap();
            panic!("job blew up");
        });
        assert!(result.is_err());
        assert!(!conv.is_busy(), "flag must clear when the guard unwinds");
    }
}
