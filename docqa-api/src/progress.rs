//! Progress reporting for uploads

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Byte-level progress of one multipart upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteProgress {
    /// Payload bytes handed to the transport so far
    pub loaded: u64,
    /// Sum of all file sizes in the batch
    pub total: u64,
}

impl ByteProgress {
    /// Percentage rounded to the nearest integer, clamped to 100
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        let pct = (self.loaded as f64 * 100.0 / self.total as f64).round();
        pct.clamp(0.0, 100.0) as u8
    }
}

/// Trait for receiving progress updates
pub trait ProgressCallback: Send + Sync {
    /// Called whenever more of the body has been streamed
    fn on_progress(&self, update: ByteProgress);
}

/// No-op progress callback implementation
pub struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _update: ByteProgress) {}
}

/// Closure-based progress callback
pub struct FnProgress<F>(pub F);

impl<F> ProgressCallback for FnProgress<F>
where
    F: Fn(ByteProgress) + Send + Sync,
{
    fn on_progress(&self, update: ByteProgress) {
        (self.0)(update)
    }
}

/// Arc wrapper for progress callbacks
impl<T: ProgressCallback + ?Sized> ProgressCallback for Arc<T> {
    fn on_progress(&self, update: ByteProgress) {
        (**self).on_progress(update)
    }
}

/// Box wrapper for progress callbacks
impl ProgressCallback for Box<dyn ProgressCallback> {
    fn on_progress(&self, update: ByteProgress) {
        (**self).on_progress(update)
    }
}

/// Shared byte counter fed by every part stream of one request.
///
/// When `total` is unknown the counter still accumulates but never reports.
pub(crate) struct ProgressTracker {
    loaded: AtomicU64,
    total: Option<u64>,
    callback: Arc<dyn ProgressCallback>,
}

impl ProgressTracker {
    pub(crate) fn new(total: Option<u64>, callback: Arc<dyn ProgressCallback>) -> Self {
        Self {
            loaded: AtomicU64::new(0),
            total,
            callback,
        }
    }

    pub(crate) fn advance(&self, bytes: usize) {
        let loaded = self.loaded.fetch_add(bytes as u64, Ordering::AcqRel) + bytes as u64;
        if let Some(total) = self.total {
            self.callback.on_progress(ByteProgress { loaded, total });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn percent_rounds_to_nearest() {
        let p = ByteProgress {
            loaded: 1,
            total: 3,
        };
        assert_eq!(p.percent(), 33);

        let p = ByteProgress {
            loaded: 2,
            total: 3,
        };
        assert_eq!(p.percent(), 67);

        let p = ByteProgress {
            loaded: 0,
            total: 0,
        };
        assert_eq!(p.percent(), 100);
    }

    #[test]
    fn tracker_without_total_stays_silent() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let tracker = ProgressTracker::new(
            None,
            Arc::new(FnProgress(move |p: ByteProgress| {
                sink.lock().unwrap().push(p)
            })),
        );

        tracker.advance(10);
        tracker.advance(10);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn tracker_accumulates_across_calls() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let tracker = ProgressTracker::new(
            Some(30),
            Arc::new(FnProgress(move |p: ByteProgress| {
                sink.lock().unwrap().push(p.loaded)
            })),
        );

        tracker.advance(10);
        tracker.advance(20);
        assert_eq!(*seen.lock().unwrap(), vec![10, 30]);
    }
}
