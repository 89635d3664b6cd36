//! Allocation tracking.
//!
//! Operations with a `_tracked` suffix report every matrix
//! they allocate, and every intermediate they release, to an
//! [`AllocHook`] supplied by the caller.
//! The hook lives as long as the run that uses it;
//! there are no process-wide counters.

use std::cell::Cell;

use crate::matrix::Matrix;

/// Receives allocation events.
///
/// `()` implements this trait and ignores all events.
pub trait AllocHook {
    /// `bytes` of element storage were allocated.
    fn record_alloc(&self, bytes: usize);
    /// `bytes` of element storage were released.
    fn record_release(&self, bytes: usize);
}

impl AllocHook for () {
    fn record_alloc(&self, _bytes: usize) {}
    fn record_release(&self, _bytes: usize) {}
}

/// Statistics for allocation tracking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllocStats {
    /// Bytes currently allocated.
    pub bytes_allocated: usize,
    /// Bytes allocated over the whole run.
    pub total_bytes: usize,
    /// Peak of `bytes_allocated`.
    pub peak_bytes: usize,
    /// Number of allocations.
    pub allocation_count: usize,
    /// Number of releases.
    pub release_count: usize,
}

impl AllocStats {
    /// Create new empty statistics.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bytes_allocated: 0,
            total_bytes: 0,
            peak_bytes: 0,
            allocation_count: 0,
            release_count: 0,
        }
    }

    /// Record an allocation.
    pub fn record_alloc(&mut self, size: usize) {
        self.bytes_allocated += size;
        self.total_bytes += size;
        self.allocation_count += 1;
        self.peak_bytes = self.peak_bytes.max(self.bytes_allocated);
    }

    /// Record a release.
    pub fn record_release(&mut self, size: usize) {
        self.bytes_allocated = self.bytes_allocated.saturating_sub(size);
        self.release_count += 1;
    }

    /// Peak usage in KiB.
    pub fn peak_kib(&self) -> f64 {
        self.peak_bytes as f64 / 1024.0
    }
}

impl std::fmt::Display for AllocStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "peak: {:.3} KiB, total: {:.3} KiB in {} allocations, {} releases, {} bytes live",
            self.peak_kib(),
            self.total_bytes as f64 / 1024.0,
            self.allocation_count,
            self.release_count,
            self.bytes_allocated
        )
    }
}

/// An [`AllocHook`] accumulating [`AllocStats`].
///
/// Single-threaded: the counters use [`Cell`].
///
/// # Example
///
/// ```
/// use sqmat::{AllocTracker, Matrix};
///
/// let tracker = AllocTracker::new();
/// let m: Matrix = "1 1;1 0".parse().unwrap();
/// let p = m.power_tracked(10, &tracker).unwrap();
/// assert_eq!(p[(0, 0)], 89);
/// assert_eq!(tracker.stats().bytes_allocated, p.byte_len());
/// drop(p);
/// assert_eq!(tracker.stats().bytes_allocated, 0);
/// assert!(tracker.stats().peak_bytes >= 2 * m.byte_len());
/// ```
#[derive(Debug, Default)]
pub struct AllocTracker {
    stats: Cell<AllocStats>,
}

impl AllocTracker {
    /// A tracker with empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of the statistics.
    pub fn stats(&self) -> AllocStats {
        self.stats.get()
    }

    /// Clear the statistics.
    pub fn reset(&self) {
        self.stats.set(AllocStats::new())
    }

    fn update<F: FnOnce(&mut AllocStats)>(&self, f: F) {
        let mut stats = self.stats.get();
        f(&mut stats);
        self.stats.set(stats);
    }
}

impl AllocHook for AllocTracker {
    fn record_alloc(&self, bytes: usize) {
        self.update(|s| s.record_alloc(bytes));
        tracing::trace!(bytes, live = self.stats().bytes_allocated, "allocate");
    }

    fn record_release(&self, bytes: usize) {
        self.update(|s| s.record_release(bytes));
        tracing::trace!(bytes, live = self.stats().bytes_allocated, "release");
    }
}

/// A [`Matrix`] whose allocation was reported to a hook.
///
/// The release is reported when the value is dropped,
/// or when [`Tracked::into_inner`] hands the matrix back
/// to untracked code.
/// Dereferences to [`Matrix`].
pub struct Tracked<'h, H: AllocHook + ?Sized> {
    matrix: Option<Matrix>,
    hook: &'h H,
}

impl<'h, H: AllocHook + ?Sized> Tracked<'h, H> {
    /// Report the allocation of `matrix` to `hook`.
    pub fn new(matrix: Matrix, hook: &'h H) -> Self {
        hook.record_alloc(matrix.byte_len());
        Self {
            matrix: Some(matrix),
            hook,
        }
    }

    /// Stop tracking and return the matrix.
    pub fn into_inner(mut self) -> Matrix {
        match self.matrix.take() {
            Some(matrix) => {
                self.hook.record_release(matrix.byte_len());
                matrix
            }
            None => unreachable!("tracked matrix taken twice"),
        }
    }
}

impl<H: AllocHook + ?Sized> std::ops::Deref for Tracked<'_, H> {
    type Target = Matrix;

    fn deref(&self) -> &Self::Target {
        match self.matrix.as_ref() {
            Some(matrix) => matrix,
            None => unreachable!("tracked matrix already taken"),
        }
    }
}

// Mutation never changes the size of the element buffer.
impl<H: AllocHook + ?Sized> std::ops::DerefMut for Tracked<'_, H> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        match self.matrix.as_mut() {
            Some(matrix) => matrix,
            None => unreachable!("tracked matrix already taken"),
        }
    }
}

impl<H: AllocHook + ?Sized> Drop for Tracked<'_, H> {
    fn drop(&mut self) {
        if let Some(matrix) = self.matrix.take() {
            self.hook.record_release(matrix.byte_len());
        }
    }
}

impl<H: AllocHook + ?Sized> std::fmt::Debug for Tracked<'_, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Tracked").field(&**self).finish()
    }
}

#[cfg(test)]
mod tracking_tests {
    use super::*;

    #[test]
    fn test_alloc_stats() {
        let mut stats = AllocStats::new();

        stats.record_alloc(100);
        assert_eq!(stats.bytes_allocated, 100);
        assert_eq!(stats.allocation_count, 1);
        assert_eq!(stats.peak_bytes, 100);

        stats.record_alloc(200);
        assert_eq!(stats.bytes_allocated, 300);
        assert_eq!(stats.peak_bytes, 300);

        stats.record_release(100);
        assert_eq!(stats.bytes_allocated, 200);
        assert_eq!(stats.release_count, 1);
        assert_eq!(stats.peak_bytes, 300);
        assert_eq!(stats.total_bytes, 300);
    }

    #[test]
    fn tracked_releases_on_drop() {
        let tracker = AllocTracker::new();
        let m = Matrix::new(4).unwrap();
        let bytes = m.byte_len();
        {
            let t = Tracked::new(m.clone(), &tracker);
            assert_eq!(t.size(), 4);
            assert_eq!(tracker.stats().bytes_allocated, bytes);
        }
        let stats = tracker.stats();
        assert_eq!(stats.bytes_allocated, 0);
        assert_eq!(stats.peak_bytes, bytes);
        assert_eq!(stats.allocation_count, 1);
        assert_eq!(stats.release_count, 1);
    }

    #[test]
    fn into_inner_releases_once() {
        let tracker = AllocTracker::new();
        let t = Tracked::new(Matrix::new(2).unwrap(), &tracker);
        let m = t.into_inner();
        assert_eq!(m.size(), 2);
        assert_eq!(tracker.stats().release_count, 1);
        assert_eq!(tracker.stats().bytes_allocated, 0);
    }

    #[test]
    fn reset_clears() {
        let tracker = AllocTracker::new();
        tracker.record_alloc(10);
        tracker.reset();
        assert_eq!(tracker.stats(), AllocStats::new());
    }
}
