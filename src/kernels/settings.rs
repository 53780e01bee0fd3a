// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # **Settings Module** - *Process-wide Evaluation Settings*
//!
//! One process-wide cell of atomics controls the accelerated evaluation path:
//! - the enable flag (default on),
//! - the minimum element count before acceleration is considered (default 10 000),
//! - the accelerated backend's worker count (default: available parallelism).
//!
//! ## Lifecycle
//! 1. Take a snapshot with [`settings`].
//! 2. Pass the snapshot explicitly into [`crate::kernels::evaluate::evaluate`].
//!    The operator wrappers do this per call.
//! 3. Code that changes settings temporarily holds a [`SettingsGuard`], which
//!    restores the snapshot taken at construction when dropped.
//!
//! Settings only decide which path runs. Both paths produce identical results.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::enums::error::OpsError;

/// Default minimum element count. Operands must be strictly larger to accelerate.
pub const DEFAULT_MIN_ELEMENTS: usize = 10_000;

static USE_ACCELERATED: AtomicBool = AtomicBool::new(true);
static MIN_ELEMENTS: AtomicUsize = AtomicUsize::new(DEFAULT_MIN_ELEMENTS);
// 0 means "not yet resolved", filled lazily from available parallelism.
static THREADS: AtomicUsize = AtomicUsize::new(0);

/// Snapshot of the evaluation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalSettings {
    pub use_accelerated: bool,
    pub min_elements: usize,
    pub threads: usize,
}

impl EvalSettings {
    /// Settings that always take the plain path.
    pub fn plain() -> Self {
        Self {
            use_accelerated: false,
            ..Self::default()
        }
    }

    /// Settings that accelerate anything larger than `min_elements`.
    pub fn accelerated(min_elements: usize) -> Self {
        Self {
            use_accelerated: true,
            min_elements,
            ..Self::default()
        }
    }
}

impl Default for EvalSettings {
    fn default() -> Self {
        Self {
            use_accelerated: true,
            min_elements: DEFAULT_MIN_ELEMENTS,
            threads: default_threads(),
        }
    }
}

fn default_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Current process-wide settings.
pub fn settings() -> EvalSettings {
    EvalSettings {
        use_accelerated: USE_ACCELERATED.load(Ordering::Relaxed),
        min_elements: MIN_ELEMENTS.load(Ordering::Relaxed),
        threads: threads(),
    }
}

/// Enables or disables the accelerated path. Returns the previous flag.
pub fn set_use_accelerated(on: bool) -> bool {
    USE_ACCELERATED.swap(on, Ordering::Relaxed)
}

/// Sets the minimum element count. Returns the previous value.
pub fn set_min_elements(n: usize) -> usize {
    MIN_ELEMENTS.swap(n, Ordering::Relaxed)
}

/// Worker count for the accelerated backend.
pub fn threads() -> usize {
    match THREADS.load(Ordering::Relaxed) {
        0 => {
            let n = default_threads();
            // another thread may have set a value meanwhile; keep theirs
            let _ = THREADS.compare_exchange(0, n, Ordering::Relaxed, Ordering::Relaxed);
            THREADS.load(Ordering::Relaxed)
        }
        n => n,
    }
}

/// Sets the worker count. Returns the previous value.
pub fn set_threads(n: usize) -> Result<usize, OpsError> {
    if n == 0 {
        return Err(OpsError::Config {
            message: "thread count must be at least 1".into(),
        });
    }
    let prev = threads();
    THREADS.store(n, Ordering::Relaxed);
    Ok(prev)
}

/// Writes a snapshot back into the process-wide cell.
pub fn restore(saved: EvalSettings) {
    USE_ACCELERATED.store(saved.use_accelerated, Ordering::Relaxed);
    MIN_ELEMENTS.store(saved.min_elements, Ordering::Relaxed);
    THREADS.store(saved.threads.max(1), Ordering::Relaxed);
}

/// Restores the settings captured at construction when dropped.
///
/// ```rust
/// use minframe::kernels::settings::{self, SettingsGuard};
///
/// let before = settings::settings();
/// {
///     let _guard = SettingsGuard::new();
///     settings::set_use_accelerated(!before.use_accelerated);
/// }
/// assert_eq!(settings::settings(), before);
/// ```
#[must_use = "the settings are restored as soon as the guard is dropped"]
#[derive(Debug)]
pub struct SettingsGuard {
    saved: EvalSettings,
}

impl SettingsGuard {
    pub fn new() -> Self {
        Self { saved: settings() }
    }

    /// The snapshot that will be restored.
    pub fn saved(&self) -> EvalSettings {
        self.saved
    }
}

impl Default for SettingsGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SettingsGuard {
    fn drop(&mut self) {
        restore(self.saved);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Concurrent tests may observe the flipped values; both paths agree, so their results hold.
    #[test]
    fn test_setters_return_previous_and_guard_restores() {
        let before = settings();
        {
            let _guard = SettingsGuard::new();
            let prev = set_use_accelerated(false);
            assert_eq!(prev, before.use_accelerated);
            assert_eq!(set_min_elements(5), before.min_elements);
            assert_eq!(set_threads(3).unwrap(), before.threads);
            let now = settings();
            assert!(!now.use_accelerated);
            assert_eq!(now.min_elements, 5);
            assert_eq!(now.threads, 3);
            assert!(set_threads(0).is_err());
        }
        assert_eq!(settings(), before);
    }

    #[test]
    fn test_snapshot_constructors() {
        assert!(!EvalSettings::plain().use_accelerated);
        let a = EvalSettings::accelerated(0);
        assert!(a.use_accelerated);
        assert_eq!(a.min_elements, 0);
        assert!(a.threads >= 1);
    }
}
