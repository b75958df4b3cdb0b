//! Shared execution utilities.
//!
//! The search loop is sequential by design; within a trial, prediction over
//! rows may fan out on a rayon pool. [`Parallelism`] carries that decision
//! through the training components and [`run_with_threads`] sets up the pool
//! at the entry point.

// =============================================================================
// Parallelism
// =============================================================================

/// Whether a component may use rayon parallel iterators.
///
/// Components never build thread pools themselves; the pool is installed once
/// at the entry point and this flag is threaded through.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Parallelism {
    Sequential,
    Parallel,
}

impl Parallelism {
    /// Map thread-count semantics to a mode: 0 = auto, 1 = sequential,
    /// more = parallel.
    #[inline]
    pub fn from_threads(n_threads: usize) -> Self {
        if n_threads == 1 || (n_threads == 0 && rayon::current_num_threads() == 1) {
            Parallelism::Sequential
        } else {
            Parallelism::Parallel
        }
    }

    #[inline]
    pub fn is_parallel(self) -> bool {
        matches!(self, Parallelism::Parallel)
    }
}

// =============================================================================
// Thread pool setup
// =============================================================================

/// Run `f` under a thread pool sized by `n_threads`.
///
/// `0` uses all available cores, `1` skips pool creation entirely, `n > 1`
/// builds a pool with exactly `n` threads.
#[inline]
pub fn run_with_threads<T: Send>(n_threads: usize, f: impl FnOnce(Parallelism) -> T + Send) -> T {
    match Parallelism::from_threads(n_threads) {
        Parallelism::Sequential => f(Parallelism::Sequential),
        Parallelism::Parallel => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n_threads)
                .build()
                .expect("thread pool creation");
            pool.install(|| f(Parallelism::Parallel))
        }
    }
}
