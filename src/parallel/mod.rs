//! Bounded-concurrency execution of an operation over a sequence.
//!
//! A [`ParallelRunner`] applies an asynchronous operation to every item of a
//! sequence, keeping at most [`limit`] operations in flight at any given
//! moment. All operations are driven by the future returned from
//! [`ParallelRunner::run`], so no executor or spawning is required: it works
//! the same under `tokio`, `async-std`, or a plain `block_on`.
//!
//! # Semantics
//!
//! - Items are pulled from the input lazily, one at a time, and only once a
//!   concurrency slot is free.
//! - Every item is tagged with its position in the input. When order
//!   preservation is enabled (the default), the output is sorted by that
//!   position; otherwise values are returned in the order their operations
//!   completed.
//! - The first error returned by any operation fails the whole run. No new
//!   items are dispatched after that, but operations which were already in
//!   flight are still driven to completion before the error is returned.
//!   Their outputs, and any values collected so far, are discarded.
//!
//! # Examples
//!
//! ```rust
//! use sequence_concurrency::parallel::ParallelRunner;
//! use futures_lite::future::block_on;
//!
//! block_on(async {
//!     // Keep the squares of the odd numbers, two at a time.
//!     let out = ParallelRunner::new(2)
//!         .run(1..=5u32, |n| async move {
//!             Ok::<_, ()>((n % 2 == 1).then_some(n * n))
//!         })
//!         .await;
//!     assert_eq!(out, Ok(vec![1, 9, 25]));
//! })
//! ```
//!
//! [`limit`]: ParallelRunner::limit

mod indexed;
mod operation;
mod run;

pub use operation::{
    Filter, FilterFuture, Map, MapFuture, Operation, Step, TryFilter, TryFilterFuture, TryMap,
    TryMapFuture,
};
pub use run::Run;

use core::future::Future;
use core::num::NonZeroUsize;

/// Configuration for a bounded-concurrency run over a sequence.
///
/// See the [module-level documentation](self) for the exact semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParallelRunner {
    limit: NonZeroUsize,
    preserve_order: bool,
}

impl ParallelRunner {
    /// Create a runner which keeps at most `limit` operations in flight.
    ///
    /// A limit of `0` is raised to `1`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use sequence_concurrency::parallel::ParallelRunner;
    ///
    /// assert_eq!(ParallelRunner::new(0).limit(), 1);
    /// assert_eq!(ParallelRunner::new(8).limit(), 8);
    /// ```
    pub fn new(limit: usize) -> Self {
        Self {
            limit: clamp_limit(limit),
            preserve_order: true,
        }
    }

    /// Whether the output is returned in the order of the input.
    ///
    /// Defaults to `true`. When `false`, values are returned in the order
    /// their operations completed.
    pub fn preserve_order(mut self, preserve_order: bool) -> Self {
        self.preserve_order = preserve_order;
        self
    }

    /// The maximum number of operations in flight at once.
    pub fn limit(&self) -> usize {
        self.limit.get()
    }

    /// Returns `true` if the output is returned in the order of the input.
    pub fn preserves_order(&self) -> bool {
        self.preserve_order
    }

    /// Apply `f` to every item of `items`.
    ///
    /// `f` resolves to `Ok(Some(value))` to keep a value, `Ok(None)` to skip
    /// the item, or `Err(error)` to fail the run.
    pub fn run<I, F, Fut, R, E>(&self, items: I, f: F) -> Run<I::IntoIter, Step<F>>
    where
        I: IntoIterator,
        F: FnMut(I::Item) -> Fut,
        Fut: Future<Output = Result<Option<R>, E>>,
    {
        self.run_operation(items, Step::new(f))
    }

    /// Apply an [`Operation`] to every item of `items`.
    pub fn run_operation<I, Op>(&self, items: I, op: Op) -> Run<I::IntoIter, Op>
    where
        I: IntoIterator,
        Op: Operation<I::Item>,
    {
        Run::new(items.into_iter(), op, self.limit, self.preserve_order)
    }
}

impl Default for ParallelRunner {
    /// A runner limited to the available parallelism of the host, which
    /// preserves order.
    fn default() -> Self {
        Self {
            limit: default_limit(),
            preserve_order: true,
        }
    }
}

fn clamp_limit(limit: usize) -> NonZeroUsize {
    NonZeroUsize::new(limit).unwrap_or(NonZeroUsize::MIN)
}

/// The number of operations in flight when no limit is given.
#[cfg(feature = "std")]
pub(crate) fn default_limit() -> NonZeroUsize {
    std::thread::available_parallelism().unwrap_or(NonZeroUsize::MIN)
}

/// The number of operations in flight when no limit is given.
#[cfg(not(feature = "std"))]
pub(crate) fn default_limit() -> NonZeroUsize {
    NonZeroUsize::MIN
}
