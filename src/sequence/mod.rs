//! Asynchronous operations over sequences.
//!
//! The [`SequenceExt`] trait is implemented for every [`IntoIterator`]. It
//! provides two families of operations:
//!
//! - **Parallel**: [`parallel_map`] and [`parallel_filter`] (and their `try_`
//!   variants) run the closure for many items at once, bounded by a
//!   concurrency limit. The returned futures can be configured with
//!   `.limit(n)` and `.preserve_order(bool)` before they are awaited.
//! - **Sequential**: [`async_map`], [`async_filter`] and [`async_reduce`]
//!   await the closure for one item at a time, in order.
//!
//! | Name                  | Return signature     | When does it return?                |
//! | ---                   | ---                  | ---                                 |
//! | `parallel_map`        | `Vec<R>`             | All items transformed
//! | `try_parallel_map`    | `Result<Vec<R>, E>`  | All items transformed, or first `Err` once in-flight work settles
//! | `parallel_filter`     | `Vec<T>`             | All items tested
//! | `try_parallel_filter` | `Result<Vec<T>, E>`  | All items tested, or first `Err` once in-flight work settles
//!
//! # Examples
//!
//! ```rust
//! use sequence_concurrency::prelude::*;
//! use futures_lite::future::block_on;
//!
//! block_on(async {
//!     let lengths = vec!["chashu", "nori"]
//!         .parallel_map(|name| async move { name.len() })
//!         .limit(2)
//!         .await;
//!     assert_eq!(lengths, vec![6, 4]);
//!
//!     let even = (0..10u32)
//!         .parallel_filter(|n| {
//!             let n = *n;
//!             async move { n % 2 == 0 }
//!         })
//!         .await;
//!     assert_eq!(even, vec![0, 2, 4, 6, 8]);
//! })
//! ```
//!
//! [`parallel_map`]: SequenceExt::parallel_map
//! [`parallel_filter`]: SequenceExt::parallel_filter
//! [`async_map`]: SequenceExt::async_map
//! [`async_filter`]: SequenceExt::async_filter
//! [`async_reduce`]: SequenceExt::async_reduce

#[cfg(feature = "alloc")]
mod parallel_filter;
#[cfg(feature = "alloc")]
mod parallel_map;

#[cfg(feature = "alloc")]
pub use parallel_filter::{ParallelFilter, TryParallelFilter};
#[cfg(feature = "alloc")]
pub use parallel_map::{ParallelMap, TryParallelMap};

#[cfg(feature = "alloc")]
use crate::parallel::{default_limit, Filter, Map, Run, TryFilter, TryMap};
#[cfg(feature = "alloc")]
use alloc::vec::Vec;
use core::future::Future;

/// An extension trait for sequences of items.
#[allow(async_fn_in_trait)]
pub trait SequenceExt: IntoIterator + Sized {
    /// Transform every item concurrently.
    ///
    /// At most `limit` transforms are in flight at once; see
    /// [`ParallelMap::limit`]. The output is in the order of the input unless
    /// [`ParallelMap::preserve_order`] is set to `false`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use sequence_concurrency::prelude::*;
    ///
    /// # futures_lite::future::block_on(async {
    /// let out = (1..=3u32)
    ///     .parallel_map(|n| async move { n * 10 })
    ///     .limit(2)
    ///     .await;
    /// assert_eq!(out, vec![10, 20, 30]);
    /// # });
    /// ```
    #[cfg(feature = "alloc")]
    fn parallel_map<F, Fut>(self, f: F) -> ParallelMap<Self::IntoIter, F>
    where
        F: FnMut(Self::Item) -> Fut,
        Fut: Future,
    {
        let run = Run::new(self.into_iter(), Map::new(f), default_limit(), true);
        ParallelMap::new(run)
    }

    /// Transform every item concurrently, failing on the first error.
    ///
    /// Once a transform returns `Err`, no further items are started. Transforms
    /// already in flight still run to completion, then the first error is
    /// returned and all values are discarded.
    ///
    /// # Example
    ///
    /// ```rust
    /// use sequence_concurrency::prelude::*;
    ///
    /// # futures_lite::future::block_on(async {
    /// let out = ["1", "2", "x"]
    ///     .try_parallel_map(|s| async move { s.parse::<u8>() })
    ///     .await;
    /// assert!(out.is_err());
    /// # });
    /// ```
    #[cfg(feature = "alloc")]
    fn try_parallel_map<F, Fut, R, E>(self, f: F) -> TryParallelMap<Self::IntoIter, F>
    where
        F: FnMut(Self::Item) -> Fut,
        Fut: Future<Output = Result<R, E>>,
    {
        let run = Run::new(self.into_iter(), TryMap::new(f), default_limit(), true);
        TryParallelMap::new(run)
    }

    /// Keep the items for which `f` returns `true`, evaluating the predicate
    /// concurrently.
    ///
    /// The future returned by `f` may not borrow the item; copy out what it
    /// needs first.
    ///
    /// # Example
    ///
    /// ```rust
    /// use sequence_concurrency::prelude::*;
    ///
    /// # futures_lite::future::block_on(async {
    /// let out = vec!["chashu", "nori", "tofu"]
    ///     .parallel_filter(|name| {
    ///         let short = name.len() == 4;
    ///         async move { short }
    ///     })
    ///     .await;
    /// assert_eq!(out, vec!["nori", "tofu"]);
    /// # });
    /// ```
    #[cfg(feature = "alloc")]
    fn parallel_filter<F, Fut>(self, f: F) -> ParallelFilter<Self::IntoIter, F>
    where
        F: FnMut(&Self::Item) -> Fut,
        Fut: Future<Output = bool>,
    {
        let run = Run::new(self.into_iter(), Filter::new(f), default_limit(), true);
        ParallelFilter::new(run)
    }

    /// Keep the items for which `f` returns `Ok(true)`, evaluating the
    /// predicate concurrently and failing on the first error.
    ///
    /// Error handling follows [`try_parallel_map`](SequenceExt::try_parallel_map).
    #[cfg(feature = "alloc")]
    fn try_parallel_filter<F, Fut, E>(self, f: F) -> TryParallelFilter<Self::IntoIter, F>
    where
        F: FnMut(&Self::Item) -> Fut,
        Fut: Future<Output = Result<bool, E>>,
    {
        let run = Run::new(self.into_iter(), TryFilter::new(f), default_limit(), true);
        TryParallelFilter::new(run)
    }

    /// Transform every item, awaiting one transform at a time.
    ///
    /// # Example
    ///
    /// ```rust
    /// use sequence_concurrency::prelude::*;
    ///
    /// # futures_lite::future::block_on(async {
    /// let out = [1, 2, 3].async_map(|n| async move { n.to_string() }).await;
    /// assert_eq!(out, ["1", "2", "3"]);
    /// # });
    /// ```
    #[cfg(feature = "alloc")]
    async fn async_map<F, Fut>(self, mut f: F) -> Vec<Fut::Output>
    where
        F: FnMut(Self::Item) -> Fut,
        Fut: Future,
    {
        let mut values = Vec::new();
        for item in self {
            values.push(f(item).await);
        }
        values
    }

    /// Keep the items for which `f` returns `true`, awaiting one predicate at
    /// a time.
    #[cfg(feature = "alloc")]
    async fn async_filter<F, Fut>(self, mut f: F) -> Vec<Self::Item>
    where
        F: FnMut(&Self::Item) -> Fut,
        Fut: Future<Output = bool>,
    {
        let mut values = Vec::new();
        for item in self {
            if f(&item).await {
                values.push(item);
            }
        }
        values
    }

    /// Combine all items into a single value, awaiting one step at a time.
    ///
    /// If the sequence is empty, `init` is returned and `f` is never called.
    ///
    /// # Example
    ///
    /// ```rust
    /// use sequence_concurrency::prelude::*;
    ///
    /// # futures_lite::future::block_on(async {
    /// let sum = (1..=5).async_reduce(0, |acc, n| async move { acc + n }).await;
    /// assert_eq!(sum, 15);
    /// # });
    /// ```
    async fn async_reduce<B, F, Fut>(self, init: B, mut f: F) -> B
    where
        F: FnMut(B, Self::Item) -> Fut,
        Fut: Future<Output = B>,
    {
        let mut acc = init;
        for item in self {
            acc = f(acc, item).await;
        }
        acc
    }
}

impl<I: IntoIterator> SequenceExt for I {}
