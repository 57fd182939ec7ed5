//! Bounded-concurrency operations over sequences for async Rust.
//!
//! This library runs an asynchronous closure over every item of a sequence
//! while keeping the number of closures in flight below a limit. It is
//! runtime agnostic: all work is driven by the returned future, which makes it
//! usable from `tokio`, `async-std`, or a plain `block_on` alike.
//!
//! # Operations
//!
//! The [`sequence::SequenceExt`] trait provides the following operations on
//! anything that implements [`IntoIterator`]:
//!
//! - [`parallel_map`]: Transform every item concurrently.
//! - [`try_parallel_map`]: Transform every item concurrently, failing on the first error.
//! - [`parallel_filter`]: Keep the items accepted by a predicate evaluated concurrently.
//! - [`try_parallel_filter`]: Same as `parallel_filter`, failing on the first error.
//! - [`async_map`], [`async_filter`], [`async_reduce`]: Sequential counterparts
//!   which await one item at a time.
//!
//! The lower-level [`parallel::ParallelRunner`] exposes the shared machinery
//! directly: a single operation which may keep, skip, or fail on each item.
//!
//! # Examples
//!
//! Transform items with at most 8 operations in flight, in input order:
//! ```rust
//! use sequence_concurrency::prelude::*;
//! use futures_lite::future::block_on;
//!
//! block_on(async {
//!     let out = (0..100u32)
//!         .parallel_map(|n| async move { n.to_string() })
//!         .limit(8)
//!         .await;
//!     assert_eq!(out[42], "42");
//! })
//! ```
//!
//! # Failure
//!
//! The `try_` operations surface the first error returned by any closure. No
//! new items are started once an error has been seen, but closures which are
//! already running are driven to completion rather than dropped. Values
//! produced before or after the error are discarded: the result is either
//! every value, or a single error.
//!
//! # Diagnostics
//!
//! Dispatch, completion, and failure are reported through [`tracing`] at the
//! `trace` and `debug` levels. Nothing is emitted unless a subscriber is
//! installed by the application.
//!
//! [`parallel_map`]: sequence::SequenceExt::parallel_map
//! [`try_parallel_map`]: sequence::SequenceExt::try_parallel_map
//! [`parallel_filter`]: sequence::SequenceExt::parallel_filter
//! [`try_parallel_filter`]: sequence::SequenceExt::try_parallel_filter
//! [`async_map`]: sequence::SequenceExt::async_map
//! [`async_filter`]: sequence::SequenceExt::async_filter
//! [`async_reduce`]: sequence::SequenceExt::async_reduce
//! [`tracing`]: https://docs.rs/tracing

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(missing_debug_implementations, nonstandard_style)]
#![warn(missing_docs, unreachable_pub)]

#[cfg(feature = "alloc")]
extern crate alloc;

/// The sequence concurrency prelude.
pub mod prelude {
    pub use super::sequence::SequenceExt as _;
}

#[cfg(feature = "alloc")]
pub mod parallel;
pub mod sequence;
