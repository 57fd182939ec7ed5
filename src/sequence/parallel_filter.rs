use crate::parallel::{Filter, Operation, Run, TryFilter};

use alloc::vec::Vec;
use core::convert::Infallible;
use core::fmt;
use core::future::Future;
use core::pin::Pin;
use core::task::{ready, Context, Poll};
use pin_project::pin_project;

/// A future which evaluates a predicate for every item of a sequence
/// concurrently, keeping the items it accepts.
///
/// This `struct` is created by the [`parallel_filter`] method on
/// [`SequenceExt`]. See its documentation for more.
///
/// [`parallel_filter`]: super::SequenceExt::parallel_filter
/// [`SequenceExt`]: super::SequenceExt
#[must_use = "futures do nothing unless you `.await` or poll them"]
#[pin_project]
pub struct ParallelFilter<I, F>
where
    I: Iterator,
    Filter<F>: Operation<I::Item>,
{
    #[pin]
    run: Run<I, Filter<F>>,
}

impl<I, F> ParallelFilter<I, F>
where
    I: Iterator,
    Filter<F>: Operation<I::Item>,
{
    pub(crate) fn new(run: Run<I, Filter<F>>) -> Self {
        Self { run }
    }

    /// Keep at most `limit` predicates in flight at once.
    ///
    /// A limit of `0` is raised to `1`. Defaults to the available parallelism
    /// of the host.
    pub fn limit(mut self, limit: usize) -> Self {
        self.run.set_limit(limit);
        self
    }

    /// Whether the output is returned in the order of the input.
    ///
    /// Defaults to `true`.
    pub fn preserve_order(mut self, preserve_order: bool) -> Self {
        self.run.set_preserve_order(preserve_order);
        self
    }
}

impl<I, F> fmt::Debug for ParallelFilter<I, F>
where
    I: Iterator,
    Filter<F>: Operation<I::Item>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ParallelFilter").field(&self.run).finish()
    }
}

impl<I, F> Future for ParallelFilter<I, F>
where
    I: Iterator,
    Filter<F>: Operation<I::Item, Output = I::Item, Error = Infallible>,
{
    type Output = Vec<I::Item>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match ready!(self.project().run.poll(cx)) {
            Ok(items) => Poll::Ready(items),
            Err(never) => match never {},
        }
    }
}

/// A future which evaluates a fallible predicate for every item of a sequence
/// concurrently, failing on the first error.
///
/// This `struct` is created by the [`try_parallel_filter`] method on
/// [`SequenceExt`]. See its documentation for more.
///
/// [`try_parallel_filter`]: super::SequenceExt::try_parallel_filter
/// [`SequenceExt`]: super::SequenceExt
#[must_use = "futures do nothing unless you `.await` or poll them"]
#[pin_project]
pub struct TryParallelFilter<I, F>
where
    I: Iterator,
    TryFilter<F>: Operation<I::Item>,
{
    #[pin]
    run: Run<I, TryFilter<F>>,
}

impl<I, F> TryParallelFilter<I, F>
where
    I: Iterator,
    TryFilter<F>: Operation<I::Item>,
{
    pub(crate) fn new(run: Run<I, TryFilter<F>>) -> Self {
        Self { run }
    }

    /// Keep at most `limit` predicates in flight at once.
    ///
    /// A limit of `0` is raised to `1`. Defaults to the available parallelism
    /// of the host.
    pub fn limit(mut self, limit: usize) -> Self {
        self.run.set_limit(limit);
        self
    }

    /// Whether the output is returned in the order of the input.
    ///
    /// Defaults to `true`.
    pub fn preserve_order(mut self, preserve_order: bool) -> Self {
        self.run.set_preserve_order(preserve_order);
        self
    }
}

impl<I, F> fmt::Debug for TryParallelFilter<I, F>
where
    I: Iterator,
    TryFilter<F>: Operation<I::Item>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TryParallelFilter").field(&self.run).finish()
    }
}

impl<I, F> Future for TryParallelFilter<I, F>
where
    I: Iterator,
    TryFilter<F>: Operation<I::Item>,
{
    type Output = <Run<I, TryFilter<F>> as Future>::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.project().run.poll(cx)
    }
}
