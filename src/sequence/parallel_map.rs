use crate::parallel::{Map, Operation, Run, TryMap};

use alloc::vec::Vec;
use core::fmt;
use core::future::Future;
use core::pin::Pin;
use core::task::{ready, Context, Poll};
use pin_project::pin_project;

/// A future which transforms every item of a sequence concurrently.
///
/// This `struct` is created by the [`parallel_map`] method on [`SequenceExt`].
/// See its documentation for more.
///
/// [`parallel_map`]: super::SequenceExt::parallel_map
/// [`SequenceExt`]: super::SequenceExt
#[must_use = "futures do nothing unless you `.await` or poll them"]
#[pin_project]
pub struct ParallelMap<I, F>
where
    I: Iterator,
    Map<F>: Operation<I::Item>,
{
    #[pin]
    run: Run<I, Map<F>>,
}

impl<I, F> ParallelMap<I, F>
where
    I: Iterator,
    Map<F>: Operation<I::Item>,
{
    pub(crate) fn new(run: Run<I, Map<F>>) -> Self {
        Self { run }
    }

    /// Keep at most `limit` transforms in flight at once.
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

impl<I, F> fmt::Debug for ParallelMap<I, F>
where
    I: Iterator,
    Map<F>: Operation<I::Item>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ParallelMap").field(&self.run).finish()
    }
}

impl<I, F> Future for ParallelMap<I, F>
where
    I: Iterator,
    Map<F>: Operation<I::Item, Error = core::convert::Infallible>,
{
    type Output = Vec<<Map<F> as Operation<I::Item>>::Output>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match ready!(self.project().run.poll(cx)) {
            Ok(values) => Poll::Ready(values),
            Err(never) => match never {},
        }
    }
}

/// A future which transforms every item of a sequence concurrently, failing
/// on the first error.
///
/// This `struct` is created by the [`try_parallel_map`] method on
/// [`SequenceExt`]. See its documentation for more.
///
/// [`try_parallel_map`]: super::SequenceExt::try_parallel_map
/// [`SequenceExt`]: super::SequenceExt
#[must_use = "futures do nothing unless you `.await` or poll them"]
#[pin_project]
pub struct TryParallelMap<I, F>
where
    I: Iterator,
    TryMap<F>: Operation<I::Item>,
{
    #[pin]
    run: Run<I, TryMap<F>>,
}

impl<I, F> TryParallelMap<I, F>
where
    I: Iterator,
    TryMap<F>: Operation<I::Item>,
{
    pub(crate) fn new(run: Run<I, TryMap<F>>) -> Self {
        Self { run }
    }

    /// Keep at most `limit` transforms in flight at once.
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

impl<I, F> fmt::Debug for TryParallelMap<I, F>
where
    I: Iterator,
    TryMap<F>: Operation<I::Item>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TryParallelMap").field(&self.run).finish()
    }
}

impl<I, F> Future for TryParallelMap<I, F>
where
    I: Iterator,
    TryMap<F>: Operation<I::Item>,
{
    type Output = <Run<I, TryMap<F>> as Future>::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.project().run.poll(cx)
    }
}

#[cfg(test)]
mod test {
    use crate::prelude::*;
    use alloc::string::{String, ToString};
    use alloc::vec::Vec;
    use core::future;

    #[test]
    fn stringify_preserves_order() {
        futures_lite::future::block_on(async {
            let out: Vec<String> = (0..10_000)
                .parallel_map(|n: u32| future::ready(n.to_string()))
                .limit(8)
                .await;
            let expected: Vec<String> = (0..10_000u32).map(|n| n.to_string()).collect();
            assert_eq!(out, expected);
        });
    }

    #[test]
    fn try_map_fails_with_error() {
        futures_lite::future::block_on(async {
            let out = (0..20u32)
                .try_parallel_map(|n| future::ready(if n == 13 { Err(n) } else { Ok(n * 2) }))
                .limit(4)
                .await;
            assert_eq!(out, Err(13));
        });
    }

    #[test]
    fn try_map_over_endless_input() {
        futures_lite::future::block_on(async {
            let out = (0u64..)
                .try_parallel_map(|n| future::ready(if n == 5 { Err(n) } else { Ok(n) }))
                .limit(2)
                .await;
            assert_eq!(out, Err(5));
        });
    }
}
