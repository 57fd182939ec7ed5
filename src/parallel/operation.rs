use core::convert::Infallible;
use core::fmt;
use core::future::Future;
use core::pin::Pin;
use core::task::{ready, Context, Poll};

use pin_project::pin_project;

/// A unit of work applied to every item of a sequence by [`Run`].
///
/// Each call produces a future which resolves to one of three outcomes:
///
/// - `Ok(Some(value))`: the value is kept and returned from the run.
/// - `Ok(None)`: the item is skipped and nothing is recorded.
/// - `Err(error)`: the run fails. Only the first error is kept.
///
/// [`Run`]: super::Run
pub trait Operation<T> {
    /// The value kept for each item.
    type Output;
    /// The error that fails the whole run.
    type Error;
    /// The future performing the work for a single item.
    type Future: Future<Output = Result<Option<Self::Output>, Self::Error>>;

    /// Start the work for a single item.
    fn call(&mut self, item: T) -> Self::Future;
}

/// An operation built from a closure which already speaks the
/// keep / skip / fail protocol of [`Operation`].
///
/// This `struct` is created by [`ParallelRunner::run`]. See its documentation
/// for more.
///
/// [`ParallelRunner::run`]: super::ParallelRunner::run
#[derive(Clone)]
pub struct Step<F> {
    f: F,
}

impl<F> Step<F> {
    pub(crate) fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> fmt::Debug for Step<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step").finish()
    }
}

impl<T, F, Fut, R, E> Operation<T> for Step<F>
where
    F: FnMut(T) -> Fut,
    Fut: Future<Output = Result<Option<R>, E>>,
{
    type Output = R;
    type Error = E;
    type Future = Fut;

    fn call(&mut self, item: T) -> Self::Future {
        (self.f)(item)
    }
}

/// Transforms every item with an infallible closure.
#[derive(Clone)]
pub struct Map<F> {
    f: F,
}

impl<F> Map<F> {
    pub(crate) fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> fmt::Debug for Map<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Map").finish()
    }
}

impl<T, F, Fut> Operation<T> for Map<F>
where
    F: FnMut(T) -> Fut,
    Fut: Future,
{
    type Output = Fut::Output;
    type Error = Infallible;
    type Future = MapFuture<Fut>;

    fn call(&mut self, item: T) -> Self::Future {
        MapFuture {
            fut: (self.f)(item),
        }
    }
}

/// The future created by [`Map`] for a single item.
#[derive(Debug)]
#[pin_project]
pub struct MapFuture<Fut> {
    #[pin]
    fut: Fut,
}

impl<Fut: Future> Future for MapFuture<Fut> {
    type Output = Result<Option<Fut::Output>, Infallible>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let value = ready!(self.project().fut.poll(cx));
        Poll::Ready(Ok(Some(value)))
    }
}

/// Transforms every item with a fallible closure.
#[derive(Clone)]
pub struct TryMap<F> {
    f: F,
}

impl<F> TryMap<F> {
    pub(crate) fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> fmt::Debug for TryMap<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TryMap").finish()
    }
}

impl<T, F, Fut, R, E> Operation<T> for TryMap<F>
where
    F: FnMut(T) -> Fut,
    Fut: Future<Output = Result<R, E>>,
{
    type Output = R;
    type Error = E;
    type Future = TryMapFuture<Fut>;

    fn call(&mut self, item: T) -> Self::Future {
        TryMapFuture {
            fut: (self.f)(item),
        }
    }
}

/// The future created by [`TryMap`] for a single item.
#[derive(Debug)]
#[pin_project]
pub struct TryMapFuture<Fut> {
    #[pin]
    fut: Fut,
}

impl<Fut, R, E> Future for TryMapFuture<Fut>
where
    Fut: Future<Output = Result<R, E>>,
{
    type Output = Result<Option<R>, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let res = ready!(self.project().fut.poll(cx));
        Poll::Ready(res.map(Some))
    }
}

/// Keeps the items for which an infallible predicate returns `true`.
#[derive(Clone)]
pub struct Filter<F> {
    f: F,
}

impl<F> Filter<F> {
    pub(crate) fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> fmt::Debug for Filter<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter").finish()
    }
}

impl<T, F, Fut> Operation<T> for Filter<F>
where
    F: FnMut(&T) -> Fut,
    Fut: Future<Output = bool>,
{
    type Output = T;
    type Error = Infallible;
    type Future = FilterFuture<T, Fut>;

    fn call(&mut self, item: T) -> Self::Future {
        let fut = (self.f)(&item);
        FilterFuture {
            item: Some(item),
            fut,
        }
    }
}

/// The future created by [`Filter`] for a single item.
#[derive(Debug)]
#[pin_project]
pub struct FilterFuture<T, Fut> {
    item: Option<T>,
    #[pin]
    fut: Fut,
}

impl<T, Fut> Future for FilterFuture<T, Fut>
where
    Fut: Future<Output = bool>,
{
    type Output = Result<Option<T>, Infallible>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        let keep = ready!(this.fut.poll(cx));
        let item = this
            .item
            .take()
            .expect("future polled after completing");
        Poll::Ready(Ok(keep.then_some(item)))
    }
}

/// Keeps the items for which a fallible predicate returns `Ok(true)`.
#[derive(Clone)]
pub struct TryFilter<F> {
    f: F,
}

impl<F> TryFilter<F> {
    pub(crate) fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> fmt::Debug for TryFilter<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TryFilter").finish()
    }
}

impl<T, F, Fut, E> Operation<T> for TryFilter<F>
where
    F: FnMut(&T) -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    type Output = T;
    type Error = E;
    type Future = TryFilterFuture<T, Fut>;

    fn call(&mut self, item: T) -> Self::Future {
        let fut = (self.f)(&item);
        TryFilterFuture {
            item: Some(item),
            fut,
        }
    }
}

/// The future created by [`TryFilter`] for a single item.
#[derive(Debug)]
#[pin_project]
pub struct TryFilterFuture<T, Fut> {
    item: Option<T>,
    #[pin]
    fut: Fut,
}

impl<T, Fut, E> Future for TryFilterFuture<T, Fut>
where
    Fut: Future<Output = Result<bool, E>>,
{
    type Output = Result<Option<T>, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        let keep = ready!(this.fut.poll(cx))?;
        let item = this
            .item
            .take()
            .expect("future polled after completing");
        Poll::Ready(Ok(keep.then_some(item)))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use core::future;

    #[test]
    fn filter_keeps_or_skips() {
        futures_lite::future::block_on(async {
            let mut op = Filter::new(|n: &u8| future::ready(*n % 2 == 0));
            assert_eq!(op.call(4).await, Ok(Some(4)));
            assert_eq!(op.call(5).await, Ok(None));
        });
    }

    #[test]
    fn try_filter_forwards_error() {
        futures_lite::future::block_on(async {
            let mut op = TryFilter::new(|n: &u8| {
                let n = *n;
                future::ready(if n == 0 { Err("zero") } else { Ok(n > 1) })
            });
            assert_eq!(op.call(2).await, Ok(Some(2)));
            assert_eq!(op.call(1).await, Ok(None));
            assert_eq!(op.call(0).await, Err("zero"));
        });
    }

    #[test]
    fn try_map_wraps_value() {
        futures_lite::future::block_on(async {
            let mut op = TryMap::new(|n: u8| future::ready(Ok::<_, ()>(n * 2)));
            assert_eq!(op.call(3).await, Ok(Some(6)));
        });
    }
}
