use super::indexed::Indexed;
use super::Operation;

use alloc::vec::Vec;
use core::fmt;
use core::future::Future;
use core::mem;
use core::num::NonZeroUsize;
use core::pin::Pin;
use core::task::{ready, Context, Poll};
use futures_buffered::FuturesUnordered;
use futures_core::Stream;
use pin_project::pin_project;

/// How many operation outcomes are recorded in a single call to `poll`
/// before the task yields back to the executor.
const YIELD_BUDGET: usize = 32;

/// A future which applies an [`Operation`] to every item of an iterator,
/// keeping at most `limit` operations in flight at any given moment.
///
/// This `struct` is created by the [`run`] method on [`ParallelRunner`]. See
/// its documentation for more.
///
/// [`run`]: super::ParallelRunner::run
/// [`ParallelRunner`]: super::ParallelRunner
#[must_use = "futures do nothing unless you `.await` or poll them"]
#[pin_project]
pub struct Run<I, Op>
where
    I: Iterator,
    Op: Operation<I::Item>,
{
    items: I,
    op: Op,
    /// The operations which are currently in flight, tagged with the
    /// position of the item they were dispatched for.
    #[pin]
    in_flight: FuturesUnordered<Indexed<Op::Future>>,
    /// The values kept so far, in completion order.
    slots: Vec<(usize, Op::Output)>,
    /// The first error returned by any operation.
    failure: Option<Op::Error>,
    next_index: usize,
    limit: usize,
    preserve_order: bool,
    state: State,
}

/// The lifecycle of a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Pulling items from the iterator as concurrency slots free up.
    Dispatching,
    /// No further items will be dispatched; waiting for in-flight work.
    Draining,
    /// The output has been returned.
    Completed,
}

impl<I, Op> Run<I, Op>
where
    I: Iterator,
    Op: Operation<I::Item>,
{
    pub(crate) fn new(items: I, op: Op, limit: NonZeroUsize, preserve_order: bool) -> Self {
        Self {
            items,
            op,
            in_flight: FuturesUnordered::new(),
            slots: Vec::new(),
            failure: None,
            next_index: 0,
            limit: limit.get(),
            preserve_order,
            state: State::Dispatching,
        }
    }

    /// Clamps to a minimum of one.
    pub(crate) fn set_limit(&mut self, limit: usize) {
        self.limit = limit.max(1);
    }

    pub(crate) fn set_preserve_order(&mut self, preserve_order: bool) {
        self.preserve_order = preserve_order;
    }

    /// The maximum number of operations in flight at once.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Whether the output is returned in the order of the input.
    pub fn preserves_order(&self) -> bool {
        self.preserve_order
    }
}

impl<I, Op> fmt::Debug for Run<I, Op>
where
    I: Iterator,
    Op: Operation<I::Item>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Run")
            .field("state", &self.state)
            .field("limit", &self.limit)
            .field("preserve_order", &self.preserve_order)
            .field("dispatched", &self.next_index)
            .field("in_flight", &self.in_flight.len())
            .field("failed", &self.failure.is_some())
            .finish()
    }
}

impl<I, Op> Future for Run<I, Op>
where
    I: Iterator,
    Op: Operation<I::Item>,
{
    type Output = Result<Vec<Op::Output>, Op::Error>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut this = self.project();
        let mut budget = YIELD_BUDGET;
        loop {
            if budget == 0 {
                tracing::trace!(
                    in_flight = this.in_flight.len(),
                    "budget exhausted, yielding"
                );
                cx.waker().wake_by_ref();
                return Poll::Pending;
            }
            match *this.state {
                State::Dispatching => {
                    // Admission: only pull a new item once a slot is free.
                    while this.in_flight.len() < *this.limit {
                        let Some(item) = this.items.next() else {
                            tracing::debug!(
                                dispatched = *this.next_index,
                                "input exhausted, draining"
                            );
                            *this.state = State::Draining;
                            break;
                        };
                        let index = *this.next_index;
                        *this.next_index += 1;
                        tracing::trace!(
                            index,
                            in_flight = this.in_flight.len(),
                            "dispatching operation"
                        );
                        let fut = Indexed::new(index, this.op.call(item));
                        this.in_flight.as_mut().push(fut);
                    }
                    if *this.state != State::Dispatching {
                        continue;
                    }

                    // Every slot is taken: wait for any operation to finish.
                    match ready!(this.in_flight.as_mut().poll_next(cx)) {
                        Some((index, res)) => {
                            budget -= 1;
                            if record(&mut *this.slots, &mut *this.failure, index, res) {
                                tracing::debug!(
                                    index,
                                    in_flight = this.in_flight.len(),
                                    "operation failed, no longer dispatching"
                                );
                                *this.state = State::Draining;
                            }
                        }
                        None => *this.state = State::Draining,
                    }
                }
                State::Draining => {
                    if !this.in_flight.is_empty() {
                        // Operations dispatched before a failure still run to
                        // completion; only their outputs are discarded.
                        let next = ready!(this.in_flight.as_mut().poll_next(cx));
                        if let Some((index, res)) = next {
                            budget -= 1;
                            record(&mut *this.slots, &mut *this.failure, index, res);
                        }
                        continue;
                    }

                    *this.state = State::Completed;
                    if let Some(err) = this.failure.take() {
                        tracing::debug!(dispatched = *this.next_index, "run failed");
                        return Poll::Ready(Err(err));
                    }

                    let mut slots = mem::take(&mut *this.slots);
                    if *this.preserve_order {
                        slots.sort_unstable_by_key(|(index, _)| *index);
                    }
                    tracing::debug!(
                        dispatched = *this.next_index,
                        kept = slots.len(),
                        "run completed"
                    );
                    let values = slots.into_iter().map(|(_, value)| value).collect();
                    return Poll::Ready(Ok(values));
                }
                State::Completed => panic!("future polled after completing"),
            }
        }
    }
}

/// Record the outcome of a single operation.
///
/// Returns `true` if this outcome is the first failure of the run.
fn record<T, E>(
    slots: &mut Vec<(usize, T)>,
    failure: &mut Option<E>,
    index: usize,
    res: Result<Option<T>, E>,
) -> bool {
    match res {
        Ok(Some(value)) if failure.is_none() => {
            tracing::trace!(index, "operation kept a value");
            slots.push((index, value));
            false
        }
        Ok(_) => false,
        Err(err) => {
            if failure.is_some() {
                tracing::trace!(index, "discarding subsequent failure");
                return false;
            }
            *failure = Some(err);
            // Partial results are never returned from a failed run.
            slots.clear();
            true
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parallel::ParallelRunner;
    use alloc::vec;
    use core::cell::Cell;
    use core::future;

    #[test]
    fn record_keeps_first_failure() {
        let mut slots = vec![(0, 'a')];
        let mut failure = None;
        assert!(record(&mut slots, &mut failure, 1, Err("first")));
        assert!(slots.is_empty());
        assert!(!record(&mut slots, &mut failure, 2, Err("second")));
        assert!(!record(&mut slots, &mut failure, 3, Ok(Some('b'))));
        assert!(slots.is_empty());
        assert_eq!(failure, Some("first"));
    }

    #[test]
    fn empty_input() {
        futures_lite::future::block_on(async {
            let out = ParallelRunner::new(4)
                .run(core::iter::empty::<u8>(), |n| future::ready(Ok::<_, ()>(Some(n))))
                .await;
            assert_eq!(out, Ok(vec![]));
        });
    }

    #[test]
    fn skipped_items_are_not_recorded() {
        futures_lite::future::block_on(async {
            let out = ParallelRunner::new(3)
                .run(0..10u32, |n| {
                    future::ready(Ok::<_, ()>(if n % 3 == 0 { Some(n) } else { None }))
                })
                .await;
            assert_eq!(out, Ok(vec![0, 3, 6, 9]));
        });
    }

    #[test]
    fn stops_dispatching_after_failure() {
        futures_lite::future::block_on(async {
            let calls = Cell::new(0);
            let out = ParallelRunner::new(1)
                .run(0..10u32, |n| {
                    calls.set(calls.get() + 1);
                    future::ready(if n == 2 { Err(n) } else { Ok(Some(n)) })
                })
                .await;
            assert_eq!(out, Err(2));
            assert_eq!(calls.get(), 3);
        });
    }

    #[test]
    fn unbounded_input_stops_at_first_error() {
        futures_lite::future::block_on(async {
            let out = ParallelRunner::new(2)
                .run(0u64.., |n| future::ready(if n == 5 { Err(n) } else { Ok(Some(n)) }))
                .await;
            assert_eq!(out, Err(5));

            let out = ParallelRunner::default()
                .run(core::iter::repeat(1u8), |_| {
                    future::ready(Err::<Option<u8>, _>("stop"))
                })
                .await;
            assert_eq!(out, Err("stop"));
        });
    }

    #[test]
    fn yields_to_the_executor_between_batches() {
        futures_lite::future::block_on(async {
            let items = YIELD_BUDGET * 4;
            let mut run = core::pin::pin!(ParallelRunner::new(4)
                .run(0..items, |n| future::ready(Ok::<_, ()>(Some(n)))));

            let mut polls = 1;
            while futures_lite::future::poll_once(run.as_mut()).await.is_none() {
                polls += 1;
            }
            assert!(polls > 1);
            assert!(polls <= items / YIELD_BUDGET + 1);
        });
    }

    #[test]
    #[should_panic(expected = "future polled after completing")]
    fn poll_after_completion_panics() {
        futures_lite::future::block_on(async {
            let mut run = core::pin::pin!(ParallelRunner::new(1)
                .run(0..1u8, |n| future::ready(Ok::<_, ()>(Some(n)))));
            let _ = run.as_mut().await;
            let _ = run.as_mut().await;
        });
    }
}
