use core::future::Future;
use core::pin::Pin;
use core::task::{ready, Context, Poll};

/// Tags the output of a future with the position of the item that produced it.
///
/// The index is assigned when the item is dispatched, not when the future
/// completes.
#[derive(Debug)]
#[pin_project::pin_project]
pub(crate) struct Indexed<Fut> {
    done: bool,
    index: usize,
    #[pin]
    fut: Fut,
}

impl<Fut> Indexed<Fut> {
    pub(crate) fn new(index: usize, fut: Fut) -> Self {
        Self {
            done: false,
            index,
            fut,
        }
    }
}

impl<Fut: Future> Future for Indexed<Fut> {
    type Output = (usize, Fut::Output);

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        if *this.done {
            panic!("future has already been polled to completion once");
        }

        let output = ready!(this.fut.poll(cx));
        *this.done = true;
        Poll::Ready((*this.index, output))
    }
}
