#![no_std]

extern crate alloc;

use alloc::vec::Vec;
use core::future;
use futures_lite::future::block_on;
use sequence_concurrency::parallel::ParallelRunner;
use sequence_concurrency::prelude::*;

// These tests ensure that the operations provided by `sequence-concurrency` work in a no std environment.

#[test]
fn parallel_map() {
    block_on(async {
        let out = [1u8, 2, 3].parallel_map(|n| future::ready(n * 2)).await;
        assert_eq!(out, [2, 4, 6]);
    });
}

#[test]
fn parallel_filter() {
    block_on(async {
        let out = [1u8, 2, 3, 4].parallel_filter(|n| future::ready(*n > 2)).await;
        assert_eq!(out, [3, 4]);
    });
}

#[test]
fn try_parallel_map() {
    block_on(async {
        let out: Result<Vec<u8>, &str> = [1u8, 2, 3]
            .try_parallel_map(|n| future::ready(if n == 2 { Err("two") } else { Ok(n) }))
            .limit(1)
            .await;
        assert_eq!(out, Err("two"));
    });
}

#[test]
fn runner() {
    block_on(async {
        let out = ParallelRunner::new(2)
            .run(0..6u8, |n| future::ready(Ok::<_, ()>((n % 2 == 0).then_some(n))))
            .await;
        assert_eq!(out, Ok(Vec::from([0, 2, 4])));
    });
}

#[test]
fn async_reduce() {
    block_on(async {
        let sum = [1u8, 2, 3].async_reduce(0, |acc, n| future::ready(acc + n)).await;
        assert_eq!(sum, 6);
    });
}
