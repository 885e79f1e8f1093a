use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::bounded;
use poolbench::{BenchError, ThreadPool};
use proptest::prelude::*;

mod test_utils;

#[test]
fn test_map_keeps_submission_order() {
    test_utils::init_logger();
    let pool = ThreadPool::new(4).unwrap();

    // 先提交的任务睡得更久，完成顺序与提交顺序相反
    let results = pool
        .map(
            |i: u64| {
                thread::sleep(Duration::from_millis((8 - i) * 10));
                i * i
            },
            0..8u64,
        )
        .unwrap();

    assert_eq!(results, vec![0, 1, 4, 9, 16, 25, 36, 49]);
}

#[test]
fn test_map_produces_one_result_per_input() {
    let pool = ThreadPool::new(3).unwrap();
    let results = pool.map(|s: String| s.len(), vec!["a".to_string(), "bb".into(), "ccc".into(), "".into()]).unwrap();
    assert_eq!(results, vec![1, 2, 3, 0]);

    let empty: Vec<usize> = pool.map(|x: usize| x, Vec::new()).unwrap();
    assert!(empty.is_empty());
}

#[test]
fn test_zero_sized_pool_is_rejected() {
    assert!(matches!(ThreadPool::new(0), Err(BenchError::InvalidPoolSize)));
}

#[test]
fn test_panicking_job_is_reported_and_pool_survives() {
    let pool = ThreadPool::new(2).unwrap();

    let err = pool
        .map(
            |i: u32| {
                if i == 2 {
                    panic!("boom");
                }
                i
            },
            0..4u32,
        )
        .unwrap_err();
    assert!(matches!(err, BenchError::TaskPanicked(_)));

    // 两个worker都还在
    assert_eq!(pool.map(|i: u32| i + 1, 0..4u32).unwrap(), vec![1, 2, 3, 4]);
}

#[test]
fn test_jobs_run_in_parallel() {
    let size = 4;
    let pool = ThreadPool::new(size).unwrap();
    let barrier = Arc::new(std::sync::Barrier::new(size));

    // 只有全部任务同时在跑，barrier 才会放行
    let results = pool
        .map(
            move |i: usize| {
                barrier.wait();
                i
            },
            0..size,
        )
        .unwrap();
    assert_eq!(results, vec![0, 1, 2, 3]);
}

#[test]
fn test_execute_and_drop_drains_queue() {
    let counter = Arc::new(AtomicUsize::new(0));
    let (done_tx, done_rx) = bounded(10);
    {
        let pool = ThreadPool::new(2).unwrap();
        for _ in 0..10 {
            let counter = Arc::clone(&counter);
            let done_tx = done_tx.clone();
            pool.execute(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                done_tx.send(()).unwrap();
            });
        }
    }
    // 终止消息排在任务之后，drop 返回时所有任务都已执行
    assert_eq!(counter.load(Ordering::SeqCst), 10);
    assert_eq!(done_rx.try_iter().count(), 10);
}

proptest! {
    #[test]
    fn prop_map_matches_sequential_map(inputs in prop::collection::vec(any::<i32>(), 0..64), size in 1usize..6) {
        let pool = ThreadPool::new(size).unwrap();
        let expected: Vec<i64> = inputs.iter().map(|&x| x as i64 * 3).collect();
        let actual = pool.map(|x: i32| x as i64 * 3, inputs).unwrap();
        prop_assert_eq!(actual, expected);
    }
}
