use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use poolbench::EventLoop;

#[test]
fn test_gather_returns_in_submission_order() {
    let event_loop = EventLoop::new().unwrap();
    let finished = Rc::new(RefCell::new(Vec::new()));

    // 先提交的任务睡得更久
    let tasks = (0..5u64)
        .map(|i| {
            let finished = Rc::clone(&finished);
            async move {
                tokio::time::sleep(Duration::from_millis((5 - i) * 20)).await;
                finished.borrow_mut().push(i);
                i * 10
            }
        })
        .collect();
    let outputs = event_loop.gather(tasks).unwrap();

    assert_eq!(outputs, vec![0, 10, 20, 30, 40]);
    assert_eq!(*finished.borrow(), vec![4, 3, 2, 1, 0]);
}

#[test]
fn test_waiting_tasks_overlap() {
    let event_loop = EventLoop::new().unwrap();
    let tasks = (0..10)
        .map(|_| async { tokio::time::sleep(Duration::from_millis(100)).await })
        .collect();

    let start = Instant::now();
    event_loop.gather(tasks).unwrap();
    let elapsed = start.elapsed();

    // 串行需要1秒
    assert!(elapsed < Duration::from_millis(600), "took {elapsed:?}");
}

#[test]
fn test_tasks_interleave_only_at_await() {
    let event_loop = EventLoop::new().unwrap();
    let log = Rc::new(RefCell::new(Vec::new()));

    let tasks = ["a", "b"]
        .into_iter()
        .map(|name| {
            let log = Rc::clone(&log);
            async move {
                log.borrow_mut().push(format!("{name}1"));
                tokio::task::yield_now().await;
                log.borrow_mut().push(format!("{name}2"));
            }
        })
        .collect();
    event_loop.gather(tasks).unwrap();

    // 两个任务都先跑到 await 才轮到对方；恢复顺序不做保证
    let log = log.borrow();
    assert_eq!(log.len(), 4);
    assert_eq!(log[..2], ["a1", "b1"]);
    let mut resumed = log[2..].to_vec();
    resumed.sort();
    assert_eq!(resumed, vec!["a2", "b2"]);
}

#[test]
fn test_panicking_task_is_a_join_error() {
    let event_loop = EventLoop::new().unwrap();
    let tasks: Vec<std::pin::Pin<Box<dyn std::future::Future<Output = u8>>>> = vec![
        Box::pin(async { 1 }),
        Box::pin(async { panic!("task blew up") }),
    ];

    let err = event_loop.gather(tasks).unwrap_err();
    assert!(matches!(err, poolbench::BenchError::Join(_)));
}

#[test]
fn test_block_on_runs_a_single_future() {
    let event_loop = EventLoop::new().unwrap();
    assert_eq!(event_loop.block_on(async { 7 }), 7);
}
