//! 文件I/O + HTTP 混合比较
//!
//! 每个任务写、读、删一个文件，再对 `api_url + index` 发一次GET，返回状态码。
//! 事件循环版本里文件操作走 `tokio::fs`，请求走异步客户端，这些 await 就是挂起点。

use std::rc::Rc;

use log::debug;

use crate::config::MixedIoConfig;
use crate::event_loop::EventLoop;
use crate::harness::Comparator;
use crate::strategy::Strategy;
use crate::worker::ThreadPool;
use crate::workload::{fetch_status, fetch_status_async, file_io_task, file_io_task_async};
use crate::{BenchError, Result};

/// 同步版本的单个任务
pub fn sync_io_task(client: &reqwest::blocking::Client, config: &MixedIoConfig, index: usize) -> Result<u16> {
    file_io_task(&config.sync_file_path(index), config.file_size)?;
    fetch_status(client, &config.request_url(index))
}

/// 异步版本的单个任务
pub async fn async_io_task(client: &reqwest::Client, config: &MixedIoConfig, index: usize) -> Result<u16> {
    file_io_task_async(&config.async_file_path(index), config.file_size).await?;
    fetch_status_async(client, &config.request_url(index)).await
}

/// 单线程顺序执行
pub fn run_sync(config: &MixedIoConfig) -> Result<Vec<u16>> {
    let client = reqwest::blocking::Client::builder().build()?;
    (0..config.file_count)
        .map(|index| sync_io_task(&client, config, index))
        .collect()
}

/// 线程池，大小等于任务数
pub fn run_threads(config: &MixedIoConfig) -> Result<Vec<u16>> {
    let client = reqwest::blocking::Client::builder().build()?;
    let pool = ThreadPool::new(config.file_count)?;
    let shared = config.clone();
    pool.map(
        move |index| sync_io_task(&client, &shared, index),
        0..config.file_count,
    )?
    .into_iter()
    .collect()
}

/// 所有任务同时交给单线程事件循环
pub fn run_async(config: &MixedIoConfig) -> Result<Vec<u16>> {
    let event_loop = EventLoop::new()?;
    let client = reqwest::Client::builder().build()?;
    let shared = Rc::new(config.clone());

    let tasks = (0..config.file_count)
        .map(|index| {
            let client = client.clone();
            let config = Rc::clone(&shared);
            async move { async_io_task(&client, &config, index).await }
        })
        .collect();

    event_loop.gather(tasks)?.into_iter().collect()
}

/// 混合I/O基准
#[derive(Debug, Clone)]
pub struct MixedIoComparator {
    config: MixedIoConfig,
}

impl MixedIoComparator {
    pub fn new(config: MixedIoConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self, strategy: Strategy) -> Result<Vec<u16>> {
        match strategy {
            Strategy::Serial => run_sync(&self.config),
            Strategy::Threads => run_threads(&self.config),
            Strategy::Cooperative => run_async(&self.config),
            Strategy::Processes { .. } => Err(BenchError::UnsupportedStrategy {
                workload: "mixed I/O",
                strategy,
            }),
        }
    }
}

impl Comparator for MixedIoComparator {
    fn workload(&self) -> &str {
        "file I/O and HTTP tasks"
    }

    fn strategies(&self) -> Vec<Strategy> {
        vec![Strategy::Serial, Strategy::Threads, Strategy::Cooperative]
    }

    fn label(&self, strategy: Strategy) -> &'static str {
        match strategy {
            Strategy::Serial => "Sync",
            other => other.label(),
        }
    }

    fn run(&self, strategy: Strategy) -> Result<usize> {
        let statuses = self.execute(strategy)?;
        debug!("{} status codes: {:?}", strategy, statuses);
        Ok(statuses.len())
    }
}
