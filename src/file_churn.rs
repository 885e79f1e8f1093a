//! 文件I/O比较
//!
//! 每个任务写入一个随机内容的文件，完整读回后删除。

use log::debug;

use crate::config::FileChurnConfig;
use crate::harness::Comparator;
use crate::process_pool::{Job, JobOutput, ProcessPool, WorkerProgram};
use crate::strategy::Strategy;
use crate::worker::ThreadPool;
use crate::workload::file_io_task;
use crate::{BenchError, Result};

/// 单线程顺序执行
pub fn run_serial(config: &FileChurnConfig) -> Result<Vec<u64>> {
    (0..config.file_count)
        .map(|index| file_io_task(&config.file_path(index), config.file_size))
        .collect()
}

/// 线程池，大小等于文件数
pub fn run_threads(config: &FileChurnConfig) -> Result<Vec<u64>> {
    let pool = ThreadPool::new(config.file_count)?;
    let shared = config.clone();
    pool.map(
        move |index| file_io_task(&shared.file_path(index), shared.file_size),
        0..config.file_count,
    )?
    .into_iter()
    .collect()
}

/// 进程池，大小等于文件数
pub fn run_processes(program: &WorkerProgram, config: &FileChurnConfig) -> Result<Vec<u64>> {
    let mut pool = ProcessPool::spawn(program, config.file_count)?;
    let jobs = (0..config.file_count)
        .map(|index| Job::FileChurn {
            path: config.file_path(index),
            size: config.file_size,
        })
        .collect();
    let outputs = pool.map(jobs, 1)?;
    pool.shutdown()?;

    outputs
        .into_iter()
        .map(|output| match output {
            JobOutput::BytesRead(bytes) => Ok(bytes),
            other => Err(BenchError::UnexpectedOutput(format!("{other:?}"))),
        })
        .collect()
}

/// 文件I/O基准
#[derive(Debug, Clone)]
pub struct FileChurnComparator {
    config: FileChurnConfig,
    program: WorkerProgram,
}

impl FileChurnComparator {
    pub fn new(config: FileChurnConfig, program: WorkerProgram) -> Self {
        Self { config, program }
    }

    pub fn execute(&self, strategy: Strategy) -> Result<Vec<u64>> {
        match strategy {
            Strategy::Serial => run_serial(&self.config),
            Strategy::Threads => run_threads(&self.config),
            Strategy::Processes { .. } => run_processes(&self.program, &self.config),
            Strategy::Cooperative => Err(BenchError::UnsupportedStrategy {
                workload: "file churn",
                strategy,
            }),
        }
    }
}

impl Comparator for FileChurnComparator {
    fn workload(&self) -> &str {
        "file I/O tasks"
    }

    fn strategies(&self) -> Vec<Strategy> {
        vec![
            Strategy::Serial,
            Strategy::Threads,
            Strategy::Processes { chunksize: 1 },
        ]
    }

    fn run(&self, strategy: Strategy) -> Result<usize> {
        let bytes = self.execute(strategy)?;
        debug!("{} read back {} bytes in total", strategy, bytes.iter().sum::<u64>());
        Ok(bytes.len())
    }
}
