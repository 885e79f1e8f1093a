//! CPU密集型比较
//!
//! N 个互相独立的循环计数任务，每个数到 `repeat`。
//! 协作式事件循环的版本用于说明：纯计算任务不会挂起，因此得不到任何并行。

use log::{debug, info};

use crate::config::CpuBoundConfig;
use crate::event_loop::EventLoop;
use crate::harness::Comparator;
use crate::process_pool::{Job, JobOutput, ProcessPool, WorkerProgram};
use crate::strategy::Strategy;
use crate::worker::ThreadPool;
use crate::workload::{cpu_bound_task, cpu_bound_task_async};
use crate::{BenchError, Result};

/// 单线程顺序执行
pub fn run_serial(n: usize, repeat: u64) -> Vec<u64> {
    (0..n).map(|_| cpu_bound_task(repeat)).collect()
}

/// 大小为 n 的线程池
pub fn run_threads(n: usize, repeat: u64) -> Result<Vec<u64>> {
    let pool = ThreadPool::new(n)?;
    pool.map(cpu_bound_task, vec![repeat; n])
}

/// 大小为 n 的进程池，`chunksize` 为每批分发的任务数
pub fn run_processes(program: &WorkerProgram, n: usize, repeat: u64, chunksize: usize) -> Result<Vec<u64>> {
    let mut pool = ProcessPool::spawn(program, n)?;
    let jobs = vec![Job::CpuBound { repeat }; n];
    let outputs = pool.map(jobs, chunksize)?;
    pool.shutdown()?;

    outputs
        .into_iter()
        .map(|output| match output {
            JobOutput::Count(total) => Ok(total),
            other => Err(BenchError::UnexpectedOutput(format!("{other:?}"))),
        })
        .collect()
}

/// 在单线程事件循环上"并发"调用同一个阻塞任务
pub fn run_cooperative(n: usize, repeat: u64) -> Result<Vec<u64>> {
    let event_loop = EventLoop::new()?;
    let tasks = (0..n).map(|_| cpu_bound_task_async(repeat)).collect();
    event_loop.gather(tasks)
}

/// CPU密集型基准
#[derive(Debug, Clone)]
pub struct CpuBoundComparator {
    config: CpuBoundConfig,
    program: WorkerProgram,
    strategies: Vec<Strategy>,
}

impl CpuBoundComparator {
    /// 串行、线程池、进程池，以及带批大小的进程池
    ///
    /// 批大小算出来是1时批量版本与普通进程池完全相同，只跑一次。
    pub fn gil(config: CpuBoundConfig, program: WorkerProgram) -> Self {
        let mut strategies = vec![
            Strategy::Serial,
            Strategy::Threads,
            Strategy::Processes { chunksize: 1 },
        ];
        let chunksize = config.effective_chunksize();
        if chunksize > 1 {
            strategies.push(Strategy::Processes { chunksize });
        } else {
            info!("chunksize is 1 for {} tasks, skipping the batched process pool run", config.num_tasks);
        }
        Self { config, program, strategies }
    }

    /// 串行、线程池、进程池，以及事件循环
    pub fn cooperative(config: CpuBoundConfig, program: WorkerProgram) -> Self {
        let strategies = vec![
            Strategy::Serial,
            Strategy::Threads,
            Strategy::Processes { chunksize: 1 },
            Strategy::Cooperative,
        ];
        Self { config, program, strategies }
    }

    pub fn config(&self) -> &CpuBoundConfig {
        &self.config
    }

    pub fn execute(&self, strategy: Strategy) -> Result<Vec<u64>> {
        let CpuBoundConfig { num_tasks, repeat, .. } = self.config;
        match strategy {
            Strategy::Serial => Ok(run_serial(num_tasks, repeat)),
            Strategy::Threads => run_threads(num_tasks, repeat),
            Strategy::Processes { chunksize } => run_processes(&self.program, num_tasks, repeat, chunksize),
            Strategy::Cooperative => run_cooperative(num_tasks, repeat),
        }
    }
}

impl Comparator for CpuBoundComparator {
    fn workload(&self) -> &str {
        "CPU-bound tasks"
    }

    fn strategies(&self) -> Vec<Strategy> {
        self.strategies.clone()
    }

    fn run(&self, strategy: Strategy) -> Result<usize> {
        let results = self.execute(strategy)?;
        debug!("{} results: {:?}", strategy, results);
        Ok(results.len())
    }
}
