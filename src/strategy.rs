//! 执行策略

use std::fmt;

/// 同一工作负载的执行方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// 单线程顺序执行(基线)
    Serial,
    /// 固定大小的OS线程池
    Threads,
    /// 固定大小的进程池，`chunksize` 为每次分发给子进程的任务数
    Processes { chunksize: usize },
    /// 单线程事件循环，仅在 await 处切换任务
    Cooperative,
}

impl Strategy {
    /// 计时行使用的名称
    pub fn label(&self) -> &'static str {
        match self {
            Strategy::Serial => "Baseline",
            Strategy::Threads => "Threads",
            Strategy::Processes { chunksize } if *chunksize > 1 => "Processes using pool",
            Strategy::Processes { .. } => "Processes",
            Strategy::Cooperative => "Async",
        }
    }

    /// 开始执行前打印的提示
    pub fn banner(&self, workload: &str) -> String {
        match self {
            Strategy::Serial => format!("Starting {workload} (baseline, single-threaded)..."),
            Strategy::Threads => format!("Starting {workload} with threads..."),
            Strategy::Processes { chunksize } if *chunksize > 1 => {
                format!("Starting {workload} with processes using pool (chunksize = {chunksize})...")
            }
            Strategy::Processes { .. } => format!("Starting {workload} with processes..."),
            Strategy::Cooperative => format!("Starting {workload} with an event loop..."),
        }
    }

    pub fn is_parallel(&self) -> bool {
        matches!(self, Strategy::Threads | Strategy::Processes { .. })
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Processes { chunksize } => write!(f, "processes(chunksize={chunksize})"),
            other => f.write_str(&other.label().to_lowercase()),
        }
    }
}
