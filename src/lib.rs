//! poolbench 核心库入口
//!
//! 同一个工作负载分别用串行、线程池、进程池和单线程事件循环执行，比较耗时。

pub mod config;
pub mod strategy;
pub mod harness;
pub mod workload;
pub mod worker;
pub mod process_pool;
pub mod event_loop;
pub mod cpu_bound;
pub mod file_churn;
pub mod mixed_io;

use std::path::PathBuf;

/// 通用错误类型
#[derive(thiserror::Error, Debug)]
pub enum BenchError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("文件操作失败 {path:?}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP请求失败: {0}")]
    Http(#[from] reqwest::Error),

    #[error("消息编解码错误: {0}")]
    Codec(#[from] bincode::Error),

    #[error("无效的配置 {key}={value:?}")]
    Config { key: String, value: String },

    #[error("工作池大小必须大于0")]
    InvalidPoolSize,

    #[error("找不到工作进程程序: {0:?}")]
    WorkerNotFound(PathBuf),

    #[error("工作进程启动失败 {program:?}: {source}")]
    WorkerSpawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("工作进程 {0} 意外退出")]
    WorkerExited(usize),

    #[error("工作进程 {worker} 任务失败: {message}")]
    TaskFailed { worker: usize, message: String },

    #[error("任务执行时panic: {0}")]
    TaskPanicked(String),

    #[error("任务返回了意外的结果: {0}")]
    UnexpectedOutput(String),

    #[error("{workload} 不支持策略 {strategy}")]
    UnsupportedStrategy {
        workload: &'static str,
        strategy: Strategy,
    },

    #[error("异步任务join失败: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, BenchError>;

pub use config::{CpuBoundConfig, FileChurnConfig, MixedIoConfig};
pub use event_loop::EventLoop;
pub use harness::{run_comparison, Comparator, Measurement, Report};
pub use process_pool::{Job, JobOutput, ProcessPool, WorkerProgram};
pub use strategy::Strategy;
pub use worker::ThreadPool;
