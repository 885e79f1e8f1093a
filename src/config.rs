//! 基准配置
//!
//! 默认值就是各个基准程序原本写死的常量，`POOLBENCH_*` 环境变量可以覆盖。

use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::info;

use crate::{BenchError, Result};

pub const ENV_TASKS: &str = "POOLBENCH_TASKS";
pub const ENV_REPEAT: &str = "POOLBENCH_REPEAT";
pub const ENV_CHUNKSIZE: &str = "POOLBENCH_CHUNKSIZE";
pub const ENV_FILE_COUNT: &str = "POOLBENCH_FILE_COUNT";
pub const ENV_FILE_SIZE: &str = "POOLBENCH_FILE_SIZE";
pub const ENV_WORK_DIR: &str = "POOLBENCH_WORK_DIR";
pub const ENV_API_URL: &str = "POOLBENCH_API_URL";

const MIB: usize = 1024 * 1024;

/// CPU密集型基准配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpuBoundConfig {
    /// 并行任务数(与CPU核数相当为宜)
    pub num_tasks: usize,
    /// 每个任务的循环次数
    pub repeat: u64,
    /// 批量进程池的分发批大小，`None` 时取 max(1, num_tasks / 2)
    pub chunksize: Option<usize>,
}

impl Default for CpuBoundConfig {
    fn default() -> Self {
        Self {
            num_tasks: 4,
            repeat: 10_000_000,
            chunksize: None,
        }
    }
}

impl CpuBoundConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源叠加覆盖项
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        override_parsed(&lookup, ENV_TASKS, &mut config.num_tasks)?;
        override_parsed(&lookup, ENV_REPEAT, &mut config.repeat)?;
        if let Some(raw) = lookup(ENV_CHUNKSIZE) {
            config.chunksize = Some(parse_value(ENV_CHUNKSIZE, &raw)?);
        }
        Ok(config)
    }

    /// 批量进程池实际使用的批大小
    pub fn effective_chunksize(&self) -> usize {
        self.chunksize.unwrap_or(self.num_tasks / 2).max(1)
    }
}

/// 文件I/O基准配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChurnConfig {
    pub file_count: usize,
    pub file_size: usize,
    pub work_dir: PathBuf,
    pub prefix: String,
}

impl Default for FileChurnConfig {
    fn default() -> Self {
        Self {
            file_count: 30,
            file_size: 10 * MIB,
            work_dir: PathBuf::from("."),
            prefix: "test_file_".to_string(),
        }
    }
}

impl FileChurnConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        override_parsed(&lookup, ENV_FILE_COUNT, &mut config.file_count)?;
        override_parsed(&lookup, ENV_FILE_SIZE, &mut config.file_size)?;
        override_parsed(&lookup, ENV_WORK_DIR, &mut config.work_dir)?;
        Ok(config)
    }

    /// 第 `index` 个任务的临时文件路径
    pub fn file_path(&self, index: usize) -> PathBuf {
        temp_file_path(&self.work_dir, &self.prefix, index)
    }
}

/// 文件I/O + HTTP 混合基准配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixedIoConfig {
    pub file_count: usize,
    pub file_size: usize,
    pub work_dir: PathBuf,
    /// 请求地址前缀，任务序号直接拼在末尾
    pub api_url: String,
    pub sync_prefix: String,
    pub async_prefix: String,
}

impl Default for MixedIoConfig {
    fn default() -> Self {
        Self {
            file_count: 10,
            file_size: MIB,
            work_dir: PathBuf::from("."),
            api_url: "https://jsonplaceholder.typicode.com/todos/".to_string(),
            sync_prefix: "sync_test_file_".to_string(),
            async_prefix: "async_test_file_".to_string(),
        }
    }
}

impl MixedIoConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        override_parsed(&lookup, ENV_FILE_COUNT, &mut config.file_count)?;
        override_parsed(&lookup, ENV_FILE_SIZE, &mut config.file_size)?;
        override_parsed(&lookup, ENV_WORK_DIR, &mut config.work_dir)?;
        override_parsed(&lookup, ENV_API_URL, &mut config.api_url)?;
        Ok(config)
    }

    pub fn sync_file_path(&self, index: usize) -> PathBuf {
        temp_file_path(&self.work_dir, &self.sync_prefix, index)
    }

    pub fn async_file_path(&self, index: usize) -> PathBuf {
        temp_file_path(&self.work_dir, &self.async_prefix, index)
    }

    pub fn request_url(&self, index: usize) -> String {
        format!("{}{}", self.api_url, index)
    }
}

fn temp_file_path(dir: &Path, prefix: &str, index: usize) -> PathBuf {
    dir.join(format!("{prefix}{index}.txt"))
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim().parse().map_err(|_| BenchError::Config {
        key: key.to_string(),
        value: raw.to_string(),
    })
}

fn override_parsed<T, F>(lookup: &F, key: &str, slot: &mut T) -> Result<()>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup(key) {
        *slot = parse_value(key, &raw)?;
        info!("配置覆盖 {}={}", key, raw);
    }
    Ok(())
}
