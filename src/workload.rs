//! 合成工作负载
//!
//! 三种任务：忙循环计数、文件写读删、文件写读删加一次HTTP GET。

use std::fs;
use std::hint::black_box;
use std::path::Path;

use log::debug;
use rand::RngCore;

use crate::{BenchError, Result};

/// 单纯的循环计数，用来占用CPU
pub fn cpu_bound_task(repeat: u64) -> u64 {
    let mut total: u64 = 0;
    for _ in 0..repeat {
        total = black_box(total + 1);
    }
    total
}

/// 事件循环中调用的版本。内部没有任何 await，不会让出执行权
pub async fn cpu_bound_task_async(repeat: u64) -> u64 {
    cpu_bound_task(repeat)
}

/// 生成 `size` 字节的随机数据
pub fn random_bytes(size: usize) -> Vec<u8> {
    let mut data = vec![0u8; size];
    rand::rng().fill_bytes(&mut data);
    data
}

fn file_error(path: &Path) -> impl FnOnce(std::io::Error) -> BenchError + '_ {
    move |source| BenchError::File {
        path: path.to_path_buf(),
        source,
    }
}

/// 写入随机数据，完整读回，然后删除文件。返回读回的字节数
pub fn file_io_task(path: &Path, size: usize) -> Result<u64> {
    fs::write(path, random_bytes(size)).map_err(file_error(path))?;
    let read_back = fs::read(path).map_err(file_error(path))?;
    fs::remove_file(path).map_err(file_error(path))?;
    debug!("churned {:?} ({} bytes)", path, read_back.len());
    Ok(read_back.len() as u64)
}

/// `file_io_task` 的异步版本，写、读、删三处都是挂起点
pub async fn file_io_task_async(path: &Path, size: usize) -> Result<u64> {
    tokio::fs::write(path, random_bytes(size))
        .await
        .map_err(file_error(path))?;
    let read_back = tokio::fs::read(path).await.map_err(file_error(path))?;
    tokio::fs::remove_file(path).await.map_err(file_error(path))?;
    debug!("churned {:?} ({} bytes)", path, read_back.len());
    Ok(read_back.len() as u64)
}

/// 阻塞式GET，返回状态码。非2xx状态码也原样返回
pub fn fetch_status(client: &reqwest::blocking::Client, url: &str) -> Result<u16> {
    let response = client.get(url).send()?;
    Ok(response.status().as_u16())
}

pub async fn fetch_status_async(client: &reqwest::Client, url: &str) -> Result<u16> {
    let response = client.get(url).send().await?;
    Ok(response.status().as_u16())
}
