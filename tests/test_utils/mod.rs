#![allow(dead_code)]

use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::path::Path;
use std::thread;

use poolbench::WorkerProgram;

/// 测试专用的工作进程程序
pub fn worker_program() -> WorkerProgram {
    WorkerProgram::new(env!("CARGO_BIN_EXE_poolbench-worker")).expect("worker binary is built for tests")
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// `dir` 下以 `prefix` 开头的残留文件
pub fn leftover_files(dir: &Path, prefix: &str) -> Vec<String> {
    std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with(prefix))
        .collect()
}

/// 本地HTTP应答器：路径最后一段是偶数返回200，奇数返回404
pub struct TestServer {
    addr: SocketAddr,
}

impl TestServer {
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            for stream in listener.incoming() {
                match stream {
                    Ok(stream) => {
                        thread::spawn(move || handle(stream));
                    }
                    Err(_) => break,
                }
            }
        });
        Self { addr }
    }

    /// 请求地址前缀，任务序号直接拼在后面
    pub fn base_url(&self) -> String {
        format!("http://{}/todos/", self.addr)
    }
}

fn handle(mut stream: TcpStream) {
    let mut reader = BufReader::new(stream.try_clone().unwrap());
    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }
    loop {
        let mut header = String::new();
        match reader.read_line(&mut header) {
            Ok(0) => break,
            Ok(_) if header == "\r\n" || header == "\n" => break,
            Ok(_) => continue,
            Err(_) => return,
        }
    }

    let path = request_line.split_whitespace().nth(1).unwrap_or("/");
    let index: u64 = path.rsplit('/').next().and_then(|s| s.parse().ok()).unwrap_or(0);
    let (status, body) = if index % 2 == 0 {
        ("200 OK", "{}")
    } else {
        ("404 Not Found", "")
    };
    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

/// 与 `TestServer` 对应的期望状态码
pub fn expected_statuses(count: usize) -> Vec<u16> {
    (0..count).map(|i| if i % 2 == 0 { 200 } else { 404 }).collect()
}
