//! 文件I/O任务：串行、线程池、进程池

use poolbench::file_churn::FileChurnComparator;
use poolbench::process_pool::{self, WorkerProgram};
use poolbench::{run_comparison, FileChurnConfig};

fn main() -> poolbench::Result<()> {
    // 工作进程的日志也走stderr，stdout只留给消息帧
    env_logger::init();
    if process_pool::is_worker_process() {
        return process_pool::serve_stdio();
    }

    let config = FileChurnConfig::from_env()?;
    log::info!(
        "{} files x {} bytes under {:?}",
        config.file_count,
        config.file_size,
        config.work_dir
    );
    let comparator = FileChurnComparator::new(config, WorkerProgram::current_exe()?);
    run_comparison(&comparator)?.log_summary();
    Ok(())
}
