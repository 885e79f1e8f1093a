//! CPU密集型任务放进事件循环：不会比串行更快

use poolbench::cpu_bound::CpuBoundComparator;
use poolbench::process_pool::{self, WorkerProgram};
use poolbench::{run_comparison, CpuBoundConfig};

fn main() -> poolbench::Result<()> {
    // 工作进程的日志也走stderr，stdout只留给消息帧
    env_logger::init();
    if process_pool::is_worker_process() {
        return process_pool::serve_stdio();
    }

    let config = CpuBoundConfig::from_env()?;
    let comparator = CpuBoundComparator::cooperative(config, WorkerProgram::current_exe()?);
    let report = run_comparison(&comparator)?;
    report.log_summary();
    Ok(())
}
