//! 进程池的工作进程：从stdin读取任务批次，结果写回stdout

fn main() -> poolbench::Result<()> {
    env_logger::init();
    poolbench::process_pool::serve_stdio()
}
