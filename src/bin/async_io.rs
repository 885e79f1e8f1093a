//! 文件I/O + HTTP：串行、线程池、事件循环

use poolbench::mixed_io::MixedIoComparator;
use poolbench::{run_comparison, MixedIoConfig};

fn main() -> poolbench::Result<()> {
    env_logger::init();

    let config = MixedIoConfig::from_env()?;
    log::info!("requesting {}<index> for {} tasks", config.api_url, config.file_count);
    let comparator = MixedIoComparator::new(config);
    run_comparison(&comparator)?.log_summary();
    Ok(())
}
