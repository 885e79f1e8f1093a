//! 计时框架
//!
//! 每种策略只跑一次，打印提示行和耗时行，策略之间用分隔线隔开。

use std::io::{self, Write};
use std::time::{Duration, Instant};

use log::{debug, info};

use crate::strategy::Strategy;
use crate::Result;

/// 分隔线宽度
pub const DIVIDER_WIDTH: usize = 100;

/// 一个可比较的基准程序
pub trait Comparator {
    /// 工作负载的描述，用于提示行
    fn workload(&self) -> &str;

    /// 按执行顺序排列的策略，第一个作为基线
    fn strategies(&self) -> Vec<Strategy>;

    /// 用指定策略跑完全部任务，返回完成的任务数
    fn run(&self, strategy: Strategy) -> Result<usize>;

    /// 计时行使用的名称，默认取策略自己的名称
    fn label(&self, strategy: Strategy) -> &'static str {
        strategy.label()
    }
}

/// 单个策略的计时结果
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub strategy: Strategy,
    pub completed: usize,
    pub elapsed: Duration,
}

/// 一次完整比较的结果
#[derive(Debug, Clone, Default)]
pub struct Report {
    measurements: Vec<Measurement>,
}

impl Report {
    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    /// 相对第一个(基线)策略的加速比
    pub fn speedups(&self) -> Vec<(Strategy, f64)> {
        let Some(baseline) = self.measurements.first() else {
            return Vec::new();
        };
        let base = baseline.elapsed.as_secs_f64();
        self.measurements
            .iter()
            .map(|m| {
                let secs = m.elapsed.as_secs_f64();
                let ratio = if secs > 0.0 { base / secs } else { f64::INFINITY };
                (m.strategy, ratio)
            })
            .collect()
    }

    /// 将加速比写入日志
    pub fn log_summary(&self) {
        for (strategy, ratio) in self.speedups() {
            info!("{:<28} {:>6.2}x vs baseline", strategy.to_string(), ratio);
        }
    }
}

/// 计时执行一个闭包
pub fn timed<T, F>(f: F) -> Result<(T, Duration)>
where
    F: FnOnce() -> Result<T>,
{
    let start = Instant::now();
    let value = f()?;
    Ok((value, start.elapsed()))
}

/// 在标准输出上运行比较
pub fn run_comparison<C: Comparator + ?Sized>(comparator: &C) -> Result<Report> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_comparison_to(comparator, &mut out)
}

/// 运行比较，输出写入 `out`
pub fn run_comparison_to<C, W>(comparator: &C, out: &mut W) -> Result<Report>
where
    C: Comparator + ?Sized,
    W: Write,
{
    debug!(
        "Comparing {} on {} logical CPUs",
        comparator.workload(),
        num_cpus::get()
    );

    let mut report = Report::default();
    for (i, strategy) in comparator.strategies().into_iter().enumerate() {
        if i > 0 {
            writeln!(out, "{}", "-".repeat(DIVIDER_WIDTH))?;
        }
        writeln!(out, "{}", strategy.banner(comparator.workload()))?;
        out.flush()?;

        let (completed, elapsed) = timed(|| comparator.run(strategy))?;
        writeln!(
            out,
            "{} time: {:.4} sec",
            comparator.label(strategy),
            elapsed.as_secs_f64()
        )?;
        debug!("{} finished {} tasks in {:?}", strategy, completed, elapsed);

        report.measurements.push(Measurement {
            strategy,
            completed,
            elapsed,
        });
    }
    Ok(report)
}
