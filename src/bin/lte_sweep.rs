//! 批量运行
//!
//! 并行运行一组相互独立的场景（缺省为十个参考场景），每个场景写出
//! `<prefix>.cmd.txt`（实际使用的配置）和全部报告。单个场景失败不影响其余场景。

use clap::Parser;
use ltesim_rs::scenario::{ScenarioConfig, presets, run_scenario, write_reports};
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;
use std::thread;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "lte-sweep", about = "并行运行多组蜂窝场景")]
struct Args {
    /// 场景列表 JSON（ScenarioConfig 数组）；缺省使用内置的十个参考场景
    #[arg(long)]
    scenarios: Option<PathBuf>,
    /// 输出目录
    #[arg(long, default_value = "output")]
    out_dir: PathBuf,
    /// 并行度；缺省为可用 CPU 数
    #[arg(long)]
    jobs: Option<NonZeroUsize>,
    /// 覆盖每个场景的仿真时长，例如 3s
    #[arg(long)]
    sim_time: Option<ltesim_rs::sim::SimTime>,
}

fn load_scenarios(args: &Args) -> ltesim_rs::Result<Vec<ScenarioConfig>> {
    let mut configs = match &args.scenarios {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => presets(),
    };
    if let Some(t) = args.sim_time {
        for cfg in &mut configs {
            cfg.sim_time = t;
        }
    }
    Ok(configs)
}

fn run_one(out_dir: &Path, cfg: ScenarioConfig) -> ltesim_rs::Result<usize> {
    fs::create_dir_all(out_dir)?;
    let cmd = out_dir.join(format!("{}.cmd.txt", cfg.output_prefix));
    fs::write(&cmd, cfg.to_json()?)?;
    let (scenario, outcome) = run_scenario(cfg)?;
    write_reports(out_dir, &scenario, &outcome)?;
    Ok(outcome.summaries.len())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let args = Args::parse();
    let configs = match load_scenarios(&args) {
        Ok(c) => c,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let jobs = args
        .jobs
        .or_else(|| thread::available_parallelism().ok())
        .map_or(1, NonZeroUsize::get)
        .min(configs.len().max(1));
    info!(scenarios = configs.len(), jobs, out_dir = %args.out_dir.display(), "🚀 开始批量运行");

    // 每个 worker 从共享队列里取下一个场景
    let queue = Mutex::new(configs.into_iter().enumerate());
    let results: Mutex<Vec<(usize, String, Result<usize, String>)>> = Mutex::new(Vec::new());
    thread::scope(|s| {
        for _ in 0..jobs {
            s.spawn(|| {
                loop {
                    let next = match queue.lock() {
                        Ok(mut q) => q.next(),
                        Err(_) => None,
                    };
                    let Some((idx, cfg)) = next else {
                        break;
                    };
                    let prefix = cfg.output_prefix.clone();
                    let res = run_one(&args.out_dir, cfg).map_err(|e| e.to_string());
                    if let Err(err) = &res {
                        error!(%prefix, %err, "❌ 场景失败");
                    }
                    if let Ok(mut r) = results.lock() {
                        r.push((idx, prefix, res));
                    }
                }
            });
        }
    });

    let mut results = results.into_inner().unwrap_or_else(|p| p.into_inner());
    results.sort_by_key(|(idx, _, _)| *idx);
    let mut failed = 0;
    for (_, prefix, res) in &results {
        match res {
            Ok(flows) => println!("{prefix}: ok flows={flows}"),
            Err(err) => {
                failed += 1;
                println!("{prefix}: failed: {err}");
            }
        }
    }
    info!(total = results.len(), failed, "🏁 批量运行结束");
    if failed == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}
