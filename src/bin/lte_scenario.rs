//! 单场景运行
//!
//! 构建拓扑、接入与业务计划，运行到仿真时长，写出地址报告和每流统计。

use clap::Parser;
use ltesim_rs::net::DataRate;
use ltesim_rs::scenario::{
    FILE_TRANSFER_CLASS, ScenarioConfig, VIDEO_CLASS, default_traffic,
    run_scenario, write_reports,
};
use ltesim_rs::sim::SimTime;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::warn;

#[derive(Debug, Parser)]
#[command(name = "lte-scenario", about = "蜂窝场景：构建拓扑、调度业务并统计每流性能")]
struct Args {
    /// 场景配置 JSON；给出时以它为基础，其余参数作为覆盖
    #[arg(long)]
    config: Option<PathBuf>,
    /// backbone 链路速率，例如 10Gbps
    #[arg(long)]
    backbone_speed: Option<DataRate>,
    /// backbone 单向时延，例如 5ms
    #[arg(long)]
    backbone_delay: Option<SimTime>,
    /// 终端互传文件的速率
    #[arg(long)]
    ues_data_rate: Option<DataRate>,
    /// 视频推流速率
    #[arg(long)]
    video_data_rate: Option<DataRate>,
    /// 仿真时长，例如 10s
    #[arg(long)]
    sim_time: Option<SimTime>,
    #[arg(long)]
    num_devices: Option<usize>,
    #[arg(long)]
    num_base_stations: Option<usize>,
    /// 报告文件名前缀
    #[arg(long)]
    output_prefix: Option<String>,
    /// 报告输出目录
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
    /// 在标准输出打印 JSON 汇总
    #[arg(long)]
    json: bool,
}

fn build_config(args: &Args) -> ltesim_rs::Result<ScenarioConfig> {
    let mut cfg = match &args.config {
        Some(path) => ScenarioConfig::from_json_file(path)?,
        None => ScenarioConfig::default(),
    };

    if let Some(rate) = args.backbone_speed {
        cfg.backbone.rate = rate;
    }
    if let Some(delay) = args.backbone_delay {
        cfg.backbone.delay = delay;
    }
    if let Some(n) = args.num_base_stations {
        cfg.num_base_stations = n;
    }
    if let Some(n) = args.num_devices {
        cfg.num_devices = n;
        // 终端数变化后按缺省规则重新划分业务
        if args.config.is_none() {
            let device_rate = cfg.class_rate(FILE_TRANSFER_CLASS).unwrap_or(DataRate::from_mbps(5));
            let video_rate = cfg.class_rate(VIDEO_CLASS).unwrap_or(DataRate::from_mbps(10));
            cfg.traffic = default_traffic(n, device_rate, video_rate);
        }
    }
    let overrides = [
        (FILE_TRANSFER_CLASS, "--ues-data-rate", args.ues_data_rate),
        (VIDEO_CLASS, "--video-data-rate", args.video_data_rate),
    ];
    for (class, flag, rate) in overrides {
        let Some(rate) = rate else {
            continue;
        };
        if !cfg.set_class_rate(class, rate) {
            warn!(class, flag, "⚠️  场景中没有该业务类，忽略速率参数");
        }
    }
    if let Some(t) = args.sim_time {
        cfg.sim_time = t;
    }
    if let Some(prefix) = &args.output_prefix {
        cfg.output_prefix = prefix.clone();
    }
    Ok(cfg)
}

fn main() -> ExitCode {
    // 初始化 tracing
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

    let result = build_config(&args).and_then(|cfg| {
        let (scenario, outcome) = run_scenario(cfg)?;
        let written = write_reports(&args.out_dir, &scenario, &outcome)?;
        Ok((scenario, outcome, written))
    });

    let (scenario, outcome, written) = match result {
        Ok(v) => v,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    if args.json {
        let summary = serde_json::json!({
            "prefix": scenario.config.output_prefix,
            "flows": outcome.summaries,
            "aggregate": outcome.aggregate,
            "files": written,
        });
        println!("{summary}");
    } else {
        for s in &outcome.summaries {
            println!(
                "flow {} {} tx={} rx={} loss={} throughput_kbps={} delay_ms={} jitter_ms={}",
                s.flow_id,
                s.tuple,
                s.tx_packets,
                s.rx_packets,
                s.packet_loss_percent,
                s.throughput_kbps,
                s.mean_delay_ms,
                s.mean_jitter_ms
            );
        }
        println!(
            "done @ {}, flows={}, throughput_kbps={}, reports={}",
            outcome.finished_at,
            outcome.summaries.len(),
            outcome.aggregate.throughput_kbps,
            written.len()
        );
    }
    ExitCode::SUCCESS
}
