//! 流统计报告
//!
//! 每流一个文本文件、一个合并文本文件和一个 JSON 文件，文件名以输出前缀开头。

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use super::summary::{AggregateSummary, FlowSummary};
use crate::error::Result;
use serde::Serialize;
use tracing::info;

pub(crate) fn render_flow(s: &FlowSummary) -> String {
    let mut out = String::new();
    // 写入 String 不会失败
    let _ = writeln!(out, "Flow {} ({})", s.flow_id, s.tuple);
    let _ = writeln!(out, "  Tx Packets:   {}", s.tx_packets);
    let _ = writeln!(out, "  Tx Bytes:     {}", s.tx_bytes);
    let _ = writeln!(out, "  Rx Packets:   {}", s.rx_packets);
    let _ = writeln!(out, "  Rx Bytes:     {}", s.rx_bytes);
    let _ = writeln!(out, "  Lost Packets: {}", s.lost_packets);
    let _ = writeln!(out, "  Packet Loss:  {}{}", s.packet_loss_percent, unit(s.packet_loss_percent.is_available(), " %"));
    let _ = writeln!(out, "  Throughput:   {}{}", s.throughput_kbps, unit(s.throughput_kbps.is_available(), " Kbps"));
    let _ = writeln!(out, "  Mean Delay:   {}{}", s.mean_delay_ms, unit(s.mean_delay_ms.is_available(), " ms"));
    let _ = writeln!(out, "  Mean Jitter:  {}{}", s.mean_jitter_ms, unit(s.mean_jitter_ms.is_available(), " ms"));
    if s.counter_inconsistent {
        let _ = writeln!(out, "  WARNING: counter inconsistency (rx > tx), excluded from aggregate");
    }
    out
}

fn render_aggregate(a: &AggregateSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Aggregate ({} flows, {} inconsistent)", a.flows, a.inconsistent_flows);
    let _ = writeln!(out, "  Tx Packets:   {}", a.tx_packets);
    let _ = writeln!(out, "  Rx Packets:   {}", a.rx_packets);
    let _ = writeln!(out, "  Lost Packets: {}", a.lost_packets);
    let _ = writeln!(out, "  Packet Loss:  {}{}", a.packet_loss_percent, unit(a.packet_loss_percent.is_available(), " %"));
    let _ = writeln!(out, "  Throughput:   {}{}", a.throughput_kbps, unit(a.throughput_kbps.is_available(), " Kbps"));
    let _ = writeln!(out, "  Mean Delay:   {}{}", a.mean_delay_ms, unit(a.mean_delay_ms.is_available(), " ms"));
    let _ = writeln!(out, "  Mean Jitter:  {}{}", a.mean_jitter_ms, unit(a.mean_jitter_ms.is_available(), " ms"));
    out
}

fn unit(available: bool, unit: &'static str) -> &'static str {
    if available { unit } else { "" }
}

/// 每流一个文件：`<prefix>-flow-<id>.txt`
pub fn write_flow_reports(dir: &Path, prefix: &str, summaries: &[FlowSummary]) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let mut paths = Vec::with_capacity(summaries.len());
    for s in summaries {
        let path = dir.join(format!("{prefix}-flow-{}.txt", s.flow_id));
        fs::write(&path, render_flow(s))?;
        paths.push(path);
    }
    info!(dir = %dir.display(), files = paths.len(), "📝 写出每流报告");
    Ok(paths)
}

/// 合并文本报告：`<prefix>-flows.txt`
pub fn write_combined_report(
    dir: &Path,
    prefix: &str,
    summaries: &[FlowSummary],
    aggregate: &AggregateSummary,
) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let mut out = String::new();
    for s in summaries {
        out.push_str(&render_flow(s));
        out.push('\n');
    }
    out.push_str(&render_aggregate(aggregate));
    let path = dir.join(format!("{prefix}-flows.txt"));
    fs::write(&path, out)?;
    Ok(path)
}

#[derive(Serialize)]
struct JsonReport<'a> {
    prefix: &'a str,
    flows: &'a [FlowSummary],
    aggregate: &'a AggregateSummary,
}

/// JSON 报告：`<prefix>-flows.json`
pub fn write_json_report(
    dir: &Path,
    prefix: &str,
    summaries: &[FlowSummary],
    aggregate: &AggregateSummary,
) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let report = JsonReport {
        prefix,
        flows: summaries,
        aggregate,
    };
    let path = dir.join(format!("{prefix}-flows.json"));
    fs::write(&path, serde_json::to_string_pretty(&report)?)?;
    Ok(path)
}
