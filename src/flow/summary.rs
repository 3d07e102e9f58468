//! 流统计归约
//!
//! 纯函数：只读输入记录，输出每流摘要。分母为零的指标报告为 N/A，
//! 绝不输出 0、NaN 或无穷大。

use super::record::{FiveTuple, FlowRecord};
use crate::error::ScenarioError;
use serde::{Serialize, Serializer};
use std::fmt;
use tracing::warn;

/// 可能不可用的指标
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Metric(Option<f64>);

impl Metric {
    pub const NA: Metric = Metric(None);

    /// 非有限值一律视为不可用
    pub fn value(v: f64) -> Metric {
        if v.is_finite() { Metric(Some(v)) } else { Metric::NA }
    }

    pub fn get(self) -> Option<f64> {
        self.0
    }

    pub fn is_available(self) -> bool {
        self.0.is_some()
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => write!(f, "{v:.3}"),
            None => f.write_str("N/A"),
        }
    }
}

impl Serialize for Metric {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Some(v) => serializer.serialize_f64(v),
            None => serializer.serialize_str("N/A"),
        }
    }
}

/// 单流性能摘要
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowSummary {
    pub flow_id: u64,
    pub tuple: FiveTuple,
    pub tx_packets: u64,
    pub tx_bytes: u64,
    pub rx_packets: u64,
    pub rx_bytes: u64,
    /// `tx - rx`；为负说明计数器不一致
    pub lost_packets: i128,
    pub counter_inconsistent: bool,
    pub packet_loss_percent: Metric,
    pub throughput_kbps: Metric,
    pub mean_delay_ms: Metric,
    pub mean_jitter_ms: Metric,
}

/// 汇总摘要（排除计数器不一致的流）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateSummary {
    pub flows: usize,
    pub inconsistent_flows: usize,
    pub tx_packets: u64,
    pub rx_packets: u64,
    pub lost_packets: u64,
    pub packet_loss_percent: Metric,
    /// 各流可用吞吐之和
    pub throughput_kbps: Metric,
    pub mean_delay_ms: Metric,
    pub mean_jitter_ms: Metric,
}

/// 逐流换算
pub fn summarize(records: &[FlowRecord]) -> Vec<FlowSummary> {
    records.iter().map(summarize_one).collect()
}

fn summarize_one(r: &FlowRecord) -> FlowSummary {
    let lost = i128::from(r.tx_packets) - i128::from(r.rx_packets);
    let inconsistent = lost < 0;
    if inconsistent {
        let err = ScenarioError::CounterInconsistency {
            flow_id: r.flow_id,
            tx_packets: r.tx_packets,
            rx_packets: r.rx_packets,
        };
        warn!(flow_id = r.flow_id, %err, "⚠️  计数器不一致");
    }

    let packet_loss_percent = if r.tx_packets == 0 || inconsistent {
        Metric::NA
    } else {
        Metric::value(lost as f64 / r.tx_packets as f64 * 100.0)
    };

    let span = r
        .last_rx_time
        .checked_sub(r.first_tx_time)
        .filter(|s| s.0 > 0);
    let throughput_kbps = match span {
        Some(span) if r.tx_packets > 0 && r.rx_packets > 0 => {
            Metric::value(r.rx_bytes as f64 * 8.0 / span.as_secs_f64() / 1024.0)
        }
        _ => Metric::NA,
    };

    let mean_delay_ms = if r.rx_packets == 0 {
        Metric::NA
    } else {
        Metric::value(r.delay_sum.as_millis_f64() / r.rx_packets as f64)
    };

    let mean_jitter_ms = if r.rx_packets <= 1 {
        Metric::NA
    } else {
        Metric::value(r.jitter_sum.as_millis_f64() / (r.rx_packets - 1) as f64)
    };

    FlowSummary {
        flow_id: r.flow_id,
        tuple: r.tuple,
        tx_packets: r.tx_packets,
        tx_bytes: r.tx_bytes,
        rx_packets: r.rx_packets,
        rx_bytes: r.rx_bytes,
        lost_packets: lost,
        counter_inconsistent: inconsistent,
        packet_loss_percent,
        throughput_kbps,
        mean_delay_ms,
        mean_jitter_ms,
    }
}

/// 跨流汇总
pub fn aggregate(records: &[FlowRecord]) -> AggregateSummary {
    let summaries = summarize(records);
    let consistent: Vec<(&FlowRecord, &FlowSummary)> = records
        .iter()
        .zip(&summaries)
        .filter(|(_, s)| !s.counter_inconsistent)
        .collect();

    let tx: u64 = consistent.iter().map(|(r, _)| r.tx_packets).sum();
    let rx: u64 = consistent.iter().map(|(r, _)| r.rx_packets).sum();
    let delay_ms: f64 = consistent.iter().map(|(r, _)| r.delay_sum.as_millis_f64()).sum();
    let jitter_ms: f64 = consistent.iter().map(|(r, _)| r.jitter_sum.as_millis_f64()).sum();
    let jitter_samples: u64 = consistent
        .iter()
        .map(|(r, _)| r.rx_packets.saturating_sub(1))
        .sum();
    let throughputs: Vec<f64> = consistent
        .iter()
        .filter_map(|(_, s)| s.throughput_kbps.get())
        .collect();

    AggregateSummary {
        flows: records.len(),
        inconsistent_flows: records.len() - consistent.len(),
        tx_packets: tx,
        rx_packets: rx,
        lost_packets: tx - rx,
        packet_loss_percent: if tx == 0 {
            Metric::NA
        } else {
            Metric::value((tx - rx) as f64 / tx as f64 * 100.0)
        },
        throughput_kbps: if throughputs.is_empty() {
            Metric::NA
        } else {
            Metric::value(throughputs.iter().sum())
        },
        mean_delay_ms: if rx == 0 {
            Metric::NA
        } else {
            Metric::value(delay_ms / rx as f64)
        },
        mean_jitter_ms: if jitter_samples == 0 {
            Metric::NA
        } else {
            Metric::value(jitter_ms / jitter_samples as f64)
        },
    }
}
