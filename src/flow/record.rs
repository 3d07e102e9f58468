use crate::sim::SimTime;
use crate::traffic::Transport;
use serde::Serialize;
use std::fmt;
use std::net::Ipv4Addr;

/// 流的五元组
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FiveTuple {
    pub src: Ipv4Addr,
    pub src_port: u16,
    pub dst: Ipv4Addr,
    pub dst_port: u16,
    pub transport: Transport,
}

impl fmt::Display for FiveTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}:{} -> {}:{}",
            self.transport, self.src, self.src_port, self.dst, self.dst_port
        )
    }
}

/// 单条流的原始计数器
///
/// 时延和抖动累加值以纳秒保存；`first_tx_time`/`last_rx_time` 在没有
/// 发送/接收时为零，需要结合对应计数器判断是否有效。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowRecord {
    pub flow_id: u64,
    pub tuple: FiveTuple,
    pub tx_packets: u64,
    pub tx_bytes: u64,
    pub rx_packets: u64,
    pub rx_bytes: u64,
    pub first_tx_time: SimTime,
    pub last_rx_time: SimTime,
    pub delay_sum: SimTime,
    pub jitter_sum: SimTime,
}

impl FlowRecord {
    pub fn new(flow_id: u64, tuple: FiveTuple) -> Self {
        Self {
            flow_id,
            tuple,
            tx_packets: 0,
            tx_bytes: 0,
            rx_packets: 0,
            rx_bytes: 0,
            first_tx_time: SimTime::ZERO,
            last_rx_time: SimTime::ZERO,
            delay_sum: SimTime::ZERO,
            jitter_sum: SimTime::ZERO,
        }
    }
}
