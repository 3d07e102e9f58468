use std::collections::HashMap;

use super::record::{FiveTuple, FlowRecord};
use crate::sim::SimTime;
use tracing::trace;

/// 逐包事件 -> 每流计数器
///
/// 流 id 按首次发送的顺序从 1 开始编号。
#[derive(Debug, Default)]
pub struct FlowMonitor {
    ids: HashMap<FiveTuple, u64>,
    records: Vec<FlowRecord>,
    last_delay: Vec<Option<SimTime>>,
    dropped: u64,
}

impl FlowMonitor {
    /// 记录一次发送，返回流 id
    pub fn on_tx(&mut self, tuple: FiveTuple, size_bytes: u32, now: SimTime) -> u64 {
        let flow_id = match self.ids.get(&tuple) {
            Some(&id) => id,
            None => {
                let id = self.records.len() as u64 + 1;
                self.ids.insert(tuple, id);
                let mut record = FlowRecord::new(id, tuple);
                record.first_tx_time = now;
                self.records.push(record);
                self.last_delay.push(None);
                id
            }
        };
        let record = &mut self.records[(flow_id - 1) as usize];
        record.tx_packets += 1;
        record.tx_bytes += u64::from(size_bytes);
        flow_id
    }

    /// 记录一次接收；`sent_at` 为该包的发送时间
    pub fn on_rx(&mut self, flow_id: u64, size_bytes: u32, sent_at: SimTime, now: SimTime) {
        let Some(idx) = (flow_id as usize).checked_sub(1) else {
            return;
        };
        let Some(record) = self.records.get_mut(idx) else {
            return;
        };
        let delay = now.checked_sub(sent_at).unwrap_or(SimTime::ZERO);
        record.rx_packets += 1;
        record.rx_bytes += u64::from(size_bytes);
        record.last_rx_time = now;
        record.delay_sum = record.delay_sum.saturating_add(delay);
        if let Some(prev) = self.last_delay[idx] {
            record.jitter_sum = record.jitter_sum.saturating_add(delay.abs_diff(prev));
        }
        self.last_delay[idx] = Some(delay);
        trace!(flow_id, delay = ?delay, "流接收");
    }

    /// 记录一次在接收端被丢弃的包（没有活跃的 Sink）
    pub fn on_drop(&mut self, flow_id: u64) {
        self.dropped += 1;
        trace!(flow_id, "接收端丢包");
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn records(&self) -> &[FlowRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<FlowRecord> {
        self.records
    }
}
