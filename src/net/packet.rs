//! 数据包类型
//!
//! 运行阶段在内存网络栈中逐跳转发的数据包。

use super::id::NodeId;
use crate::flow::FiveTuple;
use crate::sim::SimTime;

/// 网络数据包
#[derive(Debug, Clone)]
pub struct Packet {
    pub id: u64,
    pub flow_id: u64,
    pub tuple: FiveTuple,
    pub size_bytes: u32,
    /// 源端发出时间，用于计算端到端时延
    pub sent_at: SimTime,
    pub route: Vec<NodeId>,
    pub hop: usize, // 当前所在节点在 route 中的索引
}

impl Packet {
    /// 获取当前所在节点
    pub fn at(&self) -> Option<NodeId> {
        self.route.get(self.hop).copied()
    }

    /// 获取下一跳节点（如果有）
    pub fn next(&self) -> Option<NodeId> {
        self.route.get(self.hop + 1).copied()
    }

    /// 前进到下一跳
    pub fn advance(mut self) -> Self {
        self.hop += 1;
        self
    }
}
