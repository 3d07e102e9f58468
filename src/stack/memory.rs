//! 内存网络栈
//!
//! 记录链路、无线接入、地址与位置，并按链路速率/时延计算逐跳到达时间。
//! 每条单向信道 FIFO 串行发送（`busy_until`），不建模无线信道、调度或协议行为。

use std::collections::HashMap;
use std::net::Ipv4Addr;

use super::path::shortest_path;
use super::NetworkStack;
use crate::error::StackError;
use crate::mobility::{MobilityProvider, Position, RandomWalkBounds};
use crate::net::{DataRate, LinkProfile, NodeId};
use crate::sim::SimTime;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Wired,
    Radio,
}

/// 单向信道
#[derive(Debug, Clone)]
pub struct Channel {
    pub from: NodeId,
    pub to: NodeId,
    pub kind: ChannelKind,
    pub rate: DataRate,
    pub latency: SimTime,
    pub busy_until: SimTime,
}

#[derive(Debug)]
pub struct MemoryStack {
    radio: LinkProfile,
    channels: Vec<Channel>,
    edges: HashMap<(NodeId, NodeId), usize>,
    adj: Vec<Vec<NodeId>>,
    addresses: HashMap<Ipv4Addr, NodeId>,
    attachments: HashMap<NodeId, NodeId>,
    positions: HashMap<NodeId, Position>,
    walks: HashMap<NodeId, RandomWalkBounds>,
    next_pkt_id: u64,
}

impl MemoryStack {
    /// `radio` 为每个终端与其服务基站之间无线跳的速率与时延。
    pub fn new(radio: LinkProfile) -> Self {
        Self {
            radio,
            channels: Vec::new(),
            edges: HashMap::new(),
            adj: Vec::new(),
            addresses: HashMap::new(),
            attachments: HashMap::new(),
            positions: HashMap::new(),
            walks: HashMap::new(),
            next_pkt_id: 0,
        }
    }

    fn ensure_node(&mut self, node: NodeId) {
        if self.adj.len() <= node.0 {
            self.adj.resize_with(node.0 + 1, Vec::new);
        }
    }

    fn connect(&mut self, from: NodeId, to: NodeId, kind: ChannelKind, profile: LinkProfile) {
        self.ensure_node(from);
        self.ensure_node(to);
        let idx = self.channels.len();
        self.channels.push(Channel {
            from,
            to,
            kind,
            rate: profile.rate,
            latency: profile.delay,
            busy_until: SimTime::ZERO,
        });
        self.edges.insert((from, to), idx);
        self.adj[from.0].push(to);
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    /// 地址所属节点
    pub fn node_for(&self, addr: Ipv4Addr) -> Option<NodeId> {
        self.addresses.get(&addr).copied()
    }

    /// 终端的服务基站
    pub fn serving_station(&self, device: NodeId) -> Option<NodeId> {
        self.attachments.get(&device).copied()
    }

    pub fn position(&self, node: NodeId) -> Option<Position> {
        self.positions.get(&node).copied()
    }

    pub fn random_walk(&self, node: NodeId) -> Option<RandomWalkBounds> {
        self.walks.get(&node).copied()
    }

    /// 最短跳数路径
    pub fn route(&self, src: NodeId, dst: NodeId) -> Option<Vec<NodeId>> {
        shortest_path(&self.adj, src, dst)
    }

    pub fn next_packet_id(&mut self) -> u64 {
        let id = self.next_pkt_id;
        self.next_pkt_id = self.next_pkt_id.wrapping_add(1);
        id
    }

    /// 在 `from -> to` 信道上发送 `size_bytes` 字节，返回到达 `to` 的时间。
    ///
    /// 信道忙时排在前一个包之后；不存在该信道时返回 None。
    pub fn transmit(&mut self, from: NodeId, to: NodeId, size_bytes: u32, now: SimTime) -> Option<SimTime> {
        let idx = *self.edges.get(&(from, to))?;
        let ch = &mut self.channels[idx];

        let start = now.max(ch.busy_until);
        let depart = start.saturating_add(ch.rate.tx_time(size_bytes));
        ch.busy_until = depart;
        let arrive = depart.saturating_add(ch.latency);

        trace!(
            from = %from,
            to = %to,
            kind = ?ch.kind,
            start = ?start,
            depart = ?depart,
            arrive = ?arrive,
            "计算传输时间"
        );
        Some(arrive)
    }
}

impl NetworkStack for MemoryStack {
    fn attach_device(&mut self, device: NodeId, station: NodeId) -> Result<(), StackError> {
        if device == station {
            return Err(StackError(format!("{device} cannot attach to itself")));
        }
        if let Some(current) = self.attachments.get(&device) {
            return Err(StackError(format!("{device} is already attached to {current}")));
        }
        self.attachments.insert(device, station);
        self.connect(device, station, ChannelKind::Radio, self.radio);
        self.connect(station, device, ChannelKind::Radio, self.radio);
        debug!(%device, %station, "📶 终端接入");
        Ok(())
    }

    fn install_link(
        &mut self,
        a: NodeId,
        b: NodeId,
        rate: DataRate,
        delay: SimTime,
    ) -> Result<(), StackError> {
        if a == b {
            return Err(StackError(format!("link endpoints must differ, got {a} twice")));
        }
        if rate.bps() == 0 {
            return Err(StackError(format!("link {a} <-> {b} has zero rate")));
        }
        if self.edges.contains_key(&(a, b)) {
            return Err(StackError(format!("link {a} <-> {b} already installed")));
        }
        let profile = LinkProfile { rate, delay };
        self.connect(a, b, ChannelKind::Wired, profile);
        self.connect(b, a, ChannelKind::Wired, profile);
        debug!(%a, %b, %rate, %delay, "🔌 安装有线链路");
        Ok(())
    }

    fn assign_address(&mut self, node: NodeId, address: Ipv4Addr, prefix_len: u8) -> Result<(), StackError> {
        if prefix_len > 32 {
            return Err(StackError(format!("invalid prefix length {prefix_len}")));
        }
        if let Some(owner) = self.addresses.get(&address) {
            return Err(StackError(format!("{address} is already assigned to {owner}")));
        }
        self.ensure_node(node);
        self.addresses.insert(address, node);
        debug!(%node, %address, prefix_len, "配置地址");
        Ok(())
    }
}

impl MobilityProvider for MemoryStack {
    fn set_position(&mut self, node: NodeId, position: Position) -> Result<(), StackError> {
        self.positions.insert(node, position);
        Ok(())
    }

    fn set_random_walk(&mut self, node: NodeId, bounds: &RandomWalkBounds) -> Result<(), StackError> {
        self.walks.insert(node, *bounds);
        Ok(())
    }
}
