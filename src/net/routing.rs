//! 静态路由表
//!
//! 终端的默认路由指向网关在 device 网段上的地址；远端主机对 device 网段
//! 有一条经网关 backbone 地址的静态路由。表项以有序集合存储，
//! 重复安装同样的表项不会产生重复。

use std::collections::BTreeSet;
use std::net::Ipv4Addr;

use super::addr::Ipv4Prefix;
use super::id::NodeId;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteKind {
    Default,
    Static,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RouteEntry {
    pub node: NodeId,
    pub destination: Ipv4Prefix,
    pub next_hop: Ipv4Addr,
    pub kind: RouteKind,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RoutingTable {
    entries: BTreeSet<RouteEntry>,
}

impl RoutingTable {
    /// 安装默认路由；返回是否为新表项
    pub fn add_default(&mut self, node: NodeId, next_hop: Ipv4Addr) -> bool {
        self.entries.insert(RouteEntry {
            node,
            destination: Ipv4Prefix::DEFAULT,
            next_hop,
            kind: RouteKind::Default,
        })
    }

    /// 安装静态路由；返回是否为新表项
    pub fn add_static(&mut self, node: NodeId, destination: Ipv4Prefix, next_hop: Ipv4Addr) -> bool {
        self.entries.insert(RouteEntry {
            node,
            destination,
            next_hop,
            kind: RouteKind::Static,
        })
    }

    pub fn entries(&self) -> impl Iterator<Item = &RouteEntry> {
        self.entries.iter()
    }

    pub fn entries_for(&self, node: NodeId) -> impl Iterator<Item = &RouteEntry> {
        self.entries.iter().filter(move |e| e.node == node)
    }

    /// 节点的默认网关
    pub fn default_gateway(&self, node: NodeId) -> Option<Ipv4Addr> {
        self.entries_for(node)
            .find(|e| e.kind == RouteKind::Default)
            .map(|e| e.next_hop)
    }

    /// 最长前缀匹配，返回下一跳
    pub fn lookup(&self, node: NodeId, dst: Ipv4Addr) -> Option<Ipv4Addr> {
        self.entries_for(node)
            .filter(|e| e.destination.contains(dst))
            .max_by_key(|e| e.destination.len)
            .map(|e| e.next_hop)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
