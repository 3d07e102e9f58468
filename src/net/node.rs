//! 节点类型
//!
//! 显式按角色标注的节点表项：下游组件通过角色查询节点，而不是依赖创建顺序。

use super::id::NodeId;
use crate::mobility::MobilityPolicy;
use serde::Serialize;
use std::fmt;
use std::net::Ipv4Addr;

/// 节点角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    RemoteHost,
    Gateway,
    SupportNode,
    BaseStation,
    Device,
}

impl NodeRole {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeRole::RemoteHost => "remote_host",
            NodeRole::Gateway => "gateway",
            NodeRole::SupportNode => "support_node",
            NodeRole::BaseStation => "base_station",
            NodeRole::Device => "device",
        }
    }

    /// 基础设施节点使用静态网格位置，终端使用随机游走。
    pub fn is_infrastructure(self) -> bool {
        !matches!(self, NodeRole::Device)
    }
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 节点上的一个已编址接口
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Interface {
    pub segment: String,
    pub address: Ipv4Addr,
    pub prefix_len: u8,
}

/// 节点表项
#[derive(Debug, Clone, Serialize)]
pub struct Node {
    pub id: NodeId,
    pub role: NodeRole,
    pub name: String,
    pub interfaces: Vec<Interface>,
    pub mobility: Option<MobilityPolicy>,
}

impl Node {
    pub(crate) fn new(id: NodeId, role: NodeRole, name: impl Into<String>) -> Self {
        Self {
            id,
            role,
            name: name.into(),
            interfaces: Vec::new(),
            mobility: None,
        }
    }

    /// 节点在指定网段上的第一个地址
    pub fn address_in(&self, segment: &str) -> Option<Ipv4Addr> {
        self.interfaces
            .iter()
            .find(|i| i.segment == segment)
            .map(|i| i.address)
    }
}
