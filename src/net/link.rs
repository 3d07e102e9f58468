//! 链路类型
//!
//! 有线链路（核心网到远端主机的 backbone、基站到网关的 backhaul）。
//! 无线接入不建链路，只以 Attachment 记录表示。

use super::id::{LinkId, NodeId};
use super::rate::DataRate;
use crate::sim::SimTime;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

/// 有线链路种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    WiredBackbone,
    Backhaul,
}

impl LinkKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LinkKind::WiredBackbone => "wired_backbone",
            LinkKind::Backhaul => "backhaul",
        }
    }
}

/// 链路速率与单向传播时延
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkProfile {
    pub rate: DataRate,
    pub delay: SimTime,
}

/// 双向有线链路；两端地址取自同一地址块（`segment`）。
#[derive(Debug, Clone, Serialize)]
pub struct Link {
    pub id: LinkId,
    pub kind: LinkKind,
    pub a: NodeId,
    pub b: NodeId,
    pub a_addr: Ipv4Addr,
    pub b_addr: Ipv4Addr,
    pub segment: String,
    pub profile: LinkProfile,
}

impl Link {
    /// 返回链路在 `node` 一侧的地址
    pub fn address_of(&self, node: NodeId) -> Option<Ipv4Addr> {
        if node == self.a {
            Some(self.a_addr)
        } else if node == self.b {
            Some(self.b_addr)
        } else {
            None
        }
    }

    pub fn connects(&self, x: NodeId, y: NodeId) -> bool {
        (self.a == x && self.b == y) || (self.a == y && self.b == x)
    }
}
