use super::plan::{Transport, Window};
use crate::net::{DataRate, NodeId};
use serde::Serialize;
use std::net::SocketAddrV4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AppRole {
    Source,
    Sink,
}

/// 安装在某个节点上的应用
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Application {
    pub id: usize,
    /// 所属业务类名称
    pub class: String,
    pub role: AppRole,
    pub node: NodeId,
    pub transport: Transport,
    /// Sink：绑定的地址与端口；Source：本地地址与临时端口
    pub local: SocketAddrV4,
    /// Source 的目的地址与端口
    pub peer: Option<SocketAddrV4>,
    /// Source 的发送速率
    pub rate: Option<DataRate>,
    pub window: Window,
    /// Source 对应的 Sink 应用 id（无 Sink 时为 None）
    pub sink: Option<usize>,
}

impl Application {
    pub fn is_source(&self) -> bool {
        self.role == AppRole::Source
    }

    pub fn is_sink(&self) -> bool {
        self.role == AppRole::Sink
    }
}
