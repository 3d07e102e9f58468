//! 网络栈接口
//!
//! 场景构建只通过 [`NetworkStack`] 请求“接入终端”“安装链路”“配置地址”，
//! 并信任其结果；任何失败在上层都映射为致命的 `StackInstallationFailed`。
//! [`MemoryStack`] 是一个内存实现：固定时延的逐跳转发，供运行阶段使用。

mod memory;
mod path;

pub use memory::{Channel, ChannelKind, MemoryStack};
pub use path::shortest_path;

use crate::error::StackError;
use crate::net::{DataRate, NodeId};
use crate::sim::SimTime;
use std::net::Ipv4Addr;

/// 外部网络栈
pub trait NetworkStack {
    /// 把终端接入基站（建立无线关联）
    fn attach_device(&mut self, device: NodeId, station: NodeId) -> Result<(), StackError>;

    /// 在两个节点之间安装双向有线链路
    fn install_link(
        &mut self,
        a: NodeId,
        b: NodeId,
        rate: DataRate,
        delay: SimTime,
    ) -> Result<(), StackError>;

    /// 为节点配置一个接口地址
    fn assign_address(&mut self, node: NodeId, address: Ipv4Addr, prefix_len: u8) -> Result<(), StackError>;
}
