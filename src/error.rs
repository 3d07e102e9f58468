//! 错误类型
//!
//! 场景构建与统计归约共用的错误枚举。构建期错误全部是致命的：
//! 场景要么完整建立，要么整体失败，不做重试。

use crate::net::NodeId;
use std::net::Ipv4Addr;
use thiserror::Error;

/// 外部网络栈返回的失败原因。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct StackError(pub String);

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("invalid topology parameters: {0}")]
    InvalidTopologyParameters(String),

    #[error("topology has already been built")]
    AlreadyBuilt,

    #[error("address space of segment `{segment}` ({base}/{prefix_len}) is exhausted")]
    AddressSpaceExhausted {
        segment: String,
        base: Ipv4Addr,
        prefix_len: u8,
    },

    #[error("segment `{segment}` ({base}/{prefix_len}) overlaps segment `{other}`")]
    OverlappingAddressBlock {
        segment: String,
        base: Ipv4Addr,
        prefix_len: u8,
        other: String,
    },

    #[error("segment `{0}` is already allocated")]
    DuplicateSegment(String),

    #[error("segment `{0}` has not been allocated")]
    UnknownSegment(String),

    #[error("invalid mobility bounds: {0}")]
    InvalidMobilityBounds(String),

    #[error("no base stations available for attachment")]
    NoBaseStationsAvailable,

    #[error("invalid scheduling window for `{class}`: {reason}")]
    InvalidSchedulingWindow { class: String, reason: String },

    #[error("traffic class `{class}` references device {index}, but only {count} devices exist")]
    UnknownDevice {
        class: String,
        index: usize,
        count: usize,
    },

    #[error("network stack failed during {op}: {source}")]
    StackInstallationFailed {
        op: &'static str,
        #[source]
        source: StackError,
    },

    #[error(
        "flow {flow_id}: received {rx_packets} packets but only {tx_packets} were sent"
    )]
    CounterInconsistency {
        flow_id: u64,
        tx_packets: u64,
        rx_packets: u64,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("node {0:?} does not exist")]
    UnknownNode(NodeId),

    #[error("invalid time `{0}`")]
    InvalidTime(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ScenarioError>;

impl ScenarioError {
    pub(crate) fn stack(op: &'static str) -> impl FnOnce(StackError) -> ScenarioError {
        move |source| ScenarioError::StackInstallationFailed { op, source }
    }
}
