use crate::net::DataRate;
use crate::sim::SimTime;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transport {
    Tcp,
    Udp,
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Transport::Tcp => "TCP",
            Transport::Udp => "UDP",
        })
    }
}

/// 非对称业务的方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// 远端主机 -> 终端
    #[default]
    Downlink,
    /// 终端 -> 远端主机
    Uplink,
}

/// 业务类的流量模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassKind {
    /// 终端两两配对互发：第 i 个终端与第 N-1-i 个终端
    Symmetric,
    /// 远端主机与每个目标终端之间单向发送
    Asymmetric {
        #[serde(default)]
        direction: Direction,
    },
}

/// 半开时间窗 `[start, stop)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub start: SimTime,
    pub stop: SimTime,
}

impl Window {
    pub fn new(start: SimTime, stop: SimTime) -> Self {
        Self { start, stop }
    }

    pub fn contains(&self, t: SimTime) -> bool {
        self.start <= t && t < self.stop
    }
}

/// 一个业务类
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficClass {
    pub name: String,
    #[serde(flatten)]
    pub kind: ClassKind,
    /// 参与的终端下标（按终端创建顺序）
    pub devices: Vec<usize>,
    pub transport: Transport,
    /// 每个 Source 的恒定比特率
    pub rate: DataRate,
    /// Source 的活跃时间窗
    pub window: Window,
    /// 为 false 时只生成 Source（例如只上行推流、对端没有显式接收端）
    #[serde(default = "default_sinks")]
    pub sinks: bool,
    /// 显式的 Sink 时间窗；缺省时在 Source 时间窗两端各留出 guard
    #[serde(default)]
    pub sink_window: Option<Window>,
    /// 非对称业务使用的远端主机下标
    #[serde(default)]
    pub remote_host: usize,
}

fn default_sinks() -> bool {
    true
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrafficPlan {
    pub classes: Vec<TrafficClass>,
}
