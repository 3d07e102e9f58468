//! 场景配置
//!
//! 一个场景就是一份配置值：不同的参数组合不需要各写一份脚本。
//! JSON 中速率写作 `"10Gbps"`，时间写作 `"5ms"`，缺省字段取参考场景的值。

use crate::error::{Result, ScenarioError};
use crate::mobility::{GridLayout, RandomWalkBounds};
use crate::net::{DataRate, LinkProfile};
use crate::sim::SimTime;
use crate::traffic::{ClassKind, Direction, TrafficClass, TrafficPlan, Transport, Window};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::Ipv4Addr;
use std::path::Path;

pub const FILE_TRANSFER_CLASS: &str = "file-transfer";
pub const VIDEO_CLASS: &str = "video";

/// 一个网段的地址块
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentSpec {
    pub base: Ipv4Addr,
    pub prefix_len: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressPlan {
    pub backbone: SegmentSpec,
    pub backhaul: SegmentSpec,
    pub device: SegmentSpec,
}

impl Default for AddressPlan {
    fn default() -> Self {
        Self {
            backbone: SegmentSpec {
                base: Ipv4Addr::new(1, 0, 0, 0),
                prefix_len: 8,
            },
            backhaul: SegmentSpec {
                base: Ipv4Addr::new(10, 0, 0, 0),
                prefix_len: 8,
            },
            device: SegmentSpec {
                base: Ipv4Addr::new(7, 0, 0, 0),
                prefix_len: 8,
            },
        }
    }
}

/// 各类节点的放置/移动参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MobilitySettings {
    /// 远端主机、网关与支撑节点
    pub core_grid: GridLayout,
    pub station_grid: GridLayout,
    pub device_walk: RandomWalkBounds,
}

impl Default for MobilitySettings {
    fn default() -> Self {
        Self {
            core_grid: GridLayout {
                origin_x: -100.0,
                origin_y: 0.0,
                spacing_x: 20.0,
                spacing_y: 20.0,
                columns: 4,
            },
            station_grid: GridLayout {
                origin_x: 50.0,
                origin_y: 50.0,
                spacing_x: 100.0,
                spacing_y: 100.0,
                columns: 2,
            },
            device_walk: RandomWalkBounds {
                width: 200.0,
                height: 200.0,
                speed: 3.0,
                turn_distance: 10.0,
            },
        }
    }
}

/// 参考场景的可变参数（即批量运行时每个场景不同的那几项）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceParams {
    pub backbone_rate: DataRate,
    pub backbone_delay: SimTime,
    pub device_rate: DataRate,
    pub video_rate: DataRate,
    pub output_prefix: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// 报告文件名前缀
    pub output_prefix: String,
    /// 仿真时长；到达后运行无条件结束
    pub sim_time: SimTime,
    pub num_base_stations: usize,
    pub num_devices: usize,
    pub num_remote_hosts: usize,
    pub backbone: LinkProfile,
    pub backhaul: LinkProfile,
    /// 终端与基站之间的无线跳
    pub radio: LinkProfile,
    /// 应用层包大小（字节）
    pub packet_size: u32,
    pub port_base: u16,
    pub sink_guard: SimTime,
    pub addressing: AddressPlan,
    pub mobility: MobilitySettings,
    pub traffic: TrafficPlan,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        ScenarioConfig::reference(&ReferenceParams {
            backbone_rate: DataRate(10_000_000_000),
            backbone_delay: SimTime::from_millis(5),
            device_rate: DataRate::from_mbps(5),
            video_rate: DataRate::from_mbps(10),
            output_prefix: "sim-0".to_string(),
        })
    }
}

impl ScenarioConfig {
    /// 参考场景：2 个基站、5 个终端、1 个远端主机，
    /// 终端 0、1 之间互传文件，远端主机向终端 2、3、4 推送视频。
    pub fn reference(p: &ReferenceParams) -> Self {
        let num_devices = 5;
        Self {
            output_prefix: p.output_prefix.clone(),
            sim_time: SimTime::from_secs(10),
            num_base_stations: 2,
            num_devices,
            num_remote_hosts: 1,
            backbone: LinkProfile {
                rate: p.backbone_rate,
                delay: p.backbone_delay,
            },
            backhaul: LinkProfile {
                rate: DataRate(10_000_000_000),
                delay: SimTime::ZERO,
            },
            radio: LinkProfile {
                rate: DataRate::from_mbps(150),
                delay: SimTime::from_millis(2),
            },
            packet_size: 1024,
            port_base: 9000,
            sink_guard: SimTime::from_secs(1),
            addressing: AddressPlan::default(),
            mobility: MobilitySettings::default(),
            traffic: default_traffic(num_devices, p.device_rate, p.video_rate),
        }
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// 按名称修改业务类速率；返回是否找到该业务类
    pub fn set_class_rate(&mut self, class: &str, rate: DataRate) -> bool {
        let mut found = false;
        for c in self.traffic.classes.iter_mut().filter(|c| c.name == class) {
            c.rate = rate;
            found = true;
        }
        found
    }

    /// 业务类当前速率
    pub fn class_rate(&self, class: &str) -> Option<DataRate> {
        self.traffic
            .classes
            .iter()
            .find(|c| c.name == class)
            .map(|c| c.rate)
    }

    /// 校验配置面：时长 > 0，各类节点数 ≥ 1，速率为正，输出前缀非空。
    /// 节点数与有线链路参数的问题按拓扑参数错误报告。
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(ScenarioError::InvalidConfig(msg));
        let topology = |msg: String| Err(ScenarioError::InvalidTopologyParameters(msg));
        if self.sim_time == SimTime::ZERO {
            return invalid("simulation time must be positive".into());
        }
        let counts = [
            ("base stations", self.num_base_stations),
            ("devices", self.num_devices),
            ("remote hosts", self.num_remote_hosts),
        ];
        if let Some((what, _)) = counts.iter().find(|(_, n)| *n == 0) {
            return topology(format!("number of {what} must be at least 1"));
        }
        if self.backbone.rate.bps() == 0 || self.backbone.delay == SimTime::ZERO {
            return topology("backbone rate and delay must be positive".into());
        }
        if self.backhaul.rate.bps() == 0 {
            return topology("backhaul link rate must be positive".into());
        }
        if self.radio.rate.bps() == 0 {
            return invalid("radio rate must be positive".into());
        }
        if self.packet_size == 0 {
            return invalid("packet size must be positive".into());
        }
        if self.output_prefix.trim().is_empty() {
            return invalid("output prefix must not be empty".into());
        }
        if let Some(c) = self.traffic.classes.iter().find(|c| c.rate.bps() == 0) {
            return invalid(format!("rate of traffic class `{}` must be positive", c.name));
        }
        Ok(())
    }
}

/// 缺省业务：前两个终端互传文件（TCP），其余终端接收视频（UDP 下行）。
/// 只有一个终端时它只接收视频。
pub fn default_traffic(num_devices: usize, device_rate: DataRate, video_rate: DataRate) -> TrafficPlan {
    let (pair, rest): (Vec<usize>, Vec<usize>) = if num_devices >= 2 {
        ((0..2).collect(), (2..num_devices).collect())
    } else {
        (Vec::new(), (0..num_devices).collect())
    };

    let mut classes = Vec::new();
    if !pair.is_empty() {
        classes.push(TrafficClass {
            name: FILE_TRANSFER_CLASS.to_string(),
            kind: ClassKind::Symmetric,
            devices: pair,
            transport: Transport::Tcp,
            rate: device_rate,
            window: Window::new(SimTime::from_secs(2), SimTime::from_secs(8)),
            sinks: true,
            sink_window: None,
            remote_host: 0,
        });
    }
    if !rest.is_empty() {
        classes.push(TrafficClass {
            name: VIDEO_CLASS.to_string(),
            kind: ClassKind::Asymmetric {
                direction: Direction::Downlink,
            },
            devices: rest,
            transport: Transport::Udp,
            rate: video_rate,
            window: Window::new(SimTime::from_secs(3), SimTime::from_secs(8)),
            sinks: true,
            sink_window: None,
            remote_host: 0,
        });
    }
    TrafficPlan { classes }
}
