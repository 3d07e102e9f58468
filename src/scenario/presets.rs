//! 批量运行用的参考参数组合

use super::config::{ReferenceParams, ScenarioConfig};
use crate::net::DataRate;
use crate::sim::SimTime;

const GBPS: u64 = 1_000_000_000;
const MBPS: u64 = 1_000_000;
const KBPS: u64 = 1_000;

/// (backbone 速率, backbone 时延 ms, 终端速率, 视频速率)，单位 bit/s
const PRESETS: [(u64, u64, u64, u64); 10] = [
    (10 * GBPS, 5, 5 * MBPS, 10 * MBPS),
    (20 * GBPS, 2, MBPS, 5 * MBPS),
    (10 * GBPS, 10, 10 * MBPS, 20 * MBPS),
    (GBPS, 50, 2 * MBPS, 5 * MBPS),
    (5 * GBPS, 5, 500 * KBPS, 15 * MBPS),
    (50 * GBPS, 1, MBPS, 2 * MBPS),
    (500 * MBPS, 100, 5 * MBPS, 10 * MBPS),
    (5 * GBPS, 10, 3 * MBPS, 8 * MBPS),
    (GBPS, 200, MBPS, 2 * MBPS),
    (10 * GBPS, 10, 5 * MBPS, 10 * MBPS),
];

/// 十个参考场景，输出前缀依次为 `sim-0` .. `sim-9`
pub fn presets() -> Vec<ScenarioConfig> {
    PRESETS
        .iter()
        .enumerate()
        .map(|(i, &(backbone, delay_ms, device, video))| {
            ScenarioConfig::reference(&ReferenceParams {
                backbone_rate: DataRate(backbone),
                backbone_delay: SimTime::from_millis(delay_ms),
                device_rate: DataRate(device),
                video_rate: DataRate(video),
                output_prefix: format!("sim-{i}"),
            })
        })
        .collect()
}
