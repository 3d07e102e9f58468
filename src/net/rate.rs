//! 数据速率
//!
//! ns-3 风格的速率字符串（`"10Gbps"`、`"500Kbps"`）与传输时延计算。

use crate::error::ScenarioError;
use crate::sim::SimTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 数据速率（bit/s）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DataRate(pub u64);

const UNITS: [(&str, u64); 4] = [
    ("Gbps", 1_000_000_000),
    ("Mbps", 1_000_000),
    ("Kbps", 1_000),
    ("bps", 1),
];

impl DataRate {
    pub fn from_mbps(mbps: u64) -> DataRate {
        DataRate(mbps.saturating_mul(1_000_000))
    }

    pub fn bps(self) -> u64 {
        self.0
    }

    /// 以该速率串行发送 `bytes` 字节所需的时间，向上取整到纳秒。
    pub fn tx_time(self, bytes: u32) -> SimTime {
        if self.0 == 0 {
            return SimTime(u64::MAX / 4);
        }
        let bits = (bytes as u128).saturating_mul(8);
        let nanos = (bits.saturating_mul(1_000_000_000u128) + (self.0 as u128 - 1)) / self.0 as u128;
        SimTime(nanos.min(u64::MAX as u128) as u64)
    }
}

impl fmt::Display for DataRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (unit, scale) = UNITS
            .iter()
            .copied()
            .find(|(_, scale)| self.0 != 0 && self.0 % scale == 0)
            .unwrap_or(("bps", 1));
        write!(f, "{}{}", self.0 / scale, unit)
    }
}

impl FromStr for DataRate {
    type Err = ScenarioError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let s = raw.trim();
        let invalid = || ScenarioError::InvalidConfig(format!("invalid data rate `{raw}`"));
        let split = s
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(invalid)?;
        let (value, unit) = s.split_at(split);
        let scale = match unit {
            "Gbps" | "gbps" => 1_000_000_000,
            "Mbps" | "mbps" => 1_000_000,
            "Kbps" | "kbps" => 1_000,
            "bps" => 1,
            _ => return Err(invalid()),
        };
        let value: f64 = value.parse().map_err(|_| invalid())?;
        let bps = (value * scale as f64).round();
        if !bps.is_finite() || bps < 0.0 || bps > u64::MAX as f64 {
            return Err(invalid());
        }
        Ok(DataRate(bps as u64))
    }
}

impl TryFrom<String> for DataRate {
    type Error = ScenarioError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DataRate> for String {
    fn from(value: DataRate) -> Self {
        value.to_string()
    }
}
