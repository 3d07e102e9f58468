//! IPv4 地址分配
//!
//! 每个逻辑网段（backbone / backhaul / device）拥有一个互不重叠的地址块，
//! 块内地址按调用顺序单调递增地发放。网络地址与广播地址保留不发。

use crate::error::{Result, ScenarioError};
use serde::Serialize;
use std::fmt;
use std::net::Ipv4Addr;
use tracing::{debug, info};

/// 每个地址块中保留（不分配给接口）的地址数：网络地址 + 广播地址。
pub const RESERVED_PER_BLOCK: u64 = 2;

/// CIDR 前缀 `network/len`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Ipv4Prefix {
    pub network: Ipv4Addr,
    pub len: u8,
}

impl Ipv4Prefix {
    /// 默认路由 `0.0.0.0/0`
    pub const DEFAULT: Ipv4Prefix = Ipv4Prefix {
        network: Ipv4Addr::UNSPECIFIED,
        len: 0,
    };

    /// 构造前缀，主机位会被清零。
    pub fn new(addr: Ipv4Addr, len: u8) -> Ipv4Prefix {
        let len = len.min(32);
        Ipv4Prefix {
            network: Ipv4Addr::from_bits(addr.to_bits() & mask(len)),
            len,
        }
    }

    pub fn mask(&self) -> Ipv4Addr {
        Ipv4Addr::from_bits(mask(self.len))
    }

    pub fn broadcast(&self) -> Ipv4Addr {
        Ipv4Addr::from_bits(self.network.to_bits() | !mask(self.len))
    }

    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        addr.to_bits() & mask(self.len) == self.network.to_bits()
    }

    /// 两个前缀重叠当且仅当较短者包含较长者的网络地址。
    pub fn overlaps(&self, other: &Ipv4Prefix) -> bool {
        let len = self.len.min(other.len);
        let m = mask(len);
        self.network.to_bits() & m == other.network.to_bits() & m
    }

    /// 可分配给接口的地址数量。
    pub fn capacity(&self) -> u64 {
        (1u64 << (32 - u32::from(self.len))).saturating_sub(RESERVED_PER_BLOCK)
    }
}

impl fmt::Display for Ipv4Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.len)
    }
}

fn mask(len: u8) -> u32 {
    if len == 0 { 0 } else { u32::MAX << (32 - u32::from(len)) }
}

/// 分配给某个逻辑网段的地址块
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressBlock {
    pub segment: String,
    pub prefix: Ipv4Prefix,
}

impl AddressBlock {
    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        self.prefix.contains(addr)
    }
}

#[derive(Debug)]
struct BlockState {
    block: AddressBlock,
    issued: u64,
}

/// 地址分配器
///
/// 纯确定性：相同的调用顺序总是得到相同的地址。
#[derive(Debug, Default)]
pub struct AddressAllocator {
    blocks: Vec<BlockState>,
}

impl AddressAllocator {
    /// 为网段分配地址块。
    ///
    /// 前缀长度必须在 1..=30 之间（更长的前缀扣除保留地址后不剩可用地址）；
    /// 同名网段不可重复分配，不同网段之间不可重叠。
    #[tracing::instrument(skip(self), fields(segment = %segment))]
    pub fn allocate(&mut self, segment: &str, base: Ipv4Addr, prefix_len: u8) -> Result<AddressBlock> {
        if !(1..=30).contains(&prefix_len) {
            return Err(ScenarioError::InvalidConfig(format!(
                "prefix length {prefix_len} for segment `{segment}` must be within 1..=30"
            )));
        }
        if self.blocks.iter().any(|b| b.block.segment == segment) {
            return Err(ScenarioError::DuplicateSegment(segment.to_string()));
        }
        let prefix = Ipv4Prefix::new(base, prefix_len);
        if let Some(other) = self.blocks.iter().find(|b| b.block.prefix.overlaps(&prefix)) {
            return Err(ScenarioError::OverlappingAddressBlock {
                segment: segment.to_string(),
                base: prefix.network,
                prefix_len,
                other: other.block.segment.clone(),
            });
        }

        let block = AddressBlock {
            segment: segment.to_string(),
            prefix,
        };
        info!(prefix = %prefix, capacity = prefix.capacity(), "📐 分配地址块");
        self.blocks.push(BlockState {
            block: block.clone(),
            issued: 0,
        });
        Ok(block)
    }

    /// 从地址块中取下一个地址。
    pub fn next_address(&mut self, block: &AddressBlock) -> Result<Ipv4Addr> {
        let state = self
            .blocks
            .iter_mut()
            .find(|b| b.block.segment == block.segment)
            .ok_or_else(|| ScenarioError::UnknownSegment(block.segment.clone()))?;
        let prefix = state.block.prefix;
        if state.issued >= prefix.capacity() {
            return Err(ScenarioError::AddressSpaceExhausted {
                segment: state.block.segment.clone(),
                base: prefix.network,
                prefix_len: prefix.len,
            });
        }
        state.issued += 1;
        // issued <= capacity < 2^32，偏移一定落在块内
        let addr = Ipv4Addr::from_bits(prefix.network.to_bits() + state.issued as u32);
        debug!(segment = %state.block.segment, %addr, issued = state.issued, "发放地址");
        Ok(addr)
    }

    /// 已发放的地址数量
    pub fn issued(&self, segment: &str) -> Option<u64> {
        self.blocks
            .iter()
            .find(|b| b.block.segment == segment)
            .map(|b| b.issued)
    }

    pub fn blocks(&self) -> impl Iterator<Item = &AddressBlock> {
        self.blocks.iter().map(|b| &b.block)
    }
}
