use crate::net::{AddressAllocator, AddressBlock, DataRate, LinkProfile};
use crate::sim::SimTime;
use crate::stack::MemoryStack;
use crate::topo::{
    BACKBONE_SEGMENT, BACKHAUL_SEGMENT, DEVICE_SEGMENT, Topology, TopologyParams,
};
use std::net::Ipv4Addr;

mod attach;
mod data_rate;
mod flow_monitor;
mod flow_summary;
mod mobility;

pub(crate) fn params(stations: usize, devices: usize, remote_hosts: usize) -> TopologyParams {
    TopologyParams {
        num_base_stations: stations,
        num_devices: devices,
        num_remote_hosts: remote_hosts,
        backbone: LinkProfile {
            rate: DataRate(10_000_000_000),
            delay: SimTime::from_millis(5),
        },
        backhaul: LinkProfile {
            rate: DataRate(10_000_000_000),
            delay: SimTime::ZERO,
        },
    }
}

pub(crate) fn radio() -> LinkProfile {
    LinkProfile {
        rate: DataRate::from_mbps(150),
        delay: SimTime::from_millis(2),
    }
}

pub(crate) struct Blocks {
    pub alloc: AddressAllocator,
    pub backbone: AddressBlock,
    pub backhaul: AddressBlock,
    pub device: AddressBlock,
}

pub(crate) fn blocks() -> Blocks {
    let mut alloc = AddressAllocator::default();
    let backbone = alloc
        .allocate(BACKBONE_SEGMENT, Ipv4Addr::new(1, 0, 0, 0), 8)
        .expect("backbone block");
    let backhaul = alloc
        .allocate(BACKHAUL_SEGMENT, Ipv4Addr::new(10, 0, 0, 0), 8)
        .expect("backhaul block");
    let device = alloc
        .allocate(DEVICE_SEGMENT, Ipv4Addr::new(7, 0, 0, 0), 8)
        .expect("device block");
    Blocks {
        alloc,
        backbone,
        backhaul,
        device,
    }
}

/// 建好拓扑（尚未接入终端），返回拓扑、地址块与网络栈
pub(crate) fn built_topology(
    stations: usize,
    devices: usize,
    remote_hosts: usize,
) -> (Topology, Blocks, MemoryStack) {
    let mut b = blocks();
    let mut stack = MemoryStack::new(radio());
    let topo = Topology::build_topology(
        &params(stations, devices, remote_hosts),
        &mut b.alloc,
        &b.backbone,
        &b.backhaul,
        &mut stack,
    )
    .expect("build topology");
    (topo, b, stack)
}
