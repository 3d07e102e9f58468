//! 终端接入规划
//!
//! 轮询策略：第 i 个终端接入第 `i mod B` 个基站。与信号强度无关，
//! 只依赖终端顺序，因此完全可复现，且各基站的终端数相差不超过 1。
//! 接入是静态的：场景建立时计算一次，运行期间不切换。

use crate::error::{Result, ScenarioError};
use crate::net::{AddressAllocator, AddressBlock, NodeId, RoutingTable};
use crate::stack::NetworkStack;
use crate::topo::{BACKBONE_SEGMENT, Topology};
use serde::Serialize;
use tracing::{debug, info};

/// 终端与其服务基站
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Attachment {
    pub device: NodeId,
    pub station: NodeId,
}

/// 计算接入关系（纯函数）
pub fn plan_attachments(devices: &[NodeId], stations: &[NodeId]) -> Result<Vec<Attachment>> {
    if stations.is_empty() {
        return Err(ScenarioError::NoBaseStationsAvailable);
    }
    Ok(devices
        .iter()
        .enumerate()
        .map(|(i, &device)| Attachment {
            device,
            station: stations[i % stations.len()],
        })
        .collect())
}

/// 按终端 id 升序为每个终端分配 device 网段地址，并在网络栈上完成接入。
#[tracing::instrument(skip_all, fields(attachments = attachments.len()))]
pub fn attach_devices(
    topo: &mut Topology,
    attachments: &[Attachment],
    alloc: &mut AddressAllocator,
    device_block: &AddressBlock,
    stack: &mut dyn NetworkStack,
) -> Result<()> {
    let mut ordered = attachments.to_vec();
    ordered.sort_by_key(|a| a.device);

    for att in ordered {
        let address = topo.assign_interface(att.device, alloc, device_block, stack)?;
        stack
            .attach_device(att.device, att.station)
            .map_err(ScenarioError::stack("attach_device"))?;
        debug!(device = %att.device, station = %att.station, %address, "终端接入基站");
    }
    info!(count = attachments.len(), "📶 终端接入完成");
    Ok(())
}

/// 安装路由：每个终端一条指向网关 device 网段地址的默认路由，
/// 每个远端主机一条经网关 backbone 地址到 device 网段的静态路由。
///
/// 必须在地址分配之后、业务开始之前调用；相同输入重复调用不会产生重复表项。
pub fn install_routes(
    topo: &Topology,
    device_block: &AddressBlock,
    routes: &mut RoutingTable,
) -> Result<()> {
    let gateway = topo.gateway().ok_or_else(|| {
        ScenarioError::InvalidTopologyParameters("topology has no gateway".into())
    })?;
    let gw_device_addr = topo
        .address_of(gateway, &device_block.segment)
        .ok_or_else(|| ScenarioError::UnknownSegment(device_block.segment.clone()))?;

    for device in topo.devices() {
        routes.add_default(device, gw_device_addr);
    }

    for rh in topo.remote_hosts() {
        let gw_backbone_addr = topo
            .link_between(rh, gateway)
            .and_then(|l| l.address_of(gateway))
            .ok_or_else(|| ScenarioError::UnknownSegment(BACKBONE_SEGMENT.to_string()))?;
        routes.add_static(rh, device_block.prefix, gw_backbone_addr);
    }

    info!(entries = routes.len(), "🧭 路由安装完成");
    Ok(())
}
