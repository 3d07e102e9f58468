//! 场景构建
//!
//! 严格按依赖顺序单线程执行：地址分配 -> 拓扑 -> 移动性 -> 接入 -> 路由 -> 业务。
//! 任一步失败整个构建失败，不保留半成品。

use super::config::{ScenarioConfig, SegmentSpec};
use crate::attach::{Attachment, attach_devices, install_routes, plan_attachments};
use crate::error::{Result, ScenarioError};
use crate::mobility::{MobilityConfigurator, MobilityProvider};
use crate::net::{AddressAllocator, AddressBlock, NodeId, RoutingTable};
use crate::stack::NetworkStack;
use crate::topo::{BACKBONE_SEGMENT, BACKHAUL_SEGMENT, DEVICE_SEGMENT, Topology, TopologyParams};
use crate::traffic::{Application, TrafficScheduler};
use tracing::info;

/// 一个已完全建立、可以运行的场景
#[derive(Debug)]
pub struct Scenario {
    pub config: ScenarioConfig,
    pub allocator: AddressAllocator,
    pub topology: Topology,
    pub device_block: AddressBlock,
    pub attachments: Vec<Attachment>,
    pub routes: RoutingTable,
    pub applications: Vec<Application>,
}

impl Scenario {
    #[tracing::instrument(skip_all, fields(prefix = %config.output_prefix))]
    pub fn build<S>(config: ScenarioConfig, stack: &mut S) -> Result<Scenario>
    where
        S: NetworkStack + MobilityProvider,
    {
        config.validate()?;

        let mut allocator = AddressAllocator::default();
        let alloc_segment = |alloc: &mut AddressAllocator, name: &str, spec: SegmentSpec| {
            alloc.allocate(name, spec.base, spec.prefix_len)
        };
        let backbone = alloc_segment(&mut allocator, BACKBONE_SEGMENT, config.addressing.backbone)?;
        let backhaul = alloc_segment(&mut allocator, BACKHAUL_SEGMENT, config.addressing.backhaul)?;
        let device_block = alloc_segment(&mut allocator, DEVICE_SEGMENT, config.addressing.device)?;

        let params = TopologyParams {
            num_base_stations: config.num_base_stations,
            num_devices: config.num_devices,
            num_remote_hosts: config.num_remote_hosts,
            backbone: config.backbone,
            backhaul: config.backhaul,
        };
        let mut topology =
            Topology::build_topology(&params, &mut allocator, &backbone, &backhaul, stack)?;

        // 网关先拿 device 网段的第一个地址，作为所有终端的默认网关
        let gateway = topology.gateway().ok_or_else(|| {
            ScenarioError::InvalidTopologyParameters("topology has no gateway".into())
        })?;
        topology.assign_interface(gateway, &mut allocator, &device_block, stack)?;

        let mut core: Vec<NodeId> = topology.remote_hosts();
        core.push(gateway);
        core.extend(topology.support_nodes());
        let stations = topology.base_stations();
        let devices = topology.devices();
        {
            let mut mobility = MobilityConfigurator::new(stack);
            mobility.set_static_grid(&mut topology, &core, &config.mobility.core_grid)?;
            mobility.set_static_grid(&mut topology, &stations, &config.mobility.station_grid)?;
            mobility.set_bounded_random_walk(&mut topology, &devices, &config.mobility.device_walk)?;
        }

        let attachments = plan_attachments(&devices, &stations)?;
        attach_devices(&mut topology, &attachments, &mut allocator, &device_block, stack)?;

        let mut routes = RoutingTable::default();
        install_routes(&topology, &device_block, &mut routes)?;

        let mut scheduler = TrafficScheduler::new(config.port_base, config.sink_guard)?;
        let applications = scheduler.schedule_flows(&config.traffic, &topology)?;

        info!(
            nodes = topology.nodes().len(),
            attachments = attachments.len(),
            routes = routes.len(),
            applications = applications.len(),
            "✅ 场景构建完成"
        );

        Ok(Scenario {
            config,
            allocator,
            topology,
            device_block,
            attachments,
            routes,
            applications,
        })
    }
}
