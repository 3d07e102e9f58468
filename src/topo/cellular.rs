//! 蜂窝场景拓扑构建
//!
//! 节点按固定顺序创建：远端主机 -> 网关 -> 支撑节点 -> 基站 -> 终端。
//! 远端主机与网关之间是 backbone 链路（backbone 网段编址），
//! 每个基站与网关之间是 backhaul 链路（backhaul 网段编址）。
//! 终端地址不在这里分配，见 [`crate::attach`]。

use crate::error::{Result, ScenarioError};
use crate::mobility::MobilityPolicy;
use crate::net::{
    AddressAllocator, AddressBlock, Interface, Link, LinkId, LinkKind, LinkProfile, Node, NodeId,
    NodeRole,
};
use crate::sim::SimTime;
use crate::stack::NetworkStack;
use std::net::Ipv4Addr;
use tracing::{debug, info};

pub const BACKBONE_SEGMENT: &str = "backbone";
pub const BACKHAUL_SEGMENT: &str = "backhaul";
pub const DEVICE_SEGMENT: &str = "device";

/// 支撑节点名称（创建顺序即此顺序）
pub const SUPPORT_NODES: [&str; 2] = ["sgw", "mme"];

/// 拓扑参数
#[derive(Debug, Clone)]
pub struct TopologyParams {
    pub num_base_stations: usize,
    pub num_devices: usize,
    pub num_remote_hosts: usize,
    pub backbone: LinkProfile,
    pub backhaul: LinkProfile,
}

/// 按角色标注的节点表与链路表
#[derive(Debug, Default)]
pub struct Topology {
    built: bool,
    nodes: Vec<Node>,
    links: Vec<Link>,
    backbone: Option<AddressBlock>,
    backhaul: Option<AddressBlock>,
}

impl Topology {
    /// 创建并构建拓扑
    pub fn build_topology(
        params: &TopologyParams,
        alloc: &mut AddressAllocator,
        backbone: &AddressBlock,
        backhaul: &AddressBlock,
        stack: &mut dyn NetworkStack,
    ) -> Result<Topology> {
        let mut topo = Topology::default();
        topo.build(params, alloc, backbone, backhaul, stack)?;
        Ok(topo)
    }

    /// 构建拓扑：一次性操作，对同一个 Topology 再次调用返回 `AlreadyBuilt`。
    #[tracing::instrument(skip_all, fields(
        base_stations = params.num_base_stations,
        devices = params.num_devices,
        remote_hosts = params.num_remote_hosts,
    ))]
    pub fn build(
        &mut self,
        params: &TopologyParams,
        alloc: &mut AddressAllocator,
        backbone: &AddressBlock,
        backhaul: &AddressBlock,
        stack: &mut dyn NetworkStack,
    ) -> Result<()> {
        if self.built {
            return Err(ScenarioError::AlreadyBuilt);
        }
        validate(params)?;
        // 参数校验通过后即视为已构建：失败的构建也不能在同一个句柄上重来
        self.built = true;
        self.backbone = Some(backbone.clone());
        self.backhaul = Some(backhaul.clone());

        let remote_hosts: Vec<NodeId> = (0..params.num_remote_hosts)
            .map(|i| self.add_node(NodeRole::RemoteHost, format!("remote{i}")))
            .collect();
        let gateway = self.add_node(NodeRole::Gateway, "pgw");
        for name in SUPPORT_NODES {
            self.add_node(NodeRole::SupportNode, name);
        }
        let stations: Vec<NodeId> = (0..params.num_base_stations)
            .map(|i| self.add_node(NodeRole::BaseStation, format!("enb{i}")))
            .collect();
        for i in 0..params.num_devices {
            self.add_node(NodeRole::Device, format!("ue{i}"));
        }

        for rh in remote_hosts {
            self.add_link(
                LinkKind::WiredBackbone,
                gateway,
                rh,
                params.backbone,
                alloc,
                backbone,
                stack,
            )?;
        }
        for enb in stations {
            self.add_link(
                LinkKind::Backhaul,
                enb,
                gateway,
                params.backhaul,
                alloc,
                backhaul,
                stack,
            )?;
        }

        info!(
            nodes = self.nodes.len(),
            links = self.links.len(),
            "🏗️  拓扑构建完成"
        );
        Ok(())
    }

    fn add_node(&mut self, role: NodeRole, name: impl Into<String>) -> NodeId {
        let id = NodeId(self.nodes.len());
        let node = Node::new(id, role, name);
        debug!(%id, %role, name = %node.name, "创建节点");
        self.nodes.push(node);
        id
    }

    #[allow(clippy::too_many_arguments)]
    fn add_link(
        &mut self,
        kind: LinkKind,
        a: NodeId,
        b: NodeId,
        profile: LinkProfile,
        alloc: &mut AddressAllocator,
        block: &AddressBlock,
        stack: &mut dyn NetworkStack,
    ) -> Result<LinkId> {
        stack
            .install_link(a, b, profile.rate, profile.delay)
            .map_err(ScenarioError::stack("install_link"))?;
        let a_addr = self.assign_interface(a, alloc, block, stack)?;
        let b_addr = self.assign_interface(b, alloc, block, stack)?;

        let id = LinkId(self.links.len());
        self.links.push(Link {
            id,
            kind,
            a,
            b,
            a_addr,
            b_addr,
            segment: block.segment.clone(),
            profile,
        });
        debug!(?id, ?kind, %a, %a_addr, %b, %b_addr, "创建链路");
        Ok(id)
    }

    /// 从地址块取下一个地址，配置到节点上并记录接口。
    pub fn assign_interface(
        &mut self,
        node: NodeId,
        alloc: &mut AddressAllocator,
        block: &AddressBlock,
        stack: &mut dyn NetworkStack,
    ) -> Result<Ipv4Addr> {
        if node.0 >= self.nodes.len() {
            return Err(ScenarioError::UnknownNode(node));
        }
        let address = alloc.next_address(block)?;
        stack
            .assign_address(node, address, block.prefix.len)
            .map_err(ScenarioError::stack("assign_address"))?;
        self.nodes[node.0].interfaces.push(Interface {
            segment: block.segment.clone(),
            address,
            prefix_len: block.prefix.len,
        });
        Ok(address)
    }

    pub(crate) fn set_mobility(&mut self, node: NodeId, policy: MobilityPolicy) -> Result<()> {
        let entry = self
            .nodes
            .get_mut(node.0)
            .ok_or(ScenarioError::UnknownNode(node))?;
        entry.mobility = Some(policy);
        Ok(())
    }

    pub fn is_built(&self) -> bool {
        self.built
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// 某角色的全部节点，按 id 升序
    pub fn nodes_with_role(&self, role: NodeRole) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|n| n.role == role)
            .map(|n| n.id)
            .collect()
    }

    pub fn remote_hosts(&self) -> Vec<NodeId> {
        self.nodes_with_role(NodeRole::RemoteHost)
    }

    pub fn support_nodes(&self) -> Vec<NodeId> {
        self.nodes_with_role(NodeRole::SupportNode)
    }

    pub fn base_stations(&self) -> Vec<NodeId> {
        self.nodes_with_role(NodeRole::BaseStation)
    }

    pub fn devices(&self) -> Vec<NodeId> {
        self.nodes_with_role(NodeRole::Device)
    }

    /// 核心网网关
    pub fn gateway(&self) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|n| n.role == NodeRole::Gateway)
            .map(|n| n.id)
    }

    /// 第 `index` 个终端（按创建顺序）
    pub fn device(&self, index: usize) -> Option<NodeId> {
        self.nodes
            .iter()
            .filter(|n| n.role == NodeRole::Device)
            .nth(index)
            .map(|n| n.id)
    }

    /// 节点在网段上的地址
    pub fn address_of(&self, node: NodeId, segment: &str) -> Option<Ipv4Addr> {
        self.node(node).and_then(|n| n.address_in(segment))
    }

    pub fn backbone_block(&self) -> Option<&AddressBlock> {
        self.backbone.as_ref()
    }

    pub fn backhaul_block(&self) -> Option<&AddressBlock> {
        self.backhaul.as_ref()
    }

    /// 连接 `x` 与 `y` 的有线链路
    pub fn link_between(&self, x: NodeId, y: NodeId) -> Option<&Link> {
        self.links.iter().find(|l| l.connects(x, y))
    }
}

fn validate(params: &TopologyParams) -> Result<()> {
    let counts = [
        ("base stations", params.num_base_stations),
        ("devices", params.num_devices),
        ("remote hosts", params.num_remote_hosts),
    ];
    for (what, count) in counts {
        if count == 0 {
            return Err(ScenarioError::InvalidTopologyParameters(format!(
                "number of {what} must be at least 1"
            )));
        }
    }
    for (what, profile) in [("backbone", params.backbone), ("backhaul", params.backhaul)] {
        if profile.rate.bps() == 0 {
            return Err(ScenarioError::InvalidTopologyParameters(format!(
                "{what} link rate must be positive"
            )));
        }
    }
    if params.backbone.delay == SimTime::ZERO {
        return Err(ScenarioError::InvalidTopologyParameters(
            "backbone link delay must be positive".into(),
        ));
    }
    Ok(())
}
