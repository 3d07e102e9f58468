//! 拓扑构建

pub mod cellular;

pub use cellular::{
    BACKBONE_SEGMENT, BACKHAUL_SEGMENT, DEVICE_SEGMENT, SUPPORT_NODES, Topology, TopologyParams,
};
