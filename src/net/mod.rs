//! 网络数据模型
//!
//! 节点、链路、地址块、数据速率与静态路由。

mod addr;
mod id;
mod link;
mod node;
mod packet;
mod rate;
mod routing;

pub use addr::{AddressAllocator, AddressBlock, Ipv4Prefix, RESERVED_PER_BLOCK};
pub use id::{LinkId, NodeId};
pub use link::{Link, LinkKind, LinkProfile};
pub use node::{Interface, Node, NodeRole};
pub use packet::Packet;
pub use rate::DataRate;
pub use routing::{RouteEntry, RouteKind, RoutingTable};
