//! 移动性配置
//!
//! 只为每类节点选择放置/移动参数并交给外部移动性提供者；
//! 轨迹本身由提供者生成，这里从不读取。

mod configurator;
mod policy;

pub use configurator::MobilityConfigurator;
pub use policy::{GridLayout, MobilityPolicy, Position, RandomWalkBounds};

use crate::error::StackError;
use crate::net::NodeId;

/// 外部移动性提供者
pub trait MobilityProvider {
    /// 固定位置
    fn set_position(&mut self, node: NodeId, position: Position) -> Result<(), StackError>;

    /// 在矩形区域内随机游走
    fn set_random_walk(&mut self, node: NodeId, bounds: &RandomWalkBounds) -> Result<(), StackError>;
}
