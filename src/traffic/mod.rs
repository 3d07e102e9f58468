//! 业务调度
//!
//! 把按业务类描述的流量计划展开成一组 Source/Sink 应用，
//! 每个应用有固定的端口、对端地址、速率和活跃时间窗。

mod app;
mod plan;
mod scheduler;

pub use app::{AppRole, Application};
pub use plan::{ClassKind, Direction, TrafficClass, TrafficPlan, Transport, Window};
pub use scheduler::{EPHEMERAL_PORT_BASE, MIN_SINK_GUARD, TrafficScheduler};
