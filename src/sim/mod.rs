//! 仿真核心模块
//!
//! 事件驱动仿真内核：场景运行时由它推进虚拟时间并投递应用启停、
//! 数据包发送/到达等事件。场景构建本身不依赖内核，只在运行阶段使用。

mod event;
mod scheduled_event;
mod simulator;
mod time;
mod world;

pub use event::Event;
pub use simulator::Simulator;
pub use time::SimTime;
pub use world::World;
