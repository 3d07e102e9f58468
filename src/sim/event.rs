//! 仿真事件
//!
//! 场景运行期的一切动作（Source 启动、发包、逐跳到达）都是事件。

use super::simulator::Simulator;
use super::world::World;

/// 在 `Simulator` 中按时间顺序执行一次的动作。
///
/// 事件按值消费（`self: Box<Self>`），执行时可以把携带的数据包等状态
/// 移交给新调度的事件。
pub trait Event: Send + 'static {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World);
}
