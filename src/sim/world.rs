//! 仿真世界
//!
//! 事件执行时能访问的全部可变状态。场景运行时的实现是
//! `scenario::ScenarioWorld`（网络栈、应用表、流监视器）。

use std::any::Any;

/// 事件通过 `as_any_mut` 向下转型到具体的世界类型。
pub trait World: Any {
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
