//! 调度事件
//!
//! 队列元素：执行时间 + 调度序号 + 事件对象。

use super::event::Event;
use super::time::SimTime;
use std::cmp::{Ordering, Reverse};

pub(crate) struct ScheduledEvent {
    pub(crate) at: SimTime,
    pub(crate) seq: u64,
    pub(crate) ev: Box<dyn Event>,
}

impl ScheduledEvent {
    /// BinaryHeap 是 max-heap：键取反后，时间早者优先，同一时刻按调度顺序执行。
    fn key(&self) -> (Reverse<SimTime>, Reverse<u64>) {
        (Reverse(self.at), Reverse(self.seq))
    }
}

impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for ScheduledEvent {}
