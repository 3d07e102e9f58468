//! 仿真器
//!
//! 定义事件驱动仿真器，维护当前时间与事件队列。

use super::event::Event;
use super::scheduled_event::ScheduledEvent;
use super::time::SimTime;
use super::world::World;
use std::collections::BinaryHeap;
use tracing::{debug, info, trace};

/// 事件驱动仿真器：维护当前时间与事件队列。
#[derive(Default)]
pub struct Simulator {
    now: SimTime,
    next_seq: u64,
    executed: u64,
    q: BinaryHeap<ScheduledEvent>,
}

impl Simulator {
    /// 获取当前仿真时间
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// 已执行的事件总数
    pub fn executed_events(&self) -> u64 {
        self.executed
    }

    /// 队列中尚未执行的事件数
    pub fn pending_events(&self) -> usize {
        self.q.len()
    }

    /// 调度事件在指定时间执行。早于当前时间的请求按当前时间处理。
    #[tracing::instrument(level = "trace", skip(self, ev), fields(event_type = std::any::type_name::<E>(), schedule_at = ?at))]
    pub fn schedule<E: Event>(&mut self, at: SimTime, ev: E) {
        let seq = self.next_seq;
        let at = at.max(self.now);
        trace!(now = ?self.now, seq, "调度事件");

        self.next_seq = self.next_seq.wrapping_add(1);
        self.q.push(ScheduledEvent {
            at,
            seq,
            ev: Box::new(ev),
        });
    }

    /// 运行直到事件队列为空或到达 `until`。
    ///
    /// 晚于 `until` 的事件留在队列中不执行；结束时 `now` 至少推进到 `until`。
    #[tracing::instrument(skip(self, world))]
    pub fn run_until(&mut self, until: SimTime, world: &mut dyn World) {
        info!(until = %until, queue_size = self.q.len(), "▶️  开始运行仿真");

        let start_count = self.executed;
        while let Some(top) = self.q.peek() {
            if top.at > until {
                break;
            }
            let Some(item) = self.q.pop() else { break };
            self.now = item.at;
            self.executed += 1;
            trace!(now = ?self.now, seq = item.seq, remaining_queue = self.q.len(), "执行事件");
            item.ev.execute(self, world);
        }
        self.now = self.now.max(until);

        debug!(left_in_queue = self.q.len(), "到达运行上限");
        info!(
            total_events = self.executed - start_count,
            final_time = %self.now,
            "✅ 仿真完成"
        );
    }

    /// 运行所有事件直到队列为空（事件执行中新调度的事件也会被执行）。
    pub fn run(&mut self, world: &mut dyn World) {
        while let Some(until) = self.q.iter().map(|e| e.at).max() {
            self.run_until(until, world);
        }
    }
}
