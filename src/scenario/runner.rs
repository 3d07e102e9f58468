//! 场景运行
//!
//! 把已建立的场景交给仿真内核：每个 Source 在时间窗内按恒定比特率发包，
//! 包在内存网络栈上逐跳转发，到达目的节点时只有活跃的 Sink 会接收。
//! 运行到 `sim_time` 无条件结束，仍在途的包不计入接收。

use std::collections::HashMap;
use std::net::Ipv4Addr;

use super::builder::Scenario;
use crate::error::Result;
use crate::flow::{AggregateSummary, FiveTuple, FlowMonitor, FlowRecord, FlowSummary, aggregate, summarize};
use crate::net::{NodeId, Packet, RoutingTable};
use crate::sim::{Event, SimTime, Simulator, World};
use crate::stack::MemoryStack;
use crate::traffic::{Application, Transport, Window};
use std::any::Any;
use tracing::{debug, info, trace, warn};

/// 运行期世界：网络栈、应用表与流监视器
pub struct ScenarioWorld {
    pub stack: MemoryStack,
    pub monitor: FlowMonitor,
    apps: Vec<Application>,
    paths: HashMap<usize, Vec<NodeId>>,
    sinks: HashMap<(Ipv4Addr, u16, Transport), Window>,
    routes: RoutingTable,
    packet_size: u32,
}

impl ScenarioWorld {
    pub fn new(stack: MemoryStack, apps: Vec<Application>, routes: RoutingTable, packet_size: u32) -> Self {
        let sinks = apps
            .iter()
            .filter(|a| a.is_sink())
            .map(|a| ((*a.local.ip(), a.local.port(), a.transport), a.window))
            .collect();
        Self {
            stack,
            monitor: FlowMonitor::default(),
            apps,
            paths: HashMap::new(),
            sinks,
            routes,
            packet_size,
        }
    }

    fn sink_active(&self, tuple: &FiveTuple, now: SimTime) -> bool {
        self.sinks
            .get(&(tuple.dst, tuple.dst_port, tuple.transport))
            .is_some_and(|w| w.contains(now))
    }

    /// 源节点到目的地址的逐跳路径。
    ///
    /// 源节点有匹配路由时先到该路由的下一跳，再由下一跳继续转发；
    /// 没有路由的节点（网关、支撑节点）直接走网络栈的最短路径。
    fn resolve_path(&self, src: NodeId, dst_addr: Ipv4Addr) -> Option<Vec<NodeId>> {
        let dst = self.stack.node_for(dst_addr)?;
        let via = self
            .routes
            .lookup(src, dst_addr)
            .and_then(|next_hop| self.stack.node_for(next_hop))
            .filter(|&via| via != src);
        let Some(via) = via else {
            return self.stack.route(src, dst);
        };
        let mut path = self.stack.route(src, via)?;
        let rest = self.stack.route(via, dst)?;
        path.extend(rest.into_iter().skip(1));
        Some(path)
    }

    /// 把包从 `from` 发往路径上的下一跳
    fn forward_from(&mut self, from: NodeId, pkt: Packet, sim: &mut Simulator) {
        let Some(next) = pkt.next() else {
            return;
        };
        match self.stack.transmit(from, next, pkt.size_bytes, sim.now()) {
            Some(arrive) => sim.schedule(arrive, DeliverPacket { pkt: pkt.advance() }),
            None => warn!(from = %from, to = %next, pkt_id = pkt.id, "没有可用信道，丢弃"),
        }
    }
}

impl World for ScenarioWorld {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn scenario_world(world: &mut dyn World) -> &mut ScenarioWorld {
    world
        .as_any_mut()
        .downcast_mut::<ScenarioWorld>()
        .expect("world must be ScenarioWorld")
}

/// 事件：Source 启动，解析到对端的路径
struct StartSource {
    app: usize,
}

impl Event for StartSource {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let w = scenario_world(world);
        let app = &w.apps[self.app];
        let Some(peer) = app.peer else {
            return;
        };
        let path = w.resolve_path(app.node, *peer.ip());
        match path {
            Some(path) => {
                debug!(app = self.app, hops = path.len() - 1, "▶️  Source 启动");
                w.paths.insert(self.app, path);
                sim.schedule(sim.now(), SendPacket { app: self.app });
            }
            None => warn!(app = self.app, %peer, "对端不可达，Source 不发送"),
        }
    }
}

/// 事件：Source 发出一个包并安排下一个
struct SendPacket {
    app: usize,
}

impl Event for SendPacket {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let w = scenario_world(world);
        let now = sim.now();
        let app = &w.apps[self.app];
        if !app.window.contains(now) {
            return;
        }
        let (Some(peer), Some(rate), Some(route)) = (app.peer, app.rate, w.paths.get(&self.app))
        else {
            return;
        };

        let tuple = FiveTuple {
            src: *app.local.ip(),
            src_port: app.local.port(),
            dst: *peer.ip(),
            dst_port: peer.port(),
            transport: app.transport,
        };
        let size_bytes = w.packet_size;
        let route = route.clone();
        let from = app.node;
        let interval = rate.tx_time(size_bytes);

        let flow_id = w.monitor.on_tx(tuple, size_bytes, now);
        let pkt = Packet {
            id: w.stack.next_packet_id(),
            flow_id,
            tuple,
            size_bytes,
            sent_at: now,
            route,
            hop: 0,
        };
        trace!(pkt_id = pkt.id, flow_id, "发包");
        w.forward_from(from, pkt, sim);

        sim.schedule(now.saturating_add(interval), SendPacket { app: self.app });
    }
}

/// 事件：包到达某个节点
struct DeliverPacket {
    pkt: Packet,
}

impl Event for DeliverPacket {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let DeliverPacket { pkt } = *self;
        let w = scenario_world(world);
        let Some(at) = pkt.at() else {
            return;
        };
        if pkt.next().is_some() {
            w.forward_from(at, pkt, sim);
            return;
        }

        let now = sim.now();
        if w.sink_active(&pkt.tuple, now) {
            w.monitor.on_rx(pkt.flow_id, pkt.size_bytes, pkt.sent_at, now);
        } else {
            w.monitor.on_drop(pkt.flow_id);
        }
    }
}

/// 一次运行的结果
#[derive(Debug)]
pub struct RunOutcome {
    pub records: Vec<FlowRecord>,
    pub summaries: Vec<FlowSummary>,
    pub aggregate: AggregateSummary,
    pub executed_events: u64,
    pub dropped_at_sink: u64,
    pub finished_at: SimTime,
}

/// 在给定网络栈上运行场景直到 `sim_time`
#[tracing::instrument(skip_all, fields(prefix = %scenario.config.output_prefix))]
pub fn run(scenario: &Scenario, stack: MemoryStack) -> RunOutcome {
    let mut sim = Simulator::default();
    let mut world = ScenarioWorld::new(
        stack,
        scenario.applications.clone(),
        scenario.routes.clone(),
        scenario.config.packet_size,
    );

    for app in scenario.applications.iter().filter(|a| a.is_source()) {
        sim.schedule(app.window.start, StartSource { app: app.id });
    }
    sim.run_until(scenario.config.sim_time, &mut world);

    let dropped_at_sink = world.monitor.dropped();
    let records = world.monitor.into_records();
    let summaries = summarize(&records);
    let aggregate = aggregate(&records);
    info!(
        flows = records.len(),
        dropped_at_sink,
        throughput_kbps = %aggregate.throughput_kbps,
        "📊 运行结束"
    );

    RunOutcome {
        records,
        summaries,
        aggregate,
        executed_events: sim.executed_events(),
        dropped_at_sink,
        finished_at: sim.now(),
    }
}

/// 用配置中的无线参数建立内存网络栈，构建并运行场景
pub fn run_scenario(config: super::ScenarioConfig) -> Result<(Scenario, RunOutcome)> {
    let mut stack = MemoryStack::new(config.radio);
    let scenario = Scenario::build(config, &mut stack)?;
    let outcome = run(&scenario, stack);
    Ok((scenario, outcome))
}
