use super::app::{AppRole, Application};
use super::plan::{ClassKind, Direction, TrafficClass, TrafficPlan, Window};
use crate::error::{Result, ScenarioError};
use crate::net::NodeId;
use crate::sim::SimTime;
use crate::topo::{BACKBONE_SEGMENT, DEVICE_SEGMENT, Topology};
use std::collections::HashSet;
use std::net::{Ipv4Addr, SocketAddrV4};
use tracing::{debug, info, warn};

/// Sink 必须至少提前这么久启动、推迟这么久停止
pub const MIN_SINK_GUARD: SimTime = SimTime(1_000_000_000);

/// Source 本地端口从这里开始分配
pub const EPHEMERAL_PORT_BASE: u16 = 49153;

/// 业务调度器
///
/// 端口从同一个计数器中取，不同业务类之间不会复用端口。
#[derive(Debug)]
pub struct TrafficScheduler {
    next_port: u16,
    next_ephemeral: u16,
    guard: SimTime,
}

impl TrafficScheduler {
    /// `port_base` 为第一个服务端口；`guard` 为自动推导 Sink 时间窗时两端的余量。
    pub fn new(port_base: u16, guard: SimTime) -> Result<Self> {
        if port_base == 0 || port_base >= EPHEMERAL_PORT_BASE {
            return Err(ScenarioError::InvalidConfig(format!(
                "port base {port_base} must be within 1..{EPHEMERAL_PORT_BASE}"
            )));
        }
        if guard < MIN_SINK_GUARD {
            return Err(ScenarioError::InvalidConfig(format!(
                "sink guard {guard} is shorter than the minimum {MIN_SINK_GUARD}"
            )));
        }
        Ok(Self {
            next_port: port_base,
            next_ephemeral: EPHEMERAL_PORT_BASE,
            guard,
        })
    }

    /// 展开整个流量计划
    #[tracing::instrument(skip_all, fields(classes = plan.classes.len()))]
    pub fn schedule_flows(&mut self, plan: &TrafficPlan, topo: &Topology) -> Result<Vec<Application>> {
        let mut apps = Vec::new();
        for class in &plan.classes {
            let before = apps.len();
            self.schedule_class(class, topo, &mut apps)?;
            info!(
                class = %class.name,
                apps = apps.len() - before,
                "🗓️  业务类调度完成"
            );
        }
        Ok(apps)
    }

    fn schedule_class(
        &mut self,
        class: &TrafficClass,
        topo: &Topology,
        apps: &mut Vec<Application>,
    ) -> Result<()> {
        if class.rate.bps() == 0 {
            return Err(ScenarioError::InvalidConfig(format!(
                "rate of traffic class `{}` must be positive",
                class.name
            )));
        }
        let sink_window = self.sink_window(class)?;
        let devices = resolve_devices(class, topo)?;
        if devices.is_empty() {
            warn!(class = %class.name, "业务类没有参与终端");
            return Ok(());
        }

        match class.kind {
            ClassKind::Symmetric => {
                let n = devices.len();
                if n % 2 == 1 {
                    warn!(
                        class = %class.name,
                        device = %devices[n / 2].0,
                        "奇数个终端，中间的终端没有配对对象"
                    );
                }
                for i in 0..n / 2 {
                    let (a, a_addr) = devices[i];
                    let (b, b_addr) = devices[n - 1 - i];
                    let port = self.take_port()?;
                    let sink_a = Self::push_sink(apps, class, sink_window, a, a_addr, port);
                    let sink_b = Self::push_sink(apps, class, sink_window, b, b_addr, port);
                    self.push_source(apps, class, a, a_addr, SocketAddrV4::new(b_addr, port), sink_b)?;
                    self.push_source(apps, class, b, b_addr, SocketAddrV4::new(a_addr, port), sink_a)?;
                }
            }
            ClassKind::Asymmetric { direction } => {
                let (remote, remote_addr) = remote_host(class, topo)?;
                for &(device, device_addr) in &devices {
                    let port = self.take_port()?;
                    let ((src, src_addr), (dst, dst_addr)) = match direction {
                        Direction::Downlink => ((remote, remote_addr), (device, device_addr)),
                        Direction::Uplink => ((device, device_addr), (remote, remote_addr)),
                    };
                    let sink = Self::push_sink(apps, class, sink_window, dst, dst_addr, port);
                    self.push_source(apps, class, src, src_addr, SocketAddrV4::new(dst_addr, port), sink)?;
                }
            }
        }
        Ok(())
    }

    /// Sink 时间窗：显式给出时校验，否则由 Source 时间窗两端各加 guard 得到。
    /// 不生成 Sink 时只校验 Source 时间窗。
    fn sink_window(&self, class: &TrafficClass) -> Result<Option<Window>> {
        let invalid = |reason: String| ScenarioError::InvalidSchedulingWindow {
            class: class.name.clone(),
            reason,
        };
        let src = class.window;
        if src.start >= src.stop {
            return Err(invalid(format!(
                "source window [{}, {}) is empty",
                src.start, src.stop
            )));
        }
        if !class.sinks {
            return Ok(None);
        }

        let sink = match class.sink_window {
            Some(w) => w,
            None => {
                let start = src.start.checked_sub(self.guard).ok_or_else(|| {
                    invalid(format!(
                        "sources start at {} which leaves no room for sinks to start {} earlier",
                        src.start, self.guard
                    ))
                })?;
                let stop = src.stop.checked_add(self.guard).ok_or_else(|| {
                    invalid(format!(
                        "sources stop at {} which leaves no room for sinks to stop {} later",
                        src.stop, self.guard
                    ))
                })?;
                Window::new(start, stop)
            }
        };
        validate_sink_window(src, sink).map_err(invalid)?;
        Ok(Some(sink))
    }

    fn take_port(&mut self) -> Result<u16> {
        let port = self.next_port;
        if port >= EPHEMERAL_PORT_BASE {
            return Err(ScenarioError::InvalidConfig(
                "service ports exhausted before the ephemeral range".into(),
            ));
        }
        self.next_port += 1;
        Ok(port)
    }

    fn take_ephemeral(&mut self) -> Result<u16> {
        let port = self.next_ephemeral;
        self.next_ephemeral = self.next_ephemeral.checked_add(1).ok_or_else(|| {
            ScenarioError::InvalidConfig("ephemeral ports exhausted".into())
        })?;
        Ok(port)
    }

    fn push_sink(
        apps: &mut Vec<Application>,
        class: &TrafficClass,
        window: Option<Window>,
        node: NodeId,
        addr: Ipv4Addr,
        port: u16,
    ) -> Option<usize> {
        let window = window?;
        let id = apps.len();
        apps.push(Application {
            id,
            class: class.name.clone(),
            role: AppRole::Sink,
            node,
            transport: class.transport,
            local: SocketAddrV4::new(addr, port),
            peer: None,
            rate: None,
            window,
            sink: None,
        });
        debug!(id, %node, port, "安装 Sink");
        Some(id)
    }

    fn push_source(
        &mut self,
        apps: &mut Vec<Application>,
        class: &TrafficClass,
        node: NodeId,
        addr: Ipv4Addr,
        peer: SocketAddrV4,
        sink: Option<usize>,
    ) -> Result<()> {
        let id = apps.len();
        let local = SocketAddrV4::new(addr, self.take_ephemeral()?);
        apps.push(Application {
            id,
            class: class.name.clone(),
            role: AppRole::Source,
            node,
            transport: class.transport,
            local,
            peer: Some(peer),
            rate: Some(class.rate),
            window: class.window,
            sink,
        });
        debug!(id, %node, %peer, rate = %class.rate, "安装 Source");
        Ok(())
    }
}

/// Sink 必须在 Source 之前至少 [`MIN_SINK_GUARD`] 启动，并在其之后至少同样久停止。
pub(crate) fn validate_sink_window(source: Window, sink: Window) -> std::result::Result<(), String> {
    if sink.start >= sink.stop {
        return Err(format!("sink window [{}, {}) is empty", sink.start, sink.stop));
    }
    if sink.start.checked_add(MIN_SINK_GUARD).is_none_or(|t| t > source.start) {
        return Err(format!(
            "sink starts at {} but must start at least {} before its source ({})",
            sink.start, MIN_SINK_GUARD, source.start
        ));
    }
    if source.stop.checked_add(MIN_SINK_GUARD).is_none_or(|t| t > sink.stop) {
        return Err(format!(
            "sink stops at {} but must stop at least {} after its source ({})",
            sink.stop, MIN_SINK_GUARD, source.stop
        ));
    }
    Ok(())
}

/// 业务类终端下标 -> (节点, device 网段地址)
fn resolve_devices(class: &TrafficClass, topo: &Topology) -> Result<Vec<(NodeId, Ipv4Addr)>> {
    let all = topo.devices();
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(class.devices.len());
    for &index in &class.devices {
        if !seen.insert(index) {
            return Err(ScenarioError::InvalidConfig(format!(
                "traffic class `{}` lists device {index} twice",
                class.name
            )));
        }
        let node = *all.get(index).ok_or_else(|| ScenarioError::UnknownDevice {
            class: class.name.clone(),
            index,
            count: all.len(),
        })?;
        let addr = topo
            .address_of(node, DEVICE_SEGMENT)
            .ok_or_else(|| ScenarioError::UnknownSegment(DEVICE_SEGMENT.to_string()))?;
        out.push((node, addr));
    }
    Ok(out)
}

fn remote_host(class: &TrafficClass, topo: &Topology) -> Result<(NodeId, Ipv4Addr)> {
    let hosts = topo.remote_hosts();
    let node = *hosts.get(class.remote_host).ok_or_else(|| {
        ScenarioError::InvalidConfig(format!(
            "traffic class `{}` uses remote host {}, but only {} exist",
            class.name,
            class.remote_host,
            hosts.len()
        ))
    })?;
    let addr = topo
        .address_of(node, BACKBONE_SEGMENT)
        .ok_or_else(|| ScenarioError::UnknownSegment(BACKBONE_SEGMENT.to_string()))?;
    Ok((node, addr))
}
