//! 地址/接入报告与整体报告写出
//!
//! 地址报告一行一个事实：节点、链路、接入、路由、应用。

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use super::builder::Scenario;
use super::runner::RunOutcome;
use crate::error::Result;
use crate::flow::{write_combined_report, write_flow_reports, write_json_report};
use crate::mobility::MobilityPolicy;
use crate::net::{NodeId, RouteKind};
use crate::topo::DEVICE_SEGMENT;
use tracing::info;

fn node_name(scenario: &Scenario, id: NodeId) -> &str {
    scenario
        .topology
        .node(id)
        .map(|n| n.name.as_str())
        .unwrap_or("?")
}

/// 渲染地址/接入报告
pub fn address_report(scenario: &Scenario) -> String {
    let mut out = String::new();
    let topo = &scenario.topology;

    let blocks = [topo.backbone_block(), topo.backhaul_block(), Some(&scenario.device_block)];
    for block in blocks.into_iter().flatten() {
        let _ = writeln!(out, "segment name={} prefix={}", block.segment, block.prefix);
    }

    for node in topo.nodes() {
        let addrs: Vec<String> = node
            .interfaces
            .iter()
            .map(|i| format!("{}:{}/{}", i.segment, i.address, i.prefix_len))
            .collect();
        let mobility = match node.mobility {
            Some(MobilityPolicy::Static { position }) => {
                format!("static({:.1},{:.1})", position.x, position.y)
            }
            Some(MobilityPolicy::RandomWalk { bounds }) => format!(
                "random_walk({:.1}x{:.1},speed={:.1})",
                bounds.width, bounds.height, bounds.speed
            ),
            None => "none".to_string(),
        };
        let _ = writeln!(
            out,
            "node id={} role={} name={} addresses={} mobility={}",
            node.id.0,
            node.role,
            node.name,
            if addrs.is_empty() { "-".to_string() } else { addrs.join(",") },
            mobility
        );
    }

    for link in topo.links() {
        let _ = writeln!(
            out,
            "link id={} kind={} {}={} {}={} rate={} delay={}",
            link.id.0,
            link.kind.as_str(),
            node_name(scenario, link.a),
            link.a_addr,
            node_name(scenario, link.b),
            link.b_addr,
            link.profile.rate,
            link.profile.delay
        );
    }

    for att in &scenario.attachments {
        let address = topo
            .address_of(att.device, DEVICE_SEGMENT)
            .map(|a| a.to_string())
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "attach device={} address={} station={}",
            node_name(scenario, att.device),
            address,
            node_name(scenario, att.station)
        );
    }

    for route in scenario.routes.entries() {
        let kind = match route.kind {
            RouteKind::Default => "default",
            RouteKind::Static => "static",
        };
        let _ = writeln!(
            out,
            "route node={} kind={} dst={} via={}",
            node_name(scenario, route.node),
            kind,
            route.destination,
            route.next_hop
        );
    }

    for app in &scenario.applications {
        let peer = app.peer.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string());
        let rate = app.rate.map(|r| r.to_string()).unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "app id={} class={} role={} node={} transport={} local={} peer={} rate={} window=[{},{})",
            app.id,
            app.class,
            if app.is_source() { "source" } else { "sink" },
            node_name(scenario, app.node),
            app.transport,
            app.local,
            peer,
            rate,
            app.window.start,
            app.window.stop
        );
    }
    out
}

/// 写出地址报告与全部流报告，返回写出的文件
pub fn write_reports(dir: &Path, scenario: &Scenario, outcome: &RunOutcome) -> Result<Vec<PathBuf>> {
    let prefix = scenario.config.output_prefix.as_str();
    fs::create_dir_all(dir)?;

    let mut written = Vec::new();
    let addresses = dir.join(format!("{prefix}-addresses.txt"));
    fs::write(&addresses, address_report(scenario))?;
    written.push(addresses);

    written.extend(write_flow_reports(dir, prefix, &outcome.summaries)?);
    written.push(write_combined_report(dir, prefix, &outcome.summaries, &outcome.aggregate)?);
    written.push(write_json_report(dir, prefix, &outcome.summaries, &outcome.aggregate)?);

    info!(dir = %dir.display(), files = written.len(), "📝 报告写出完成");
    Ok(written)
}
