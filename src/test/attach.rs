use super::built_topology;
use crate::attach::{Attachment, attach_devices, install_routes, plan_attachments};
use crate::error::ScenarioError;
use crate::net::{Ipv4Prefix, NodeId, RouteKind, RoutingTable};
use crate::stack::{ChannelKind, NetworkStack};
use crate::topo::DEVICE_SEGMENT;
use std::collections::BTreeMap;
use std::net::Ipv4Addr;

fn ids(range: std::ops::Range<usize>) -> Vec<NodeId> {
    range.map(NodeId).collect()
}

#[test]
fn round_robin_assigns_device_i_to_station_i_mod_b() {
    let devices = ids(10..15);
    let stations = ids(0..2);
    let plan = plan_attachments(&devices, &stations).unwrap();

    let mut per_station: BTreeMap<NodeId, Vec<NodeId>> = BTreeMap::new();
    for a in &plan {
        per_station.entry(a.station).or_default().push(a.device);
    }
    assert_eq!(per_station[&NodeId(0)], vec![NodeId(10), NodeId(12), NodeId(14)]);
    assert_eq!(per_station[&NodeId(1)], vec![NodeId(11), NodeId(13)]);
}

#[test]
fn round_robin_is_balanced_and_total() {
    for (b, n) in [(1, 4), (3, 7), (4, 4), (5, 2)] {
        let devices = ids(100..100 + n);
        let stations = ids(0..b);
        let plan = plan_attachments(&devices, &stations).unwrap();
        assert_eq!(plan.len(), n);

        let mut load = vec![0usize; b];
        for a in &plan {
            load[a.station.0] += 1;
        }
        let max = *load.iter().max().unwrap();
        let min = *load.iter().min().unwrap();
        assert!(max - min <= 1, "unbalanced load {load:?} for B={b} N={n}");
    }
}

#[test]
fn no_stations_is_an_error() {
    let err = plan_attachments(&ids(0..3), &[]).unwrap_err();
    assert!(matches!(err, ScenarioError::NoBaseStationsAvailable));
}

#[test]
fn attach_devices_assigns_addresses_in_device_order() {
    let (mut topo, mut b, mut stack) = built_topology(2, 3, 1);
    let gw = topo.gateway().unwrap();
    topo.assign_interface(gw, &mut b.alloc, &b.device, &mut stack)
        .unwrap();

    let devices = topo.devices();
    let mut plan = plan_attachments(&devices, &topo.base_stations()).unwrap();
    // 输入顺序不影响地址分配顺序
    plan.reverse();
    attach_devices(&mut topo, &plan, &mut b.alloc, &b.device, &mut stack).unwrap();

    for (i, &d) in devices.iter().enumerate() {
        assert_eq!(
            topo.address_of(d, DEVICE_SEGMENT),
            Some(Ipv4Addr::new(7, 0, 0, 2 + i as u8))
        );
    }
    assert_eq!(stack.serving_station(devices[0]), Some(NodeId(4)));
    assert_eq!(stack.serving_station(devices[1]), Some(NodeId(5)));
    assert_eq!(stack.serving_station(devices[2]), Some(NodeId(4)));
    let radio = stack
        .channels()
        .iter()
        .filter(|c| c.kind == ChannelKind::Radio)
        .count();
    assert_eq!(radio, 2 * devices.len());
}

#[test]
fn reattaching_a_device_fails_in_the_stack() {
    let (mut topo, mut b, mut stack) = built_topology(2, 1, 1);
    let device = topo.devices()[0];
    let plan = vec![Attachment {
        device,
        station: NodeId(4),
    }];
    attach_devices(&mut topo, &plan, &mut b.alloc, &b.device, &mut stack).unwrap();
    let err = stack.attach_device(device, NodeId(5)).unwrap_err();
    assert!(err.0.contains("already attached"));
}

#[test]
fn routes_point_at_gateway_and_are_idempotent() {
    let (mut topo, mut b, mut stack) = built_topology(2, 5, 1);
    let gw = topo.gateway().unwrap();
    let gw_device = topo
        .assign_interface(gw, &mut b.alloc, &b.device, &mut stack)
        .unwrap();
    let plan = plan_attachments(&topo.devices(), &topo.base_stations()).unwrap();
    attach_devices(&mut topo, &plan, &mut b.alloc, &b.device, &mut stack).unwrap();

    let mut routes = RoutingTable::default();
    install_routes(&topo, &b.device, &mut routes).unwrap();
    let snapshot = routes.clone();
    install_routes(&topo, &b.device, &mut routes).unwrap();
    assert_eq!(routes, snapshot);
    assert_eq!(routes.len(), 5 + 1);

    for d in topo.devices() {
        assert_eq!(routes.default_gateway(d), Some(gw_device));
    }
    let remote = topo.remote_hosts()[0];
    let entry = routes.entries_for(remote).next().unwrap();
    assert_eq!(entry.kind, RouteKind::Static);
    assert_eq!(entry.destination, Ipv4Prefix::new(Ipv4Addr::new(7, 0, 0, 0), 8));
    assert_eq!(entry.next_hop, Ipv4Addr::new(1, 0, 0, 1));
}

#[test]
fn routes_require_gateway_device_address() {
    let (topo, b, _) = built_topology(1, 1, 1);
    let mut routes = RoutingTable::default();
    let err = install_routes(&topo, &b.device, &mut routes).unwrap_err();
    assert!(matches!(err, ScenarioError::UnknownSegment(ref s) if s == DEVICE_SEGMENT));
    assert!(routes.is_empty());
}
