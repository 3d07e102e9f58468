use crate::flow::{FiveTuple, FlowMonitor};
use crate::sim::SimTime;
use crate::traffic::Transport;
use std::net::Ipv4Addr;

fn tuple(src_port: u16) -> FiveTuple {
    FiveTuple {
        src: Ipv4Addr::new(7, 0, 0, 2),
        src_port,
        dst: Ipv4Addr::new(7, 0, 0, 3),
        dst_port: 9000,
        transport: Transport::Tcp,
    }
}

fn ms(v: u64) -> SimTime {
    SimTime::from_millis(v)
}

#[test]
fn flow_ids_follow_first_transmission_order() {
    let mut m = FlowMonitor::default();
    assert_eq!(m.on_tx(tuple(49154), 100, ms(1)), 1);
    assert_eq!(m.on_tx(tuple(49153), 100, ms(2)), 2);
    assert_eq!(m.on_tx(tuple(49154), 100, ms(3)), 1);

    let records = m.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].tx_packets, 2);
    assert_eq!(records[0].tx_bytes, 200);
    assert_eq!(records[0].first_tx_time, ms(1));
    assert_eq!(records[1].tuple, tuple(49153));
}

#[test]
fn rx_accumulates_delay_and_jitter() {
    let mut m = FlowMonitor::default();
    let id = m.on_tx(tuple(49153), 1000, ms(0));
    m.on_tx(tuple(49153), 1000, ms(10));
    m.on_tx(tuple(49153), 1000, ms(20));

    // 时延依次 5ms、8ms、6ms
    m.on_rx(id, 1000, ms(0), ms(5));
    m.on_rx(id, 1000, ms(10), ms(18));
    m.on_rx(id, 1000, ms(20), ms(26));

    let r = &m.records()[0];
    assert_eq!(r.rx_packets, 3);
    assert_eq!(r.rx_bytes, 3000);
    assert_eq!(r.last_rx_time, ms(26));
    assert_eq!(r.delay_sum, ms(19));
    // |8-5| + |6-8|
    assert_eq!(r.jitter_sum, ms(5));
}

#[test]
fn drops_and_unknown_flows_do_not_touch_records() {
    let mut m = FlowMonitor::default();
    let id = m.on_tx(tuple(49153), 1000, ms(0));
    m.on_drop(id);
    m.on_rx(0, 1000, ms(0), ms(1));
    m.on_rx(42, 1000, ms(0), ms(1));
    assert_eq!(m.dropped(), 1);
    let records = m.into_records();
    assert_eq!(records[0].rx_packets, 0);
}
