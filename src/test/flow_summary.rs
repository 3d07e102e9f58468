use crate::flow::{FiveTuple, FlowRecord, Metric, aggregate, summarize};
use crate::sim::SimTime;
use crate::traffic::Transport;
use std::net::Ipv4Addr;

fn tuple(dst_port: u16) -> FiveTuple {
    FiveTuple {
        src: Ipv4Addr::new(1, 0, 0, 2),
        src_port: 49153,
        dst: Ipv4Addr::new(7, 0, 0, 4),
        dst_port,
        transport: Transport::Udp,
    }
}

fn record(flow_id: u64, tx: u64, rx: u64) -> FlowRecord {
    let mut r = FlowRecord::new(flow_id, tuple(9000 + flow_id as u16));
    r.tx_packets = tx;
    r.tx_bytes = tx * 1000;
    r.rx_packets = rx;
    r.rx_bytes = rx * 1000;
    r
}

fn assert_close(metric: Metric, expected: f64) {
    let v = metric.get().expect("metric should be available");
    assert!((v - expected).abs() < 1e-3, "got {v}, expected {expected}");
}

fn sample() -> FlowRecord {
    let mut r = record(1, 100, 95);
    r.first_tx_time = SimTime::from_secs(1);
    r.last_rx_time = SimTime::from_secs(9);
    r.delay_sum = SimTime::from_millis(950);
    r.jitter_sum = SimTime::from_millis(940);
    r
}

#[test]
fn summary_of_typical_flow() {
    let s = &summarize(&[sample()])[0];
    assert_eq!(s.lost_packets, 5);
    assert!(!s.counter_inconsistent);
    assert_close(s.packet_loss_percent, 5.0);
    assert_close(s.throughput_kbps, 95000.0 * 8.0 / 8.0 / 1024.0);
    assert_close(s.mean_delay_ms, 10.0);
    // jitterSum / (rx - 1) = 940 / 94
    assert_close(s.mean_jitter_ms, 10.0);
}

#[test]
fn jitter_divides_by_rx_minus_one() {
    let mut r = sample();
    r.jitter_sum = SimTime::from_millis(939);
    let s = &summarize(&[r])[0];
    assert_close(s.mean_jitter_ms, 9.989);
}

#[test]
fn flow_that_never_sent_reports_not_available() {
    let s = &summarize(&[record(1, 0, 0)])[0];
    assert_eq!(s.lost_packets, 0);
    assert_eq!(s.packet_loss_percent, Metric::NA);
    assert_eq!(s.throughput_kbps, Metric::NA);
    assert_eq!(s.mean_delay_ms, Metric::NA);
    assert_eq!(s.mean_jitter_ms, Metric::NA);
    assert_eq!(s.packet_loss_percent.to_string(), "N/A");
}

#[test]
fn flow_with_nothing_received_has_full_loss() {
    let mut r = record(1, 10, 0);
    r.first_tx_time = SimTime::from_secs(2);
    let s = &summarize(&[r])[0];
    assert_close(s.packet_loss_percent, 100.0);
    assert_eq!(s.throughput_kbps, Metric::NA);
    assert_eq!(s.mean_delay_ms, Metric::NA);
    assert_eq!(s.mean_jitter_ms, Metric::NA);
}

#[test]
fn single_received_packet_has_delay_but_no_jitter() {
    let mut r = record(1, 1, 1);
    r.first_tx_time = SimTime::from_secs(2);
    r.last_rx_time = SimTime::from_secs(2).saturating_add(SimTime::from_millis(7));
    r.delay_sum = SimTime::from_millis(7);
    let s = &summarize(&[r])[0];
    assert_close(s.mean_delay_ms, 7.0);
    assert_eq!(s.mean_jitter_ms, Metric::NA);
    assert!(s.throughput_kbps.is_available());
}

#[test]
fn zero_span_throughput_is_not_available() {
    let mut r = record(1, 1, 1);
    r.first_tx_time = SimTime::from_secs(3);
    r.last_rx_time = SimTime::from_secs(3);
    let s = &summarize(&[r])[0];
    assert_eq!(s.throughput_kbps, Metric::NA);
}

#[test]
fn loss_is_exact_at_counter_extremes() {
    let mut all_lost = FlowRecord::new(1, tuple(9000));
    all_lost.tx_packets = u64::MAX;
    let s = &summarize(&[all_lost])[0];
    assert_eq!(s.lost_packets, i128::from(u64::MAX));
    assert!(!s.counter_inconsistent);
    assert_close(s.packet_loss_percent, 100.0);

    let mut overcounted = FlowRecord::new(2, tuple(9001));
    overcounted.rx_packets = u64::MAX;
    let s = &summarize(&[overcounted])[0];
    assert_eq!(s.lost_packets, -i128::from(u64::MAX));
    assert!(s.counter_inconsistent);
}

#[test]
fn inconsistent_counters_are_flagged_and_excluded() {
    let bad = record(2, 5, 7);
    let s = &summarize(&[bad.clone()])[0];
    assert!(s.counter_inconsistent);
    assert_eq!(s.lost_packets, -2);
    assert_eq!(s.packet_loss_percent, Metric::NA);

    let agg = aggregate(&[sample(), bad]);
    assert_eq!(agg.flows, 2);
    assert_eq!(agg.inconsistent_flows, 1);
    assert_eq!(agg.tx_packets, 100);
    assert_eq!(agg.rx_packets, 95);
    assert_eq!(agg.lost_packets, 5);
    assert_close(agg.packet_loss_percent, 5.0);
    assert_close(agg.throughput_kbps, 92.773);
}

#[test]
fn aggregate_of_nothing_is_not_available() {
    let agg = aggregate(&[]);
    assert_eq!(agg.flows, 0);
    assert_eq!(agg.packet_loss_percent, Metric::NA);
    assert_eq!(agg.throughput_kbps, Metric::NA);
    assert_eq!(agg.mean_delay_ms, Metric::NA);
}

#[test]
fn metric_rejects_non_finite_values_and_serializes_na() {
    assert_eq!(Metric::value(f64::NAN), Metric::NA);
    assert_eq!(Metric::value(f64::INFINITY), Metric::NA);
    assert_eq!(Metric::value(1.23456).to_string(), "1.235");
    assert_eq!(serde_json::to_string(&Metric::NA).unwrap(), "\"N/A\"");
    assert_eq!(serde_json::to_string(&Metric::value(2.5)).unwrap(), "2.5");
}
