use crate::net::DataRate;
use crate::sim::SimTime;

#[test]
fn data_rate_parses_unit_suffixes() {
    assert_eq!("10Gbps".parse::<DataRate>().unwrap(), DataRate(10_000_000_000));
    assert_eq!("5Mbps".parse::<DataRate>().unwrap(), DataRate::from_mbps(5));
    assert_eq!("500Kbps".parse::<DataRate>().unwrap(), DataRate(500_000));
    assert_eq!("1.5mbps".parse::<DataRate>().unwrap(), DataRate(1_500_000));
    assert_eq!("64bps".parse::<DataRate>().unwrap(), DataRate(64));
    assert!("10".parse::<DataRate>().is_err());
    assert!("10Tbps".parse::<DataRate>().is_err());
}

#[test]
fn data_rate_display_picks_exact_unit() {
    assert_eq!(DataRate(10_000_000_000).to_string(), "10Gbps");
    assert_eq!(DataRate(500_000).to_string(), "500Kbps");
    assert_eq!(DataRate(1_500_000).to_string(), "1500Kbps");
    assert_eq!(DataRate(7).to_string(), "7bps");
    assert_eq!(DataRate(0).to_string(), "0bps");
}

#[test]
fn data_rate_tx_time_rounds_up() {
    // 1024 B @ 5Mbps = 8192 bit / 5e6 = 1.6384ms
    assert_eq!(DataRate::from_mbps(5).tx_time(1024), SimTime(1_638_400));
    // 1 B @ 3bps = 8/3 s，向上取整
    assert_eq!(DataRate(3).tx_time(1), SimTime(2_666_666_667));
}

#[test]
fn data_rate_serde_uses_strings() {
    assert_eq!(serde_json::to_string(&DataRate::from_mbps(150)).unwrap(), "\"150Mbps\"");
    let r: DataRate = serde_json::from_str("\"20Gbps\"").unwrap();
    assert_eq!(r, DataRate(20_000_000_000));
}
