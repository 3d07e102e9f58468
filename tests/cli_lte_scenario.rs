use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "ltesim-rs-{prefix}-{}-{nanos}",
        std::process::id()
    ));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn run(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_lte_scenario"))
        .args(args)
        .output()
        .expect("run lte_scenario")
}

#[test]
fn lte_scenario_writes_reports_and_json_summary() {
    let dir = unique_temp_dir("scenario-json");
    let output = run(&[
        "--sim-time",
        "4s",
        "--output-prefix",
        "cli",
        "--out-dir",
        dir.to_str().unwrap(),
        "--json",
    ]);
    assert!(
        output.status.success(),
        "lte_scenario failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    let v: Value = serde_json::from_str(stdout.trim()).expect("stdout must be JSON");
    assert_eq!(v["prefix"], "cli");
    let flows = v["flows"].as_array().expect("flows array");
    // 两条文件互传流 + 三条视频流
    assert_eq!(flows.len(), 5);
    assert_eq!(flows[0]["flow_id"], 1);

    for name in ["cli-addresses.txt", "cli-flows.txt", "cli-flows.json", "cli-flow-1.txt", "cli-flow-5.txt"] {
        assert!(dir.join(name).exists(), "missing {name}");
    }
    let addresses = fs::read_to_string(dir.join("cli-addresses.txt")).expect("read addresses");
    assert!(addresses.contains("attach device=ue1 address=7.0.0.3 station=enb1"));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn lte_scenario_overrides_rates_and_device_count() {
    let dir = unique_temp_dir("scenario-overrides");
    let output = run(&[
        "--sim-time",
        "4s",
        "--num-devices",
        "3",
        "--backbone-speed",
        "1Gbps",
        "--backbone-delay",
        "50ms",
        "--video-data-rate",
        "2Mbps",
        "--output-prefix",
        "ovr",
        "--out-dir",
        dir.to_str().unwrap(),
        "--json",
    ]);
    assert!(
        output.status.success(),
        "lte_scenario failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    let v: Value = serde_json::from_str(String::from_utf8_lossy(&output.stdout).trim())
        .expect("stdout must be JSON");
    let flows = v["flows"].as_array().expect("flows array");
    assert_eq!(flows.len(), 3);

    // 视频流时延 = backbone 50ms + 无线 2ms
    let delay = flows[2]["mean_delay_ms"].as_f64().expect("delay available");
    assert!((52.0..52.5).contains(&delay), "delay={delay}");

    let addresses = fs::read_to_string(dir.join("ovr-addresses.txt")).expect("read addresses");
    assert!(addresses.contains("rate=1Gbps delay=50ms"));
    assert!(addresses.contains("class=video role=source"));
    assert!(addresses.contains("rate=2Mbps"));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn lte_scenario_reads_config_file() {
    let dir = unique_temp_dir("scenario-config");
    let config = dir.join("scenario.json");
    fs::write(
        &config,
        r#"{
            "output_prefix": "from-file",
            "sim_time": "3500ms",
            "num_devices": 2,
            "traffic": { "classes": [ {
                "name": "upload",
                "kind": "asymmetric",
                "direction": "uplink",
                "devices": [0, 1],
                "transport": "udp",
                "rate": "1Mbps",
                "window": { "start": "2s", "stop": "3s" }
            } ] }
        }"#,
    )
    .expect("write config");

    let output = run(&[
        "--config",
        config.to_str().unwrap(),
        "--out-dir",
        dir.to_str().unwrap(),
    ]);
    assert!(
        output.status.success(),
        "lte_scenario failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    let flow_lines: Vec<&str> = stdout.lines().filter(|l| l.starts_with("flow ")).collect();
    assert_eq!(flow_lines.len(), 2);
    assert!(flow_lines[0].contains("-> 1.0.0.2:9000"), "{}", flow_lines[0]);
    assert!(dir.join("from-file-flows.txt").exists());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn lte_scenario_rejects_invalid_inputs() {
    let bad_rate = run(&["--backbone-speed", "fast"]);
    assert!(!bad_rate.status.success());

    let dir = unique_temp_dir("scenario-invalid");
    let bad_config = run(&[
        "--sim-time",
        "0s",
        "--out-dir",
        dir.to_str().unwrap(),
    ]);
    assert!(!bad_config.status.success());
    assert!(String::from_utf8_lossy(&bad_config.stderr).contains("simulation time must be positive"));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn lte_scenario_warns_about_rates_for_missing_classes() {
    let dir = unique_temp_dir("scenario-missing-class");
    // 只有一个终端时没有文件互传业务
    let output = Command::new(env!("CARGO_BIN_EXE_lte_scenario"))
        .env("RUST_LOG", "warn")
        .args([
            "--num-devices",
            "1",
            "--ues-data-rate",
            "1Mbps",
            "--sim-time",
            "4s",
            "--out-dir",
            dir.to_str().unwrap(),
            "--json",
        ])
        .output()
        .expect("run lte_scenario");
    assert!(
        output.status.success(),
        "lte_scenario failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--ues-data-rate"), "stderr={stderr}");
    let v: Value = serde_json::from_str(String::from_utf8_lossy(&output.stdout).trim())
        .expect("stdout must be JSON");
    assert_eq!(v["flows"].as_array().expect("flows array").len(), 1);

    let _ = fs::remove_dir_all(&dir);
}
