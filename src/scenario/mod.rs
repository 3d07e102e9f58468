//! 场景：配置、构建、运行与报告

mod builder;
mod config;
mod presets;
mod report;
mod runner;

pub use builder::Scenario;
pub use config::{
    AddressPlan, FILE_TRANSFER_CLASS, MobilitySettings, ReferenceParams, ScenarioConfig,
    SegmentSpec, VIDEO_CLASS, default_traffic,
};
pub use presets::presets;
pub use report::{address_report, write_reports};
pub use runner::{RunOutcome, ScenarioWorld, run, run_scenario};
