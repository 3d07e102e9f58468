//! 流统计
//!
//! 运行期间 [`FlowMonitor`] 把逐包的发送/接收事件归约成 [`FlowRecord`]；
//! 运行结束后 [`summarize`] 把记录换算成吞吐、时延、抖动与丢包率。

mod monitor;
mod record;
mod report;
mod summary;

pub use monitor::FlowMonitor;
pub use record::{FiveTuple, FlowRecord};
pub use report::{write_combined_report, write_flow_reports, write_json_report};
pub use summary::{AggregateSummary, FlowSummary, Metric, aggregate, summarize};
