pub mod attach;
pub mod error;
pub mod flow;
pub mod mobility;
pub mod net;
pub mod scenario;
pub mod sim;
pub mod stack;
pub mod topo;
pub mod traffic;

pub use error::{Result, ScenarioError, StackError};

#[cfg(test)]
mod test;
