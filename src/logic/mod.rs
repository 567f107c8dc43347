pub mod client;
pub mod endpoint;
pub mod poller;
pub mod targets;

pub use poller::{SharedState, poller_task, start_cycle};
pub use targets::parse_targets;

#[cfg(test)]
mod endpoint_tests;
#[cfg(test)]
mod poller_tests;
