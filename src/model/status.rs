use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One user-configured host to poll. Identity is positional (index in the
/// configured list), so duplicate names and hosts are allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub name: String,
    pub host: String,
}

/// Fully qualified request URL derived from a target's raw host string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEndpoint {
    pub url: String,
    pub source_host: String,
}

/// One container row as reported by the remote status agent. Fields are
/// pass-through; a record that does not decode renders as placeholders
/// instead of failing the whole host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub uptime: String,
    #[serde(default)]
    pub cpu: f64,
    #[serde(default)]
    pub mem: f64,
    #[serde(default)]
    pub restarts: i64,
    #[serde(default)]
    pub health: String,
    #[serde(default)]
    pub health_class: Option<String>,
}

impl ContainerRecord {
    pub fn from_value(value: &Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_default()
    }

    /// Class the original widget keys its colors on: the agent may send a
    /// separate `health_class`, otherwise the health text itself.
    pub fn health_key(&self) -> &str {
        self.health_class.as_deref().unwrap_or(&self.health)
    }
}

/// Result of querying one target once. The success payload is the raw
/// decoded JSON; whether it is actually an array of records is decided by
/// the consumer.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Ok(Value),
    Failed(String),
}

/// Per-target result state of one polling cycle. `outcomes` has one slot per
/// target index; slots fill in arbitrary order as fetches report back.
/// A snapshot whose generation has been superseded is never written again.
#[derive(Debug, Clone, Default)]
pub struct PollSnapshot {
    pub generation: u64,
    pub outcomes: Vec<Option<FetchOutcome>>,
    pub complete: bool,
}

impl PollSnapshot {
    pub fn new(generation: u64, target_count: usize) -> Self {
        Self {
            generation,
            outcomes: vec![None; target_count],
            // Nothing to wait for
            complete: target_count == 0,
        }
    }

    pub fn record(&mut self, index: usize, outcome: FetchOutcome) {
        if let Some(slot) = self.outcomes.get_mut(index) {
            *slot = Some(outcome);
        }
    }

    pub fn all_reported(&self) -> bool {
        self.outcomes.iter().all(Option::is_some)
    }
}
