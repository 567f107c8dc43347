use super::status::{PollSnapshot, Target};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Fraction of the refresh interval each request may spend, so a slow cycle
/// finishes before the next one is due.
const REQUEST_TIMEOUT_MULT: f64 = 0.9;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Raw server list as typed by the user, one target per line:
    /// `name|host`, `name,host` or bare `host`; `#` starts a comment line.
    #[serde(default)]
    pub servers_text: String,
    #[serde(default = "default_refresh_seconds")]
    pub refresh_seconds: u32,
}

impl Settings {
    pub const MIN_REFRESH_SECONDS: u32 = 5;

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_seconds.max(Self::MIN_REFRESH_SECONDS) as u64)
    }

    /// Per-target request budget for one cycle. The status client clamps
    /// this further into its own supported window.
    pub fn request_timeout_ms(&self) -> i64 {
        let seconds = self.refresh_seconds.max(Self::MIN_REFRESH_SECONDS);
        (seconds as f64 * 1000.0 * REQUEST_TIMEOUT_MULT) as i64
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            servers_text: String::new(),
            refresh_seconds: default_refresh_seconds(),
        }
    }
}

fn default_refresh_seconds() -> u32 {
    30
}

/// Shared application state. Only `settings` survives restarts; everything
/// else is rebuilt by the poller.
#[derive(Default, Serialize, Deserialize)]
pub struct AppState {
    #[serde(default)]
    pub settings: Settings,
    /// Targets the current snapshot was started with, index-aligned with
    /// `snapshot.outcomes`.
    #[serde(skip)]
    pub targets: Vec<Target>,
    #[serde(skip)]
    pub snapshot: PollSnapshot,
    #[serde(skip)]
    pub latest_generation: u64,
    #[serde(skip)]
    pub polling: bool,
    #[serde(skip)]
    pub refresh_requested: bool,
    #[serde(skip)]
    pub last_cycle_start: Option<Instant>,
    #[serde(skip)]
    pub last_updated: Option<DateTime<Local>>,
}
