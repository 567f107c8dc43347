pub mod app_state;
pub mod status;

pub use app_state::{AppState, Settings};
pub use status::{ContainerRecord, FetchOutcome, PollSnapshot, ResolvedEndpoint, Target};
