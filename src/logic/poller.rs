use crate::logic::client::{build_client, fetch_status};
use crate::logic::endpoint::resolve;
use crate::logic::targets::parse_targets;
use crate::model::{AppState, FetchOutcome, PollSnapshot};
use chrono::Local;
use futures::future::join_all;
use log::{debug, warn};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

pub type SharedState = Arc<Mutex<AppState>>;

/// Background task that drives the poll cycles.
///
/// Ticks once per second; a cycle starts when the UI asked for a manual
/// refresh, or when the configured refresh interval has elapsed since the
/// last start and no cycle is in flight. A manual refresh supersedes an
/// in-flight cycle — its stragglers are filtered out by generation.
pub async fn poller_task(state: SharedState) {
    let mut interval = tokio::time::interval(Duration::from_secs(1));

    loop {
        interval.tick().await;

        let due = {
            let mut state_lock = state.lock().expect("Failed to lock state in poller loop");
            let manual = std::mem::take(&mut state_lock.refresh_requested);
            let interval_elapsed = state_lock
                .last_cycle_start
                .is_none_or(|started| started.elapsed() >= state_lock.settings.refresh_interval());
            let has_config = !state_lock.settings.servers_text.trim().is_empty();

            manual || (!state_lock.polling && interval_elapsed && has_config)
        };

        if due {
            start_cycle(&state);
        }
    }
}

/// Starts one polling cycle: allocates the next generation, snapshots the
/// current target list, and fans out one fetch task per resolvable target.
///
/// Must run inside a tokio runtime. Targets whose host does not resolve get
/// `invalid host` immediately, without a network call. An empty target list
/// completes on the spot.
pub fn start_cycle(state: &SharedState) {
    let (targets, generation, timeout_ms) = {
        let mut state_lock = state.lock().expect("Failed to lock state to start cycle");
        let targets = parse_targets(&state_lock.settings.servers_text);

        state_lock.latest_generation += 1;
        let generation = state_lock.latest_generation;
        state_lock.targets = targets.clone();
        state_lock.snapshot = PollSnapshot::new(generation, targets.len());
        state_lock.polling = !targets.is_empty();
        state_lock.last_cycle_start = Some(Instant::now());
        if targets.is_empty() {
            state_lock.last_updated = Some(Local::now());
        }

        (targets, generation, state_lock.settings.request_timeout_ms())
    };

    if targets.is_empty() {
        return;
    }
    debug!("cycle {generation}: polling {} targets", targets.len());

    let client = match build_client(timeout_ms) {
        Ok(client) => client,
        Err(e) => {
            // No client means no fetches at all; fail every slot with the
            // builder's text and close the cycle.
            warn!("cycle {generation}: http client unavailable: {e}");
            let message = e.to_string();
            for index in 0..targets.len() {
                merge_outcome(state, generation, index, FetchOutcome::Failed(message.clone()));
            }
            finish_cycle(state, generation);
            return;
        }
    };

    let mut fetches = Vec::new();
    for (index, target) in targets.iter().enumerate() {
        match resolve(&target.host) {
            None => {
                merge_outcome(state, generation, index, FetchOutcome::Failed("invalid host".to_string()));
            }
            Some(endpoint) => {
                let client = client.clone();
                let state = state.clone();
                fetches.push(tokio::spawn(async move {
                    let outcome = fetch_status(&client, &endpoint.url, timeout_ms).await;
                    merge_outcome(&state, generation, index, outcome);
                }));
            }
        }
    }

    // Wait for every fetch, then emit the single completion signal for this
    // cycle (skipped when a newer cycle has taken over in the meantime).
    let state = state.clone();
    tokio::spawn(async move {
        let _res = join_all(fetches).await;
        finish_cycle(&state, generation);
    });
}

/// The only writer into the current snapshot. Results from superseded
/// generations are dropped here, never merged — a slow response from an old
/// cycle must not overwrite fresh data.
pub(crate) fn merge_outcome(state: &SharedState, generation: u64, index: usize, outcome: FetchOutcome) {
    let mut state_lock = state.lock().expect("Failed to lock state to merge outcome");
    if state_lock.latest_generation != generation {
        debug!("cycle {generation}: dropping stale result for target {index}");
        return;
    }
    state_lock.snapshot.record(index, outcome);
}

pub(crate) fn finish_cycle(state: &SharedState, generation: u64) {
    let mut state_lock = state.lock().expect("Failed to lock state to finish cycle");
    if state_lock.latest_generation != generation {
        return;
    }
    if !state_lock.snapshot.all_reported() {
        // A fetch task that died leaves its slot empty; join_all over
        // JoinHandles swallows the panic, so it only shows up here.
        warn!("cycle {generation}: completed with unreported targets");
    }
    state_lock.snapshot.complete = true;
    state_lock.polling = false;
    state_lock.last_updated = Some(Local::now());
}
