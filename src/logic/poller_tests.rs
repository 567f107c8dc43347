use super::poller::{SharedState, finish_cycle, merge_outcome, start_cycle};
use crate::model::{AppState, FetchOutcome, PollSnapshot, Settings};
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

fn state_with_servers(servers_text: &str) -> SharedState {
    Arc::new(Mutex::new(AppState {
        settings: Settings {
            servers_text: servers_text.to_string(),
            refresh_seconds: 5,
        },
        ..AppState::default()
    }))
}

/// Serves one connection with a 200 JSON body, optionally after a delay.
async fn spawn_responder(body: &str, delay: Duration) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind responder");
    let addr = listener.local_addr().expect("responder addr");
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    tokio::spawn(async move {
        if let Ok((mut socket, _)) = listener.accept().await {
            let mut request = [0u8; 2048];
            let _ = socket.read(&mut request).await;
            tokio::time::sleep(delay).await;
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });
    // Hosts are entered as `ip:port`, the resolver fills in the rest
    format!("{addr}")
}

async fn wait_for_complete(state: &SharedState) {
    for _ in 0..100 {
        if state.lock().unwrap().snapshot.complete {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("cycle did not complete in time");
}

// --- Merge discipline ---

#[test]
fn test_stale_generation_result_is_dropped() {
    let state = state_with_servers("");
    {
        let mut state_lock = state.lock().unwrap();
        state_lock.latest_generation = 2;
        state_lock.snapshot = PollSnapshot::new(2, 1);
    }

    merge_outcome(&state, 1, 0, FetchOutcome::Ok(json!([{"name": "old"}])));

    let state_lock = state.lock().unwrap();
    assert_eq!(state_lock.snapshot.outcomes, vec![None]);
}

#[test]
fn test_current_generation_result_is_merged() {
    let state = state_with_servers("");
    {
        let mut state_lock = state.lock().unwrap();
        state_lock.latest_generation = 2;
        state_lock.snapshot = PollSnapshot::new(2, 1);
    }

    merge_outcome(&state, 2, 0, FetchOutcome::Failed("http 503".into()));

    let state_lock = state.lock().unwrap();
    assert_eq!(
        state_lock.snapshot.outcomes,
        vec![Some(FetchOutcome::Failed("http 503".into()))]
    );
}

#[test]
fn test_superseded_cycle_emits_no_completion() {
    let state = state_with_servers("");
    {
        let mut state_lock = state.lock().unwrap();
        state_lock.latest_generation = 2;
        state_lock.snapshot = PollSnapshot::new(2, 1);
        state_lock.polling = true;
    }

    finish_cycle(&state, 1);

    let state_lock = state.lock().unwrap();
    assert!(!state_lock.snapshot.complete);
    assert!(state_lock.polling);
    assert!(state_lock.last_updated.is_none());
}

// --- Whole cycles ---

#[tokio::test]
async fn test_empty_target_list_completes_immediately() {
    let state = state_with_servers("# only comments\n\n");

    start_cycle(&state);

    let state_lock = state.lock().unwrap();
    assert_eq!(state_lock.latest_generation, 1);
    assert!(state_lock.snapshot.complete);
    assert!(state_lock.snapshot.outcomes.is_empty());
    assert!(!state_lock.polling);
    assert!(state_lock.last_updated.is_some());
}

#[tokio::test]
async fn test_invalid_host_fails_without_network() {
    let state = state_with_servers("broken|no such host");

    start_cycle(&state);
    wait_for_complete(&state).await;

    let state_lock = state.lock().unwrap();
    assert_eq!(
        state_lock.snapshot.outcomes,
        vec![Some(FetchOutcome::Failed("invalid host".into()))]
    );
    assert!(!state_lock.polling);
}

#[tokio::test]
async fn test_cycle_merges_success_and_failure_per_target() {
    let good = spawn_responder(r#"[{"name":"nginx","status":"running"}]"#, Duration::ZERO).await;
    let state = state_with_servers(&format!("web|{good}\nbad|not a host"));

    start_cycle(&state);
    wait_for_complete(&state).await;

    let state_lock = state.lock().unwrap();
    assert_eq!(state_lock.targets.len(), 2);
    let FetchOutcome::Ok(value) = state_lock.snapshot.outcomes[0].clone().expect("web reported") else {
        panic!("expected web to succeed");
    };
    assert_eq!(value[0]["name"], json!("nginx"));
    assert_eq!(
        state_lock.snapshot.outcomes[1],
        Some(FetchOutcome::Failed("invalid host".into()))
    );
    assert!(state_lock.last_updated.is_some());
}

#[tokio::test]
async fn test_completed_cycle_has_every_slot_reported() {
    let good = spawn_responder("[]", Duration::ZERO).await;
    let state = state_with_servers(&format!("web|{good}\nbad|not a host"));

    start_cycle(&state);
    wait_for_complete(&state).await;

    let state_lock = state.lock().unwrap();
    assert!(state_lock.snapshot.all_reported());
    assert!(state_lock.snapshot.complete);
}

#[tokio::test]
async fn test_new_cycle_discards_stragglers_from_old_one() {
    let slow = spawn_responder(r#"[{"name":"old"}]"#, Duration::from_millis(400)).await;
    let fast = spawn_responder(r#"[{"name":"new"}]"#, Duration::ZERO).await;
    let state = state_with_servers(&format!("host|{slow}"));

    start_cycle(&state);

    // Supersede while the first fetch is still waiting on the slow responder
    state.lock().unwrap().settings.servers_text = format!("host|{fast}");
    start_cycle(&state);
    assert_eq!(state.lock().unwrap().latest_generation, 2);

    // Long enough for the generation-1 straggler to come back and be dropped
    tokio::time::sleep(Duration::from_millis(700)).await;

    let state_lock = state.lock().unwrap();
    assert_eq!(state_lock.snapshot.generation, 2);
    assert!(state_lock.snapshot.complete);
    let FetchOutcome::Ok(value) = state_lock.snapshot.outcomes[0].clone().expect("slot reported") else {
        panic!("expected generation-2 result");
    };
    assert_eq!(value[0]["name"], json!("new"));
}

#[tokio::test]
async fn test_generations_increase_monotonically() {
    let state = state_with_servers("");
    start_cycle(&state);
    start_cycle(&state);
    start_cycle(&state);
    assert_eq!(state.lock().unwrap().latest_generation, 3);
}
