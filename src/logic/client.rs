use crate::model::FetchOutcome;
use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use std::time::Duration;

pub const MIN_TIMEOUT_MS: i64 = 1_000;
pub const MAX_TIMEOUT_MS: i64 = 30_000;

/// Clamps a requested per-target budget into the supported window. A
/// non-positive value falls back to the minimum.
pub fn clamp_timeout_ms(timeout_ms: i64) -> u64 {
    let ms = if timeout_ms <= 0 { MIN_TIMEOUT_MS } else { timeout_ms };
    ms.clamp(MIN_TIMEOUT_MS, MAX_TIMEOUT_MS) as u64
}

/// Connection establishment is capped tighter than the whole request, so a
/// single unreachable host cannot burn the entire budget on a connect.
pub fn connect_timeout(timeout_ms: i64) -> Duration {
    let secs = clamp_timeout_ms(timeout_ms).div_ceil(1_000).clamp(1, 2);
    Duration::from_secs(secs)
}

/// Builds the HTTP client used for every fetch of one cycle.
///
/// Redirects are not followed: a 3xx reply is a non-200 status like any
/// other and surfaces as its own `http <code>` outcome.
pub fn build_client(timeout_ms: i64) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(connect_timeout(timeout_ms))
        .redirect(reqwest::redirect::Policy::none())
        .build()
}

/// Performs one bounded GET against a resolved URL.
///
/// No retries at this layer; a failed target is simply retried by the next
/// polling cycle. Transport errors surface their own text, a non-200 reply
/// becomes `http <code>`, and an undecodable body becomes `invalid json`.
/// The decoded value is not required to be an array here.
pub async fn fetch_status(client: &reqwest::Client, url: &str, timeout_ms: i64) -> FetchOutcome {
    let budget = Duration::from_millis(clamp_timeout_ms(timeout_ms));

    let response = match client
        .get(url)
        .header(ACCEPT, "application/json")
        .timeout(budget)
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => return FetchOutcome::Failed(transport_message(&e)),
    };

    let status = response.status();
    if status != StatusCode::OK {
        return FetchOutcome::Failed(format!("http {}", status.as_u16()));
    }

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => return FetchOutcome::Failed(transport_message(&e)),
    };

    match serde_json::from_str(&body) {
        Ok(value) => FetchOutcome::Ok(value),
        Err(_) => FetchOutcome::Failed("invalid json".to_string()),
    }
}

fn transport_message(error: &reqwest::Error) -> String {
    // reqwest's Display often hides the interesting cause (refused, timed
    // out, dns) behind a generic "error sending request"; append it.
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        message = format!("{message}: {cause}");
        source = cause.source();
    }
    message
}
