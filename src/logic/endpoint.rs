use crate::model::ResolvedEndpoint;
use regex::Regex;
use reqwest::Url;
use std::sync::LazyLock;

/// Port the remote status agent listens on when the user gives none.
pub const DEFAULT_PORT: u16 = 42679;

static IPV6_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[[0-9a-fA-F:]+\](?::\d+)?$").expect("ipv6 pattern"));
static HOSTNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9.-]+(?::\d+)?$").expect("hostname pattern"));

/// Turns a raw user-entered host into a request URL, or rejects it.
///
/// A bare hostname or IP gets the default agent port; `host:port` is kept
/// as-is; a full `http(s)://` URL is respected (path and query survive only
/// on this branch). Anything ambiguous is rejected rather than guessed at,
/// in particular URLs carrying embedded credentials.
pub fn resolve(host: &str) -> Option<ResolvedEndpoint> {
    let host = host.trim();
    if host.is_empty() || host.len() > 255 || host.chars().any(char::is_whitespace) {
        return None;
    }

    let lower = host.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return resolve_absolute(host);
    }

    let ipv6 = IPV6_RE.is_match(host);
    if !ipv6 && !HOSTNAME_RE.is_match(host) {
        return None;
    }

    // An IPv6 literal always contains `:`, so the bare-hostname check only
    // applies to the second pattern; a bracketed literal without a trailing
    // `:port` ends in `]`.
    let url = if !host.contains(':') || (ipv6 && host.ends_with(']')) {
        format!("http://{host}:{DEFAULT_PORT}/")
    } else {
        format!("http://{host}/")
    };

    Some(ResolvedEndpoint {
        url,
        source_host: host.to_string(),
    })
}

fn resolve_absolute(raw: &str) -> Option<ResolvedEndpoint> {
    let url = Url::parse(raw).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    if !url.username().is_empty() || url.password().is_some() {
        return None;
    }
    let host = url.host_str()?;

    let port = explicit_port(&url, raw).map(|p| format!(":{p}")).unwrap_or_default();
    let path = url.path().trim_end_matches('/');
    let query = url.query().map(|q| format!("?{q}")).unwrap_or_default();

    Some(ResolvedEndpoint {
        url: format!("{}://{host}{port}{path}/{query}", url.scheme()),
        source_host: raw.to_string(),
    })
}

/// `Url::port` reports `None` for a scheme-default port even when the user
/// typed it out; keep `:80`/`:443` whenever the input actually carried it.
fn explicit_port(url: &Url, raw: &str) -> Option<u16> {
    if let Some(port) = url.port() {
        return Some(port);
    }
    let default = url.port_or_known_default()?;
    let (_, rest) = raw.split_once("://")?;
    let authority = rest.split(['/', '?', '#']).next().unwrap_or(rest);
    authority.ends_with(&format!(":{default}")).then_some(default)
}
