use crate::model::Target;

/// Parses the free-form server list into an ordered target list.
///
/// One target per line, `name|host`, `name,host` or bare `host`. Blank lines
/// and `#` comment lines are skipped, and so is any line that ends up with an
/// empty host; the settings field is free text, so malformed lines are
/// dropped silently rather than reported.
pub fn parse_targets(text: &str) -> Vec<Target> {
    text.split(['\r', '\n']).filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<Target> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }

    // The first `|` wins; a host may itself contain more of them. `,` is
    // only tried when there is no `|` at all.
    let (name, host) = if let Some((name, host)) = trimmed.split_once('|') {
        (name.trim(), host.trim())
    } else if let Some((name, host)) = trimmed.split_once(',') {
        (name.trim(), host.trim())
    } else {
        (trimmed, trimmed)
    };

    if host.is_empty() {
        return None;
    }

    Some(Target {
        name: if name.is_empty() { host } else { name }.to_string(),
        host: host.to_string(),
    })
}
