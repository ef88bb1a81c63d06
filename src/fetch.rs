use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::config::Config;

/// Head of the embedded item assignment, e.g. `var g_items_39272 = {...};`.
/// Matches up to and including the opening brace on the same line; the
/// object itself is isolated by a brace-balanced scan, not by the regex.
static G_ITEMS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"g_items[^\n{]*\{").unwrap());

/// The two name fields of the embedded object we care about; everything
/// else in the blob is ignored.
#[derive(Deserialize)]
struct ItemBlob {
    #[serde(default)]
    name_enus: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

/// One shared client for the whole run: connection reuse, fixed
/// user-agent, per-request timeout.
pub fn client(config: &Config) -> Result<Client> {
    let client = Client::builder()
        .timeout(config.request_timeout)
        .user_agent(config.user_agent.clone())
        .build()?;
    Ok(client)
}

/// Single attempt at resolving one id. Any transport failure, non-200
/// status or unparsable page is "no name found": the id stays out of
/// the cache and is retried on the next run. Nothing on this path
/// escapes as an error.
pub async fn fetch_name(client: &Client, url: String) -> Option<String> {
    let resp = client.get(&url).send().await.ok()?;
    let status = resp.status();
    let body = resp.text().await.ok()?;
    name_from_response(status, &body)
}

/// Only an exact 200 carries item data; 404s for retired ids and
/// server errors alike resolve to nothing.
fn name_from_response(status: StatusCode, body: &str) -> Option<String> {
    if status != StatusCode::OK {
        return None;
    }
    name_from_body(body)
}

/// Locate the `g_items` assignment and parse the object literal after
/// it. Prefers the English display name, falling back to the generic
/// name field; the result is trimmed and must be non-empty.
fn name_from_body(body: &str) -> Option<String> {
    let m = G_ITEMS_RE.find(body)?;
    let fragment = balanced_object(&body[m.end() - 1..])?;
    let blob: ItemBlob = serde_json::from_str(fragment).ok()?;

    let name = blob
        .name_enus
        .filter(|n| !n.trim().is_empty())
        .or(blob.name.filter(|n| !n.trim().is_empty()))?;
    Some(name.trim().to_string())
}

/// Brace-balanced `{...}` prefix of `s`. Braces inside double-quoted
/// string literals (and escaped quotes within them) do not count
/// toward the depth.
fn balanced_object(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    if bytes.first() != Some(&b'{') {
        return None;
    }

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, &b) in bytes.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&s[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}
