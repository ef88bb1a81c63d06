use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::info;

/// Top-level dataset sections that reference item ids.
const SECTIONS: [&str; 2] = ["GS_DATA", "LEGENDARY"];

/// Read the dataset file and collect every distinct item id referenced
/// under the id-bearing sections. A missing or unparsable dataset is
/// fatal: without the id universe there is nothing to run against.
pub fn extract_ids(path: &Path) -> Result<BTreeSet<String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read dataset {}", path.display()))?;
    let data: Value = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse dataset {}", path.display()))?;

    let ids = collect_sections(&data);
    info!("Extracted {} item ids from {}", ids.len(), path.display());
    Ok(ids)
}

/// Missing sections are treated as empty, not as errors.
fn collect_sections(data: &Value) -> BTreeSet<String> {
    let mut ids = BTreeSet::new();
    for section in SECTIONS {
        if let Some(value) = data.get(section) {
            collect(value, &mut ids);
        }
    }
    ids
}

/// Purely syntactic rule: digit-string object keys and digit-string
/// string leaves are ids; every other shape is only traversed.
fn collect(value: &Value, ids: &mut BTreeSet<String>) {
    match value {
        Value::Object(map) => {
            for (key, v) in map {
                if is_digits(key) {
                    ids.insert(key.clone());
                }
                collect(v, ids);
            }
        }
        Value::Array(items) => {
            for v in items {
                collect(v, ids);
            }
        }
        Value::String(s) if is_digits(s) => {
            ids.insert(s.clone());
        }
        _ => {}
    }
}

pub fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
