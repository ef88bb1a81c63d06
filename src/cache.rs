use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::warn;

use crate::config::Config;
use crate::dataset::is_digits;

/// Item id → display name. Insert-only: entries are never removed, so
/// the cache grows monotonically across runs.
pub type Cache = BTreeMap<String, String>;

/// Global binding the script artifact assigns the mapping to.
const JS_GLOBAL: &str = "window.ITEM_NAMES";

/// Best-effort load. An absent file is the expected first-run case and
/// loads as empty; a present-but-malformed file also recovers to empty
/// (never an error), with a warning naming the problem.
pub fn load(path: &Path) -> Cache {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Cache::new(),
        Err(e) => {
            warn!("Could not read cache {}: {} (starting empty)", path.display(), e);
            return Cache::new();
        }
    };
    let data: Value = match serde_json::from_str(&text) {
        Ok(data) => data,
        Err(e) => {
            warn!("Cache {} is not valid JSON: {} (starting empty)", path.display(), e);
            return Cache::new();
        }
    };
    let Some(map) = data.as_object() else {
        warn!("Cache {} is not a JSON object (starting empty)", path.display());
        return Cache::new();
    };

    // Keep only entries that satisfy the cache invariants: digit-string
    // keys, non-empty names. Values are coerced to text.
    let mut cache = Cache::new();
    for (key, value) in map {
        if !is_digits(key) {
            continue;
        }
        let name = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        if name.trim().is_empty() {
            continue;
        }
        cache.insert(key.clone(), name);
    }
    cache
}

/// Ids in the extracted universe but absent from the cache, in
/// ascending string order. This is the fetch workload for a run.
pub fn missing_ids(ids: &BTreeSet<String>, cache: &Cache) -> Vec<String> {
    ids.iter()
        .filter(|id| !cache.contains_key(*id))
        .cloned()
        .collect()
}

/// Whole-file rewrite of both artifacts: the canonical JSON mapping and
/// the same mapping wrapped as a script-global assignment. Non-ASCII
/// names are written literally, not escaped.
pub fn save(cache: &Cache, config: &Config) -> Result<()> {
    let json = serde_json::to_string_pretty(cache)?;
    std::fs::write(&config.cache_json_path, &json)
        .with_context(|| format!("Failed to write {}", config.cache_json_path.display()))?;

    let js = format!("{} = {};\n", JS_GLOBAL, json);
    std::fs::write(&config.cache_js_path, js)
        .with_context(|| format!("Failed to write {}", config.cache_js_path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config(dir: &Path) -> Config {
        Config {
            cache_json_path: dir.join("item_names_cache.json"),
            cache_js_path: dir.join("item-names.js"),
            ..Config::default()
        }
    }

    #[test]
    fn absent_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(&dir.path().join("missing.json")).is_empty());
    }

    #[test]
    fn malformed_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");

        std::fs::write(&path, "").unwrap();
        assert!(load(&path).is_empty());

        std::fs::write(&path, "{ not json").unwrap();
        assert!(load(&path).is_empty());

        std::fs::write(&path, r#"["39272", "40980"]"#).unwrap();
        assert!(load(&path).is_empty());
    }

    #[test]
    fn load_enforces_cache_invariants() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(
            &path,
            r#"{"39272": "Thunderfury", "slug": "dropped", "40980": "   ", "1": 7}"#,
        )
        .unwrap();

        let cache = load(&path);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache["39272"], "Thunderfury");
        // Non-string values are coerced to text.
        assert_eq!(cache["1"], "7");
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = temp_config(dir.path());

        let mut cache = Cache::new();
        cache.insert("39272".into(), "Thunderfury, Blessed Blade".into());
        cache.insert("49623".into(), "Schattengram".into());
        save(&cache, &cfg).unwrap();

        assert_eq!(load(&cfg.cache_json_path), cache);
    }

    #[test]
    fn js_artifact_embeds_the_same_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = temp_config(dir.path());

        let mut cache = Cache::new();
        cache.insert("49623".into(), "Shadowmourne".into());
        cache.insert("9999".into(), "雷霆之怒".into());
        save(&cache, &cfg).unwrap();

        let js = std::fs::read_to_string(&cfg.cache_js_path).unwrap();
        let object = js
            .strip_prefix("window.ITEM_NAMES = ")
            .and_then(|s| s.strip_suffix(";\n"))
            .unwrap();

        let embedded: Value = serde_json::from_str(object).unwrap();
        let canonical: Value =
            serde_json::from_str(&std::fs::read_to_string(&cfg.cache_json_path).unwrap()).unwrap();
        assert_eq!(embedded, canonical);
    }

    #[test]
    fn non_ascii_names_are_written_literally() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = temp_config(dir.path());

        let mut cache = Cache::new();
        cache.insert("49623".into(), "Ombrelame".into());
        cache.insert("50070".into(), "雷霆之怒".into());
        save(&cache, &cfg).unwrap();

        let json = std::fs::read_to_string(&cfg.cache_json_path).unwrap();
        assert!(json.contains("雷霆之怒"));
        assert!(!json.contains("\\u"));
    }

    #[test]
    fn diff_against_empty_and_full() {
        let ids: BTreeSet<String> = ["10", "100", "9"].iter().map(|s| s.to_string()).collect();

        let missing = missing_ids(&ids, &Cache::new());
        // Ascending string order, not numeric.
        assert_eq!(missing, vec!["10", "100", "9"]);

        let full: Cache = ids.iter().map(|id| (id.clone(), format!("Item {id}"))).collect();
        assert!(missing_ids(&ids, &full).is_empty());
    }

    #[test]
    fn diff_is_partial() {
        let ids: BTreeSet<String> = ["1", "2", "3"].iter().map(|s| s.to_string()).collect();
        let mut cache = Cache::new();
        cache.insert("2".into(), "Known".into());
        assert_eq!(missing_ids(&ids, &cache), vec!["1", "3"]);
    }
}
