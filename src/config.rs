use std::path::PathBuf;
use std::time::Duration;

/// Everything the pipeline reads from its environment, gathered in one
/// place instead of scattered module constants.
#[derive(Debug, Clone)]
pub struct Config {
    /// Dataset file holding the item id universe.
    pub dataset_path: PathBuf,
    /// Canonical cache file (read at startup, rewritten at checkpoints).
    pub cache_json_path: PathBuf,
    /// Browser-script artifact embedding the same mapping.
    pub cache_js_path: PathBuf,
    pub user_agent: String,
    /// Item page URL with an `{item_id}` placeholder.
    pub item_url_template: String,
    pub request_timeout: Duration,
    /// Flush both cache files after this many processed ids.
    pub checkpoint_interval: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("GS.json"),
            cache_json_path: PathBuf::from("item_names_cache.json"),
            cache_js_path: PathBuf::from("item-names.js"),
            user_agent: "GsChecker item-names/1.0".to_string(),
            item_url_template: "https://wotlk.evowow.com/?item={item_id}".to_string(),
            request_timeout: Duration::from_secs(8),
            checkpoint_interval: 50,
        }
    }
}

impl Config {
    /// Substitute an item id into the URL template.
    pub fn item_url(&self, id: &str) -> String {
        self.item_url_template.replace("{item_id}", id)
    }
}
