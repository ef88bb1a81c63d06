use std::future::Future;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::cache::{self, Cache};
use crate::config::Config;

/// Outcome of one resolve pass.
pub struct RunStats {
    pub processed: usize,
    pub resolved: usize,
    pub failed: usize,
}

/// Walk the missing ids in order, one request at a time. Every
/// `checkpoint_interval` processed ids (hit or miss both count) the
/// cache is flushed to both files and a progress line is printed, so an
/// externally killed run keeps everything up to the last checkpoint.
/// A final flush always happens after the loop, even for zero ids.
///
/// Generic over the fetch function so tests can feed simulated
/// responses; a fetch miss never aborts the loop.
pub async fn resolve_missing<F, Fut>(
    cache: &mut Cache,
    missing: &[String],
    config: &Config,
    fetch: F,
) -> Result<RunStats>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Option<String>>,
{
    let total = missing.len();
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
            .progress_chars("=> "),
    );

    let mut resolved = 0usize;
    for (idx, id) in missing.iter().enumerate() {
        if let Some(name) = fetch(id.clone()).await {
            cache.insert(id.clone(), name);
            resolved += 1;
        }
        pb.inc(1);

        let processed = idx + 1;
        if processed % config.checkpoint_interval == 0 {
            pb.suspend(|| println!("Processed {}/{}", processed, total));
            cache::save(cache, config)?;
        }
    }
    pb.finish_and_clear();

    // Unconditional final flush; rewriting unchanged state is fine.
    cache::save(cache, config)?;
    info!("Resolved {}/{} missing ids", resolved, total);

    Ok(RunStats {
        processed: total,
        resolved,
        failed: total - resolved,
    })
}
