// src/pipeline/watch.rs

//! The watch cycle: fetch → compare → persist → notify.
//!
//! One invocation runs the sequence once, sequentially. The run assumes it
//! is the only writer of the snapshot key while it executes; scheduling is
//! expected to enforce at-most-one invocation at a time.

use tracing::{info, warn};

use crate::error::Result;
use crate::models::{Config, Job};
use crate::notify::Notifier;
use crate::pipeline::diff::{JobDiff, diff_snapshots};
use crate::services::JobSource;
use crate::storage::SnapshotStore;

/// Terminal state of a single watch run.
#[derive(Debug)]
pub enum RunOutcome {
    /// No snapshot existed; the fresh fetch became the baseline.
    BaselineCreated { count: usize },

    /// Snapshot existed and the listings have not changed.
    Unchanged { count: usize },

    /// The fetch came back empty against a non-empty snapshot and
    /// `source.allow_empty` is off; nothing was persisted or sent.
    EmptyRejected { previous_count: usize },

    /// The listings changed; the snapshot was updated and a notification
    /// was attempted. `notified` is false when delivery failed.
    Changed { diff: JobDiff, notified: bool },
}

/// Run one watch cycle.
///
/// Every failure before the notify step aborts the run; the next scheduled
/// invocation starts fresh from whatever was durably persisted. A notify
/// failure after the snapshot update is logged and reported, never fatal,
/// and never rolls back the persisted state.
pub async fn run_watch(
    config: &Config,
    source: &dyn JobSource,
    store: &dyn SnapshotStore,
    notifier: &dyn Notifier,
) -> Result<RunOutcome> {
    // Start -> Fetched. A degraded fetch is not fatal: the run continues
    // with an empty collection and the empty guard below decides.
    let jobs = match source.fetch().await {
        Ok(jobs) => jobs,
        Err(e) => {
            warn!("Fetch from {} degraded: {}", source.source_name(), e);
            Vec::new()
        }
    };
    info!("Fetched {} listings from {}", jobs.len(), source.source_name());

    // Persist the working copy locally and read it back; these are the
    // exact bytes compared and uploaded. Any failure here is fatal since
    // everything downstream depends on them.
    let current = write_working_file(config, &jobs).await?;

    let key = &config.storage.snapshot_key;
    match store.get(key).await? {
        // Fetched -> BaselineAbsent: first run, upload and stop. The
        // notifier is never invoked on a baseline upload.
        None => {
            store.put(key, &current).await?;
            info!(
                "No prior snapshot; baseline of {} listings written to {}",
                jobs.len(),
                store.location(key)
            );
            Ok(RunOutcome::BaselineCreated { count: jobs.len() })
        }

        // Fetched -> BaselinePresent
        Some(previous) => {
            if jobs.is_empty() && !config.source.allow_empty {
                let previous_count = count_jobs(&previous);
                if previous_count > 0 {
                    warn!(
                        "Empty fetch against a snapshot of {} listings; \
                         refusing to treat it as a change",
                        previous_count
                    );
                    return Ok(RunOutcome::EmptyRejected { previous_count });
                }
            }

            let diff = diff_snapshots(&previous, &current)?;

            if !diff.has_changes() {
                info!("No listing changes.");
                return Ok(RunOutcome::Unchanged { count: jobs.len() });
            }

            info!(
                "Detected {} changes (+{} -{} ~{})",
                diff.change_count(),
                diff.added.len(),
                diff.removed.len(),
                diff.changed.len()
            );

            // Persist first. If the put fails the run aborts here and no
            // notification goes out, so what we report always matches
            // what is stored.
            store.put(key, &current).await?;
            info!("Snapshot updated at {}", store.location(key));

            // Notify second. State is already durable, so a delivery
            // failure is soft: log it and report it in the outcome.
            let notified = match notifier.notify(&diff).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::error!("Notification failed: {}", e);
                    false
                }
            };

            Ok(RunOutcome::Changed { diff, notified })
        }
    }
}

/// Serialize the fetched listings to the working file and read the bytes
/// back for comparison and upload.
async fn write_working_file(config: &Config, jobs: &[Job]) -> Result<Vec<u8>> {
    let path = config.storage.work_file();
    let bytes = serde_json::to_vec_pretty(jobs)?;

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&path, &bytes).await?;

    let read_back = tokio::fs::read(&path).await?;
    Ok(read_back)
}

/// Count listings in a serialized snapshot, treating malformed data as zero.
fn count_jobs(bytes: &[u8]) -> usize {
    serde_json::from_slice::<Vec<Job>>(bytes)
        .map(|jobs| jobs.len())
        .unwrap_or(0)
}
