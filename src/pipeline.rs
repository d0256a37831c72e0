use crate::app::upload_use_case::{ItemOutcome, UploadTsumeUseCase};
use crate::constants::MAX_IN_FLIGHT;
use crate::error::Result;
use futures::future::join_all;
use metrics::{counter, histogram};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};

/// Outcome of one item, tagged with its key.
#[derive(Debug)]
pub struct ItemReport {
    pub key: String,
    pub outcome: ItemOutcome,
}

/// Result of a complete batch run
#[derive(Debug, Default)]
pub struct BatchReport {
    pub items: Vec<ItemReport>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.items.len()
    }

    pub fn uploaded(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::Uploaded { .. }))
    }

    pub fn rejected(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::Rejected { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&ItemOutcome) -> bool) -> usize {
        self.items.iter().filter(|item| pred(&item.outcome)).count()
    }
}

/// Item keys for every file in `dir`: the file name up to its first `.`, sorted.
pub async fn list_keys(dir: &Path) -> Result<Vec<String>> {
    let mut keys = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_dir() {
            continue;
        }
        let name = entry.file_name();
        let name = name.to_string_lossy();
        let key = name.split('.').next().unwrap_or_default();
        if key.is_empty() {
            debug!("Skipping {} with empty key", name);
            continue;
        }
        keys.push(key.to_string());
    }
    keys.sort();
    Ok(keys)
}

/// Runs the per-item pipeline for every input file with a bounded number in flight.
pub struct BatchOrchestrator {
    use_case: Arc<UploadTsumeUseCase>,
    limit: usize,
}

impl BatchOrchestrator {
    pub fn new(use_case: UploadTsumeUseCase) -> Self {
        Self {
            use_case: Arc::new(use_case),
            limit: MAX_IN_FLIGHT,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    /// Enumerates the input directory and processes every key.
    ///
    /// Only a failure to list the directory is returned as an error; item
    /// failures are logged and recorded in the report.
    pub async fn run(&self) -> Result<BatchReport> {
        let keys = list_keys(self.use_case.loader().dir()).await?;
        Ok(self.run_keys(keys).await)
    }

    #[instrument(skip(self, keys), fields(items = keys.len(), limit = self.limit))]
    pub async fn run_keys(&self, keys: Vec<String>) -> BatchReport {
        info!("🚀 Starting upload of {} tsume", keys.len());
        let t_batch = std::time::Instant::now();
        let gate = Arc::new(Semaphore::new(self.limit));

        let tasks = keys.into_iter().map(|key| {
            let gate = gate.clone();
            let use_case = self.use_case.clone();
            async move {
                let outcome = {
                    let _permit = gate.acquire().await.expect("admission gate is never closed");
                    use_case.run(&key).await
                };
                counter!("tsume_items_total", "outcome" => outcome.label()).increment(1);
                ItemReport { key, outcome }
            }
        });
        let report = BatchReport {
            items: join_all(tasks).await,
        };

        histogram!("tsume_batch_duration_seconds").record(t_batch.elapsed().as_secs_f64());
        if report.failed() > 0 || report.rejected() > 0 {
            warn!(
                "⚠️ Batch finished: {} uploaded, {} rejected, {} failed of {}",
                report.uploaded(),
                report.rejected(),
                report.failed(),
                report.total()
            );
        } else {
            info!(
                "✅ Batch finished: {} uploaded of {}",
                report.uploaded(),
                report.total()
            );
        }
        report
    }
}
