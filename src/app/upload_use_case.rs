use crate::app::ports::UploadSink;
use crate::error::UploadError;
use crate::hasher::record_digest;
use crate::loader::RecordLoader;
use crate::payload::TsumePayload;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, instrument};

/// Stage an item was in when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStage {
    Loading,
    Hashing,
    Uploading,
}

impl fmt::Display for ItemStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ItemStage::Loading => "loading",
            ItemStage::Hashing => "hashing",
            ItemStage::Uploading => "uploading",
        };
        f.write_str(name)
    }
}

/// Terminal state of one item.
#[derive(Debug)]
pub enum ItemOutcome {
    Uploaded { status: u16 },
    /// The CMS answered with a non-2xx status. Logged, not treated as an error.
    Rejected { status: u16, status_text: String },
    Failed { stage: ItemStage, error: UploadError },
}

impl ItemOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            ItemOutcome::Uploaded { .. } => "uploaded",
            ItemOutcome::Rejected { .. } => "rejected",
            ItemOutcome::Failed { .. } => "failed",
        }
    }

    /// The request reached the CMS, whatever it answered.
    pub fn is_delivered(&self) -> bool {
        !matches!(self, ItemOutcome::Failed { .. })
    }
}

/// Load, hash and submit a single tsume.
pub struct UploadTsumeUseCase {
    loader: RecordLoader,
    sink: Arc<dyn UploadSink>,
}

impl UploadTsumeUseCase {
    pub fn new(loader: RecordLoader, sink: Arc<dyn UploadSink>) -> Self {
        Self { loader, sink }
    }

    pub fn loader(&self) -> &RecordLoader {
        &self.loader
    }

    /// Never fails: every error is logged with the key and folded into the outcome.
    #[instrument(skip(self))]
    pub async fn run(&self, key: &str) -> ItemOutcome {
        let outcome = self.run_stages(key).await;
        match &outcome {
            ItemOutcome::Uploaded { status } => debug!(status = *status, "uploaded"),
            ItemOutcome::Rejected {
                status,
                status_text,
            } => debug!(status = *status, status_text = %status_text, "delivered with error status"),
            ItemOutcome::Failed { stage, error } => error!("{} {} failed: {}", key, stage, error),
        }
        outcome
    }

    async fn run_stages(&self, key: &str) -> ItemOutcome {
        let record = match self.loader.load(key).await {
            Ok(record) => record,
            Err(error) => {
                return ItemOutcome::Failed {
                    stage: ItemStage::Loading,
                    error,
                }
            }
        };

        let uid = match record_digest(&record) {
            Ok(uid) => uid,
            Err(error) => {
                return ItemOutcome::Failed {
                    stage: ItemStage::Hashing,
                    error,
                }
            }
        };

        let payload = TsumePayload::from_record(&record, uid);
        match self.sink.submit(&payload).await {
            Ok(status) if status.is_success() => ItemOutcome::Uploaded {
                status: status.status,
            },
            Ok(status) => ItemOutcome::Rejected {
                status: status.status,
                status_text: status.status_text,
            },
            Err(error) => ItemOutcome::Failed {
                stage: ItemStage::Uploading,
                error,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ports::SubmitStatus;
    use crate::error::Result;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::tempdir;

    struct FixedStatusSink {
        status: u16,
        seen: Mutex<Vec<TsumePayload>>,
    }

    #[async_trait]
    impl UploadSink for FixedStatusSink {
        async fn submit(&self, payload: &TsumePayload) -> Result<SubmitStatus> {
            self.seen.lock().unwrap().push(payload.clone());
            Ok(SubmitStatus::new(self.status, "status"))
        }
    }

    fn sink(status: u16) -> Arc<FixedStatusSink> {
        Arc::new(FixedStatusSink {
            status,
            seen: Mutex::new(Vec::new()),
        })
    }

    #[tokio::test]
    async fn test_non_success_status_is_rejected_not_failed() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("1.txt"), "手合割：平手\n1 ７六歩(77)\n").unwrap();
        let sink = sink(500);
        let use_case = UploadTsumeUseCase::new(RecordLoader::new(dir.path()), sink.clone());

        let outcome = use_case.run("1").await;

        assert!(matches!(outcome, ItemOutcome::Rejected { status: 500, .. }));
        assert!(outcome.is_delivered());
        assert_eq!(sink.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_file_never_reaches_sink() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("bad.txt"), "??").unwrap();
        let sink = sink(200);
        let use_case = UploadTsumeUseCase::new(RecordLoader::new(dir.path()), sink.clone());

        let outcome = use_case.run("bad").await;

        assert!(matches!(
            outcome,
            ItemOutcome::Failed {
                stage: ItemStage::Loading,
                error: UploadError::InvalidFormat { .. }
            }
        ));
        assert!(sink.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_success_uploads_digest_as_uid() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("20240101.txt"), "手合割：平手\n1 ７六歩(77)\n").unwrap();
        let sink = sink(201);
        let use_case = UploadTsumeUseCase::new(RecordLoader::new(dir.path()), sink.clone());

        let outcome = use_case.run("20240101").await;

        assert!(matches!(outcome, ItemOutcome::Uploaded { status: 201 }));
        let seen = sink.seen.lock().unwrap();
        assert_eq!(seen[0].uid.len(), 64);
        assert_eq!(seen[0].game_id, 20240101);
    }
}
