use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::tempdir;
use tsume_uploader::app::ports::{SubmitStatus, UploadSink};
use tsume_uploader::app::upload_use_case::{ItemOutcome, ItemStage, UploadTsumeUseCase};
use tsume_uploader::error::UploadError;
use tsume_uploader::loader::RecordLoader;
use tsume_uploader::payload::TsumePayload;
use tsume_uploader::pipeline::BatchOrchestrator;

const VALID: &str = include_str!("resources/2024-01-01.txt");
const MALFORMED: &str = include_str!("resources/2024-01-02.txt");
const HUGE_TIME: &str = include_str!("resources/2024-01-03.txt");

/// Records every payload and tracks how many submissions overlap.
#[derive(Default)]
struct RecordingSink {
    delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    payloads: Mutex<Vec<TsumePayload>>,
}

#[async_trait]
impl UploadSink for RecordingSink {
    async fn submit(
        &self,
        payload: &TsumePayload,
    ) -> tsume_uploader::error::Result<SubmitStatus> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.payloads.lock().unwrap().push(payload.clone());
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(SubmitStatus::new(200, "OK"))
    }
}

fn orchestrator(dir: &Path, sink: Arc<RecordingSink>) -> BatchOrchestrator {
    BatchOrchestrator::new(UploadTsumeUseCase::new(RecordLoader::new(dir), sink))
}

#[tokio::test]
async fn test_valid_and_malformed_files() -> Result<()> {
    let dir = tempdir()?;
    std::fs::write(dir.path().join("2024-01-01.txt"), VALID)?;
    std::fs::write(dir.path().join("2024-01-02.txt"), MALFORMED)?;
    let sink = Arc::new(RecordingSink::default());

    let report = orchestrator(dir.path(), sink.clone()).run().await?;

    assert_eq!(report.total(), 2);
    assert_eq!(report.uploaded(), 1);
    assert_eq!(report.failed(), 1);

    let payloads = sink.payloads.lock().unwrap();
    assert_eq!(payloads.len(), 1);
    let payload = &payloads[0];
    assert_eq!(payload.game_id, 2024);
    assert_eq!(payload.title.as_deref(), Some("まいにち詰将棋(2024-01-01)"));
    assert_eq!(payload.author.as_deref(), Some("詰将棋作家"));
    assert_eq!(payload.source.as_deref(), Some("まいにち詰将棋"));
    assert_eq!(payload.length, 5);
    assert_eq!(payload.length, payload.data.moves.len());
    assert_eq!(payload.uid.len(), 64);
    assert_eq!(payload.data.initial.preset, "OTHER");

    let failed = report
        .items
        .iter()
        .find(|item| item.key == "2024-01-02")
        .expect("malformed item is reported");
    assert!(matches!(
        failed.outcome,
        ItemOutcome::Failed {
            stage: ItemStage::Loading,
            error: UploadError::InvalidFormat { .. }
        }
    ));
    Ok(())
}

#[tokio::test]
async fn test_out_of_range_move_time_does_not_stop_siblings() -> Result<()> {
    let dir = tempdir()?;
    std::fs::write(dir.path().join("2024-01-01.txt"), VALID)?;
    std::fs::write(dir.path().join("2024-01-03.txt"), HUGE_TIME)?;
    let sink = Arc::new(RecordingSink::default());

    let report = orchestrator(dir.path(), sink.clone()).run().await?;

    assert_eq!(report.total(), 2);
    assert_eq!(report.uploaded(), 1);
    assert_eq!(report.failed(), 1);
    let failed = report
        .items
        .iter()
        .find(|item| item.key == "2024-01-03")
        .expect("out-of-range item is reported");
    assert!(matches!(
        failed.outcome,
        ItemOutcome::Failed {
            stage: ItemStage::Loading,
            error: UploadError::InvalidFormat { .. }
        }
    ));
    assert_eq!(sink.payloads.lock().unwrap()[0].game_id, 2024);
    Ok(())
}

#[tokio::test]
async fn test_at_most_five_items_in_flight() -> Result<()> {
    let dir = tempdir()?;
    for day in 1..=12 {
        std::fs::write(dir.path().join(format!("202401{day:02}.txt")), VALID)?;
    }
    let sink = Arc::new(RecordingSink {
        delay: Duration::from_millis(100),
        ..RecordingSink::default()
    });

    let report = orchestrator(dir.path(), sink.clone()).run().await?;

    assert_eq!(report.total(), 12);
    assert_eq!(report.uploaded(), 12);
    let max = sink.max_in_flight.load(Ordering::SeqCst);
    assert!(max <= 5, "{max} submissions overlapped");
    assert!(max > 1, "items never ran concurrently");
    assert_eq!(sink.in_flight.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn test_custom_limit_is_respected() -> Result<()> {
    let dir = tempdir()?;
    for day in 1..=6 {
        std::fs::write(dir.path().join(format!("2024010{day}.txt")), VALID)?;
    }
    let sink = Arc::new(RecordingSink {
        delay: Duration::from_millis(50),
        ..RecordingSink::default()
    });

    let report = orchestrator(dir.path(), sink.clone())
        .with_limit(1)
        .run()
        .await?;

    assert_eq!(report.uploaded(), 6);
    assert_eq!(sink.max_in_flight.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn test_same_content_same_uid_across_runs() -> Result<()> {
    let dir = tempdir()?;
    std::fs::write(dir.path().join("20240101.txt"), VALID)?;

    let first = Arc::new(RecordingSink::default());
    orchestrator(dir.path(), first.clone()).run().await?;
    let second = Arc::new(RecordingSink::default());
    orchestrator(dir.path(), second.clone()).run().await?;

    let a = first.payloads.lock().unwrap()[0].uid.clone();
    let b = second.payloads.lock().unwrap()[0].uid.clone();
    assert_eq!(a, b);
    assert_eq!(first.payloads.lock().unwrap()[0].game_id, 20240101);
    Ok(())
}

#[tokio::test]
async fn test_unreadable_directory_fails_the_run() {
    let dir = tempdir().unwrap();
    let sink = Arc::new(RecordingSink::default());
    let result = orchestrator(&dir.path().join("missing"), sink).run().await;
    assert!(matches!(result, Err(UploadError::Io(_))));
}
