use crate::app::ports::{SubmitStatus, UploadSink};
use crate::error::Result;
use crate::payload::TsumePayload;
use async_trait::async_trait;

/// Logs the payload that would have been posted and reports success.
pub struct DryRunSink;

#[async_trait]
impl UploadSink for DryRunSink {
    async fn submit(&self, payload: &TsumePayload) -> Result<SubmitStatus> {
        let body = serde_json::to_string(&payload.clone().into_submission())?;
        tracing::info!(
            uid = %payload.uid,
            game_id = payload.game_id,
            length = payload.length,
            bytes = body.len(),
            "dry run, not posting"
        );
        tracing::debug!("{}", body);
        Ok(SubmitStatus::new(200, "OK"))
    }
}
