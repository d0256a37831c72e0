use crate::error::Result;
use crate::payload::TsumePayload;
use async_trait::async_trait;

/// Where a finished payload goes: the CMS, a dry-run log, or a test double.
#[async_trait]
pub trait UploadSink: Send + Sync {
    /// Errors only when no HTTP response was obtained; any status is returned as-is.
    async fn submit(&self, payload: &TsumePayload) -> Result<SubmitStatus>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitStatus {
    pub status: u16,
    pub status_text: String,
}

impl SubmitStatus {
    pub fn new(status: u16, status_text: impl Into<String>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
