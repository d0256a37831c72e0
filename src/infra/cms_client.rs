use crate::app::ports::{SubmitStatus, UploadSink};
use crate::config::CmsConfig;
use crate::constants::TSUMES_PATH;
use crate::error::Result;
use crate::payload::TsumePayload;
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use std::sync::Arc;
use url::Url;

/// Posts tsume payloads to the CMS collection endpoint.
pub struct CmsClient {
    client: reqwest::Client,
    config: Arc<CmsConfig>,
}

impl CmsClient {
    pub fn new(config: Arc<CmsConfig>) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// `<base>/api/tsumes`; any path on the base URL is replaced.
    pub fn endpoint(&self) -> Result<Url> {
        let base = Url::parse(&self.config.base_url)?;
        Ok(base.join(TSUMES_PATH)?)
    }
}

#[async_trait]
impl UploadSink for CmsClient {
    async fn submit(&self, payload: &TsumePayload) -> Result<SubmitStatus> {
        self.config.validate()?;
        let url = self.endpoint()?;
        tracing::info!("Post {} to {}", payload.uid, self.config.base_url);

        let resp = self
            .client
            .post(url)
            .header(
                AUTHORIZATION,
                format!("Bearer {}", self.config.access_token),
            )
            .json(&payload.clone().into_submission())
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(
                status = status.as_u16(),
                status_text = status.canonical_reason().unwrap_or_default(),
                "CMS responded with an error status"
            );
        }
        Ok(SubmitStatus::new(
            status.as_u16(),
            status.canonical_reason().unwrap_or_default(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> CmsClient {
        CmsClient::new(Arc::new(CmsConfig {
            base_url: base_url.to_string(),
            access_token: "token".to_string(),
        }))
    }

    #[test]
    fn test_endpoint_replaces_base_path() {
        assert_eq!(
            client("https://cms.example.com").endpoint().unwrap().as_str(),
            "https://cms.example.com/api/tsumes"
        );
        assert_eq!(
            client("https://cms.example.com/admin/").endpoint().unwrap().as_str(),
            "https://cms.example.com/api/tsumes"
        );
    }

    #[tokio::test]
    async fn test_missing_token_fails_before_request() {
        let client = CmsClient::new(Arc::new(CmsConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            access_token: String::new(),
        }));
        let record = crate::kifu::import_kif("手合割：平手\n").unwrap();
        let payload = TsumePayload::from_record(&record, "00");

        let err = client.submit(&payload).await.unwrap_err();
        assert!(matches!(err, crate::error::UploadError::Config(_)));
        assert!(!err.is_network_failure());
    }

    #[test]
    fn test_malformed_base_url_is_network_failure() {
        let err = client("not a url").endpoint().unwrap_err();
        assert!(err.is_network_failure());
    }
}
