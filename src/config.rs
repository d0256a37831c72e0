use crate::constants::{ENV_CMS_HOST, ENV_CMS_TOKEN};
use crate::error::{Result, UploadError};
use std::env;

/// CMS endpoint settings, read once at startup and shared read-only.
#[derive(Debug, Clone, Default)]
pub struct CmsConfig {
    pub base_url: String,
    pub access_token: String,
}

impl CmsConfig {
    /// Reads `CMS_SERVICE_HOST` and `CMS_ACCESS_TOKEN`. Call `dotenv` first to pick up `.env`.
    ///
    /// Unset or non-UTF-8 values are kept empty; the batch still runs and
    /// every upload then fails through [`CmsConfig::validate`].
    pub fn from_env() -> Self {
        Self {
            base_url: env::var(ENV_CMS_HOST).unwrap_or_default(),
            access_token: env::var(ENV_CMS_TOKEN).unwrap_or_default(),
        }
    }

    /// Err(Config) naming the first setting that is unset or blank.
    pub fn validate(&self) -> Result<()> {
        required(ENV_CMS_HOST, &self.base_url)?;
        required(ENV_CMS_TOKEN, &self.access_token)
    }
}

fn required(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(UploadError::Config(format!("{} is not set or empty", name)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_reports_missing_and_blank() {
        let missing = CmsConfig::default().validate().unwrap_err();
        assert!(missing.to_string().contains(ENV_CMS_HOST));

        let blank_token = CmsConfig {
            base_url: "https://cms.example.com".to_string(),
            access_token: "  ".to_string(),
        };
        let err = blank_token.validate().unwrap_err();
        assert!(matches!(err, UploadError::Config(_)));
        assert!(err.to_string().contains(ENV_CMS_TOKEN));

        let complete = CmsConfig {
            base_url: "https://cms.example.com".to_string(),
            access_token: "token".to_string(),
        };
        assert!(complete.validate().is_ok());
    }
}
