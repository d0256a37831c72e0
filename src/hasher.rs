use crate::error::Result;
use crate::kifu::{export_jkf_string, Record};
use sha2::{Digest, Sha256};

/// SHA-256 of the record's canonical JKF text, as 64 lowercase hex characters.
///
/// The CMS uses this as the tsume `uid`, so it must only depend on the
/// normalized record content.
pub fn record_digest(record: &Record) -> Result<String> {
    let canonical = export_jkf_string(record)?;
    Ok(text_digest(&canonical))
}

pub fn text_digest(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}
