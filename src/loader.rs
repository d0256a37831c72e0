use crate::constants::{title_for, BLACK_NAME, KIF_EXTENSION, SERIES_LABEL, WHITE_NAME};
use crate::error::{Result, UploadError};
use crate::kifu::{import_kif, MetadataKey, Record};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{error, info, instrument};

/// Reads `<dir>/<key>.txt` and turns it into a normalized record.
#[derive(Debug, Clone)]
pub struct RecordLoader {
    dir: PathBuf,
}

impl RecordLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.{KIF_EXTENSION}"))
    }

    #[instrument(skip(self))]
    pub async fn load(&self, key: &str) -> Result<Record> {
        let path = self.path_for(key);
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(UploadError::MissingFile {
                    key: key.to_string(),
                    path,
                })
            }
            Err(e) => return Err(e.into()),
        };

        let mut record = match import_kif(&text) {
            Ok(record) => record,
            Err(source) => {
                error!("{}", text);
                return Err(UploadError::InvalidFormat {
                    key: key.to_string(),
                    source,
                });
            }
        };

        normalize(&mut record, key);
        info!("Get {}", key);
        Ok(record)
    }
}

/// Applies the fixed fields every uploaded record carries.
pub fn normalize(record: &mut Record, key: &str) {
    for mv in record.moves.iter_mut() {
        mv.set_elapsed_ms(0);
    }
    let metadata = &mut record.metadata;
    metadata.set_standard(MetadataKey::Title, title_for(key));
    metadata.set_standard(MetadataKey::BlackName, BLACK_NAME);
    metadata.set_standard(MetadataKey::WhiteName, WHITE_NAME);
    metadata.set_standard(MetadataKey::Source, SERIES_LABEL);
    metadata.set_standard(MetadataKey::OpusName, SERIES_LABEL);
    metadata.set_standard(MetadataKey::OpusNo, key);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const KIF: &str = "作者：someone\n先手：x\n手合割：平手\n1 ７六歩(77)   ( 0:12/00:00:12)\n2 ３四歩(33)   ( 0:30/00:00:30)\n";

    #[tokio::test]
    async fn test_load_normalizes_fixed_fields() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("20240101.txt"), KIF).unwrap();

        let record = RecordLoader::new(dir.path()).load("20240101").await.unwrap();
        let metadata = &record.metadata;

        assert_eq!(
            metadata.get_standard(MetadataKey::Title),
            Some("まいにち詰将棋(20240101)")
        );
        assert_eq!(metadata.get_standard(MetadataKey::BlackName), Some("先手"));
        assert_eq!(metadata.get_standard(MetadataKey::WhiteName), Some("後手"));
        assert_eq!(metadata.get_standard(MetadataKey::Source), Some("まいにち詰将棋"));
        assert_eq!(metadata.get_standard(MetadataKey::OpusName), Some("まいにち詰将棋"));
        assert_eq!(metadata.get_standard(MetadataKey::OpusNo), Some("20240101"));
        // untouched
        assert_eq!(metadata.get_standard(MetadataKey::Author), Some("someone"));
        assert!(record.moves.iter().all(|mv| mv.elapsed_ms == 0));
        assert_eq!(record.moves.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempdir().unwrap();
        let err = RecordLoader::new(dir.path()).load("2024-01-03").await.unwrap_err();
        match err {
            UploadError::MissingFile { key, path } => {
                assert_eq!(key, "2024-01-03");
                assert!(path.ends_with("2024-01-03.txt"));
            }
            other => panic!("expected MissingFile, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_format_carries_key() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("2024-01-02.txt"), "not a kifu at all").unwrap();

        let err = RecordLoader::new(dir.path()).load("2024-01-02").await.unwrap_err();
        assert!(matches!(err, UploadError::InvalidFormat { ref key, .. } if key == "2024-01-02"));
        assert!(err.to_string().ends_with("2024-01-02"));
    }
}
