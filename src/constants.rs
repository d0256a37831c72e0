//! Fixed values for the daily tsume upload job.

/// Label used for the source and opus-name metadata of every uploaded record.
pub const SERIES_LABEL: &str = "まいにち詰将棋";

pub const BLACK_NAME: &str = "先手";
pub const WHITE_NAME: &str = "後手";

/// Absolute path of the CMS collection endpoint.
pub const TSUMES_PATH: &str = "/api/tsumes";

/// At most this many item pipelines are in flight at once.
pub const MAX_IN_FLIGHT: usize = 5;

/// Input files are read as `<dir>/<key>.<KIF_EXTENSION>`.
pub const KIF_EXTENSION: &str = "txt";

pub const DEFAULT_TSUME_DIR: &str = "src/tsume";

pub const DEFAULT_LOG_DIR: &str = "logs";
pub const LOG_FILE_PREFIX: &str = "uploader.log";
/// Used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_LOG_FILTER: &str = "tsume_uploader=info,warn";

// Environment variable names
pub const ENV_CMS_HOST: &str = "CMS_SERVICE_HOST";
pub const ENV_CMS_TOKEN: &str = "CMS_ACCESS_TOKEN";
pub const ENV_TSUME_DIR: &str = "TSUME_DIR";
pub const ENV_LOG_DIR: &str = "TSUME_LOG_DIR";

/// Display title for the record with the given key.
pub fn title_for(key: &str) -> String {
    format!("{SERIES_LABEL}({key})")
}
