use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use tsume_uploader::app::ports::UploadSink;
use tsume_uploader::app::upload_use_case::UploadTsumeUseCase;
use tsume_uploader::config::CmsConfig;
use tsume_uploader::constants::{DEFAULT_LOG_DIR, DEFAULT_TSUME_DIR, ENV_LOG_DIR, ENV_TSUME_DIR};
use tsume_uploader::infra::cms_client::CmsClient;
use tsume_uploader::infra::dry_run_sink::DryRunSink;
use tsume_uploader::loader::RecordLoader;
use tsume_uploader::logging;
use tsume_uploader::pipeline::BatchOrchestrator;

#[derive(Parser)]
#[command(name = "tsume_uploader")]
#[command(about = "Upload daily tsume KIF files to the CMS")]
#[command(version = "0.1.0")]
struct Cli {
    /// Directory of `<key>.txt` KIF files
    #[arg(long, env = ENV_TSUME_DIR, default_value = DEFAULT_TSUME_DIR)]
    dir: PathBuf,

    /// Directory for the daily JSON log files
    #[arg(long, env = ENV_LOG_DIR, default_value = DEFAULT_LOG_DIR)]
    log_dir: PathBuf,

    /// Load and hash every file but log the payloads instead of posting them
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env must be loaded before clap reads env-backed arguments
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    let _log_guard = logging::init_logging(&cli.log_dir);

    let sink: Arc<dyn UploadSink> = if cli.dry_run {
        info!("Dry run: payloads will be logged, not posted");
        Arc::new(DryRunSink)
    } else {
        // Incomplete settings fail each item at upload time; the batch still runs
        let config = CmsConfig::from_env();
        if let Err(e) = config.validate() {
            error!("❌ {}; every upload will fail", e);
        }
        Arc::new(CmsClient::new(Arc::new(config)))
    };

    let loader = RecordLoader::new(cli.dir);
    let orchestrator = BatchOrchestrator::new(UploadTsumeUseCase::new(loader, sink));

    // Item failures are already logged; only an unreadable directory ends the run early
    match orchestrator.run().await {
        Ok(report) => {
            info!(
                total = report.total(),
                uploaded = report.uploaded(),
                rejected = report.rejected(),
                failed = report.failed(),
                "Upload run complete"
            );
            Ok(())
        }
        Err(e) => {
            error!("❌ Could not read tsume directory: {}", e);
            Err(e.into())
        }
    }
}
