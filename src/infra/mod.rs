pub mod cms_client;
pub mod dry_run_sink;
