pub mod config;
pub mod constants;
pub mod error;
pub mod hasher;
pub mod kifu;
pub mod loader;
pub mod logging;
pub mod payload;
pub mod pipeline;

// Use cases and the ports they depend on, plus the adapters behind them
pub mod app;
pub mod infra;
