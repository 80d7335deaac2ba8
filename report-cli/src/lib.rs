pub mod app;
pub mod cli;
pub mod config;
pub mod ingest;
pub mod logging;

pub use cli::Cli;
pub use config::AppConfig;
