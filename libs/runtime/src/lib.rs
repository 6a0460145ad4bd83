//! Process-level plumbing shared by slotkeeper binaries: layered
//! configuration and tracing setup.

pub mod config;
pub mod logging;
pub mod paths;

pub use config::{
    default_logging_config, AppConfig, CliArgs, DatabaseConfig, LoggingConfig, Section,
};
