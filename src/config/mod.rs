//! Configuration module
//!
//! Settings are read from a TOML file at startup and never written back.

#[allow(clippy::module_inception)]
pub mod config;

pub use config::{Config, ExportConfig, LoggingConfig, UploadConfig, ViewConfig};
