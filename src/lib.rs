pub mod commands;
pub mod config;
pub mod data;
pub mod error;
pub mod loader;
pub mod logging;
pub mod services;
pub mod ui;
