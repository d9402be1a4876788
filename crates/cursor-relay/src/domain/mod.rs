//! Domain layer: configuration types.

pub mod config;

pub use config::{AppConfig, ConfigError};
