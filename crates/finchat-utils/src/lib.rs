//! Shared utilities for finchat
//!
//! This crate provides common functionality used across the finchat workspace:
//! logging setup and application configuration loading.

pub mod config;
pub mod logging;

pub use config::{AppConfig, ConfigError, LlmSettings, MarketSettings, ServerSettings};
pub use logging::init_tracing;
