//! # REEL Common Library
//!
//! Shared code for the REEL discovery crates:
//! - Common error type
//! - TOML configuration loading
//! - Configuration file path resolution
//! - Logging configuration

pub mod config;
pub mod error;

pub use config::LoggingConfig;
pub use error::{Error, Result};
