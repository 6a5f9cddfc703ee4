//! Configuration for devsvc
//!
//! Holds the settings that are not part of an invocation's positional
//! arguments: where the management endpoint lives and where the personal
//! certificate store is kept.
//!
//! # Features
//!
//! - TOML file at a platform-specific location
//! - Environment variable expansion in config files
//! - Defaults for every key

#![allow(clippy::module_inception)]

pub mod config;
pub mod error;

pub use config::{Config, DEFAULT_MANAGEMENT_URL};
pub use error::{ConfigError, Result};
