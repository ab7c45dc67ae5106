//! Stopmotion Settings Crate
//!
//! Handles configuration files: locating, loading, validating and saving.

pub mod config;
pub mod error;

pub use config::{Config, ErrorPolicy, OutputSettings};
pub use error::{SettingsError, SettingsResult};
