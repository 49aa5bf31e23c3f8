//! Configuration and process setup shared by the `station` binaries.

pub mod config;
pub mod logging;

pub use config::{ConfigError, ConfigLoader, StationConfig};
