//! Storage infrastructure: configuration file persistence.
//!
//! The `config` sub-module reads the helper's TOML configuration from the
//! platform-appropriate directory and supplies defaults when the file does
//! not exist yet.

pub mod config;
