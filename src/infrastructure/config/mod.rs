//! Configuration loading.
//!
//! Settings come from `.stride/config.yaml`, an optional
//! `.stride/local.yaml` overlay, and `STRIDE_*` environment variables,
//! merged in that order via figment.

pub mod loader;

pub use loader::{ConfigError, ConfigLoader};
