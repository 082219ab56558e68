//! Infrastructure layer module
//!
//! Cross-cutting concerns that sit outside the domain:
//! - Configuration management (hierarchical YAML + environment overrides)
//!
//! Infrastructure code satisfies contracts defined by the domain layer and
//! never appears in service signatures.

pub mod config;
