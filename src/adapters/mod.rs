//! Adapters binding the domain to external systems.
//!
//! - `sqlite`: sqlx-backed repositories, migrations, and the rollup engine
//! - `http`: the axum REST surface

pub mod http;
pub mod sqlite;
