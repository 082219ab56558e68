//! HTTP adapters for the stride REST API.

mod auth;
mod error;
mod goals;
mod params;
mod progress;
mod server;
mod state;
mod units;
mod user_stats;

pub use error::ApiError;
pub use server::ApiServer;
pub use state::AppState;
