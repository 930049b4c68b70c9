//! HTTP surface for docuvault.
//!
//! Exposes the member registry, document store, export engine, and report
//! generator over a small axum API. Large artifacts (archives, reports,
//! storage snapshots) are streamed response bodies; nothing is buffered
//! whole in memory. All routes except the health probe sit behind an
//! opaque bearer-token guard.

pub mod auth;
pub mod backup;
pub mod config;
mod download;
pub mod error;
pub mod members;
pub mod router;
pub mod server;
pub mod state;

pub use config::{ServerConfig, DB_FILENAME, VAULT_DIRNAME};
pub use error::{ApiError, ApiResult};
pub use router::build_router;
pub use server::DocuvaultServer;
pub use state::AppState;
