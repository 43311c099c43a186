//! Path cache service for the dot-grid backdrop.
//!
//! Keeps generated path sets in memory, keyed by viewport, so clients can skip
//! regeneration on their next visit. Everything is best-effort: clients fall
//! back to local generation whenever this service is slow, empty or gone.

pub mod config;
pub mod http;
pub mod metrics;
pub mod state;

pub use config::Config;
pub use http::{router, ApiError, AppState};
pub use metrics::Metrics;
pub use state::PathStore;
