//! Remote catalog access and offline fallback.

/// Hardcoded sample catalog used whenever a live call fails.
pub mod offline;
/// HTTP client for the upstream catalog API.
pub mod remote;

pub use offline::offline_catalog;
pub use remote::{CatalogClient, FetchError, FEATURED_COUNT};
