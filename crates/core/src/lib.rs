#![warn(clippy::all, missing_docs)]

//! Core domain logic for the gamedex catalog viewer.
//!
//! This crate hosts the data models, configuration handling, the remote
//! catalog client with its offline fallback, and the catalog state
//! container consumed by the terminal UI and any future frontends.

pub mod client;
pub mod config;
pub mod models;
pub mod store;

pub use client::{offline_catalog, CatalogClient};
pub use config::AppConfig;
pub use models::{Game, ListParams};
pub use store::{CatalogSource, CatalogStore, PAGE_SIZE};
