//! Data-driven content for the sustain engine.
//!
//! This crate provides loaders for RON/TOML data files:
//! - Engine configuration (TOML)
//! - Action catalogs (RON)
//!
//! Loaded catalogs implement `sustain_core::CatalogOracle` directly, so hosts
//! can hand them to `sustain_core::Env` without an adapter.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{ActionCatalog, CatalogLoader, ConfigLoader, LoadResult};
