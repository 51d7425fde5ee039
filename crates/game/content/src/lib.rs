//! Data-driven content definitions and loaders.
//!
//! This crate reads the data files a deployment may override:
//! - Role catalogs (RON)
//! - Game rules (TOML)
//!
//! Content is handed to the runtime at startup and never appears in game state.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, ContentFactory, LoadResult, RoleCatalogFile, RoleCatalogLoader};
