//! Composition root for the werewolf lobby server.
//!
//! The binary reads [`ServerConfig`] from the environment, installs logging,
//! loads content, builds a [`runtime::Runtime`], and hands its handle to the
//! line-delimited JSON transport in [`transport`].
pub mod config;
pub mod logging;
pub mod transport;

pub use config::ServerConfig;
pub use transport::serve;
