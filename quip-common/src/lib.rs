//! Common utilities shared across Quip crates.
//!
//! The centralised tracing/logging initialisation lives in
//! [`observability`], next to the defaults every crate agrees on. It stays dependency-light so that every crate in the
//! workspace, including the binary's integration tests, can pull it in.
//!
//! # Examples
//!
//! ```rust
//! use quip_common::observability::{LogConfig, LogFormat};
//!
//! let cfg = LogConfig {
//!     format: LogFormat::Json,
//!     ..LogConfig::default()
//! };
//! assert_eq!(cfg.app_name, "quip");
//! assert_eq!(cfg.default_filter, "info");
//! ```

pub mod observability;

pub use observability::{init_logging, LogConfig, LogFormat};

/// Public chucknorris.io endpoint used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://api.chucknorris.io/";
