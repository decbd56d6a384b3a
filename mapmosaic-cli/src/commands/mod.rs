//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`cache`] - Tile cache management (clear, stats)
//! - [`download`] - Build one map
//! - [`init`] - Configuration initialization

pub mod cache;
pub mod download;
pub mod init;
