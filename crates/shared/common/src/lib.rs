//! Common utilities shared across the workspace crates.
//!
//! This crate provides:
//! - Unified error handling with HTTP response mapping
//! - Configuration structures and environment loading

pub mod config;
pub mod error;

pub use config::*;
pub use error::{AppError, AppResult, OptionExt};
