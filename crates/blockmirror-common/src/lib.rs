//! Blockmirror Common - Shared types and utilities
//!
//! This crate provides the identifier types and error definitions used
//! across all Blockmirror components.

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::*;
