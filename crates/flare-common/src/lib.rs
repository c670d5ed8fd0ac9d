//! # Flare Common
//!
//! Common types and utilities shared by the Flare crates.
//!
//! This crate provides:
//! - The error taxonomy (configuration, export lookup, assets, IO)
//! - Gradient color stops and CSS-style color parsing
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod color;
pub mod error;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::color::*;
    pub use crate::error::*;
}

pub use prelude::*;
