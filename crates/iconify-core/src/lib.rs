//! Core types, transformations and utilities for the Iconify engine.
//!
//! This crate provides the foundational types used across all other iconify crates:
//! - Icon records and their normalization
//! - Icon set document types
//! - Rotation/flip transformations and their string shorthands
//! - Render-time customisations
//! - Icon name parsing
//! - Error types

pub mod customise;
pub mod errors;
pub mod icon;
pub mod iconset;
pub mod name;
pub mod transform;

pub use customise::*;
pub use errors::*;
pub use icon::*;
pub use iconset::*;
pub use name::*;
pub use transform::*;
