//! entdef Core - Foundational types for entity definitions
//!
//! This crate provides the types every other entdef crate depends on:
//! - `Vec2`, `UvRect`, `PixelRect` - Geometric value types
//! - `ContentHash` - SHA-256 payload fingerprints
//! - Id generation and collision-free naming helpers
//! - Error types and Result alias

mod error;
mod hash;
mod id;
pub mod naming;
mod types;

/// Container version written by this build. Older versions are read through
/// the migration chain; newer ones are rejected.
pub const CURRENT_FORMAT_VERSION: u32 = 2;

pub use error::{EntdefError, ErrorKind, Result};
pub use hash::ContentHash;
pub use id::{check_id, generate_id, is_valid_id};
pub use types::{PixelRect, UvRect, Vec2};
