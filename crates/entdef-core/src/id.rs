//! Identifier generation

use crate::error::{EntdefError, Result};
use uuid::Uuid;

/// Generate a fresh globally unique id (UUID v4, hyphenated)
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Whether a string is usable as an id: non-empty and free of control characters
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty() && !id.chars().any(char::is_control)
}

/// Fail with `InvalidId` unless [`is_valid_id`] accepts `id`
pub fn check_id(id: &str) -> Result<()> {
    if is_valid_id(id) {
        Ok(())
    } else {
        Err(EntdefError::InvalidId(id.to_string()))
    }
}
