//! CLI command implementations

pub mod convert;
pub mod hitbox;
pub mod info;
pub mod new;
pub mod part;
pub mod validate;

use anyhow::{Context, Result};
use entdef_format::Document;
use tracing::debug;

/// Open a file for editing, logging every accepted change
pub(crate) fn open_document(path: &str) -> Result<Document> {
    let mut doc = Document::open(path).with_context(|| format!("Failed to load {}", path))?;
    doc.subscribe(|change| {
        debug!("Entity '{}' modified (revision {})", change.entity_id, change.revision);
    });
    Ok(doc)
}

/// Write an edited document back to where it came from
pub(crate) fn save_document(doc: &mut Document) -> Result<()> {
    if !doc.is_dirty() {
        return Ok(());
    }
    doc.save().context("Failed to save entity")
}
