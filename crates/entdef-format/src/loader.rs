//! Loading entities from disk and from debug JSON

use crate::codec::{decode, MAGIC};
use crate::format::EntityDoc;
use entdef_core::{EntdefError, Result, CURRENT_FORMAT_VERSION};
use entdef_model::Entity;
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Load an entity from an `.entdef` file
pub fn load_entity<P: AsRef<Path>>(path: P) -> Result<Entity> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    debug!("Read {} bytes from {}", bytes.len(), path.display());
    decode(&bytes)
}

/// Parse debug JSON (the bare payload document) into an entity.
///
/// The document must be at the current format version and passes the same
/// validation as a decoded container.
pub fn import_json(content: &str) -> Result<Entity> {
    let doc: EntityDoc = serde_json::from_str(content)?;
    if doc.format_version != CURRENT_FORMAT_VERSION {
        return Err(EntdefError::UnsupportedVersion {
            found: doc.format_version,
            supported: CURRENT_FORMAT_VERSION,
        });
    }
    doc.into_entity()
}

/// Load debug JSON from a file
pub fn load_entity_json<P: AsRef<Path>>(path: P) -> Result<Entity> {
    let content = fs::read_to_string(path)?;
    import_json(&content)
}

/// Quick check that a file starts with the `.entdef` magic number
pub fn is_entdef<P: AsRef<Path>>(path: P) -> bool {
    let mut magic = [0u8; 4];
    fs::File::open(path)
        .and_then(|mut f| f.read_exact(&mut magic))
        .map(|_| magic == MAGIC)
        .unwrap_or(false)
}
