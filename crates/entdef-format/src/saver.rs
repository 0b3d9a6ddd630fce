//! Saving entities to disk and to debug JSON

use crate::codec::encode;
use crate::format::EntityDoc;
use entdef_core::{Result, CURRENT_FORMAT_VERSION};
use entdef_model::Entity;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Save an entity to an `.entdef` file.
///
/// The container is written to a sibling temp file and renamed over the
/// target, so an interrupted save leaves the previous file intact.
pub fn save_entity<P: AsRef<Path>>(path: P, entity: &Entity) -> Result<()> {
    let path = path.as_ref();
    let bytes = encode(entity)?;

    let tmp = temp_path(path);
    fs::write(&tmp, &bytes)?;
    if let Err(e) = fs::rename(&tmp, path) {
        fs::remove_file(&tmp).ok();
        return Err(e.into());
    }

    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

/// Render the payload document as JSON for debugging
pub fn export_json(entity: &Entity, pretty: bool) -> Result<String> {
    let doc = EntityDoc::from_entity(entity, CURRENT_FORMAT_VERSION);
    doc.validate()?;
    let content = if pretty {
        serde_json::to_string_pretty(&doc)?
    } else {
        serde_json::to_string(&doc)?
    };
    Ok(content)
}

/// Save debug JSON to a file
pub fn save_entity_json<P: AsRef<Path>>(path: P, entity: &Entity, pretty: bool) -> Result<()> {
    let content = export_json(entity, pretty)?;
    fs::write(path, content)?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_path_is_sibling() {
        let tmp = temp_path(Path::new("assets/knight.entdef"));
        assert_eq!(tmp, PathBuf::from("assets/knight.entdef.tmp"));
    }

    #[test]
    fn test_export_json_contains_fields() {
        let entity = Entity::new("ent-1", "Test").unwrap();
        let json = export_json(&entity, false).unwrap();
        assert!(json.starts_with("{\"format_version\":2"));
        assert!(json.contains("\"name\":\"Test\""));
    }

    #[test]
    fn test_save_overwrites_existing() {
        let dir = std::env::temp_dir().join(format!("entdef_saver_test_{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("a.entdef");

        save_entity(&path, &Entity::new("a", "First").unwrap()).unwrap();
        save_entity(&path, &Entity::new("a", "Second").unwrap()).unwrap();

        let loaded = crate::loader::load_entity(&path).unwrap();
        assert_eq!(loaded.name(), "Second");
        assert!(!dir.join("a.entdef.tmp").exists());
        fs::remove_dir_all(&dir).ok();
    }
}
