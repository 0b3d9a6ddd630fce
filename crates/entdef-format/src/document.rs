//! The host's single open entity, with dirty tracking and change listeners

use crate::loader::load_entity;
use crate::saver::save_entity;
use entdef_core::{EntdefError, Result, CURRENT_FORMAT_VERSION};
use entdef_model::Entity;
use std::path::{Path, PathBuf};
use tracing::info;

/// Sent to listeners after a successful edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modified {
    pub entity_id: String,
    /// Increments once per successful edit
    pub revision: u64,
}

type Listener = Box<dyn FnMut(&Modified)>;

/// An open entity definition.
///
/// Owns exactly one `Entity`. Edits run against a scratch copy and are only
/// published when they succeed, so a failed edit (or a failed open) never
/// leaves the document half-changed.
pub struct Document {
    entity: Entity,
    path: Option<PathBuf>,
    dirty: bool,
    revision: u64,
    listeners: Vec<Listener>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// A new untitled document
    pub fn new() -> Self {
        Self::from_entity(Entity::new_untitled())
    }

    pub fn from_entity(entity: Entity) -> Self {
        Self {
            entity,
            path: None,
            dirty: false,
            revision: 0,
            listeners: Vec::new(),
        }
    }

    /// Open a document from an `.entdef` file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let entity = load_entity(path)?;
        let mut doc = Self::from_entity(entity);
        doc.path = Some(path.to_path_buf());
        Ok(doc)
    }

    /// Replace the current entity with one loaded from `path`.
    ///
    /// On failure the current entity, path and dirty flag are kept.
    pub fn reopen<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let entity = load_entity(path)?;
        self.entity = entity;
        self.path = Some(path.to_path_buf());
        self.dirty = false;
        Ok(())
    }

    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Register a callback invoked after every successful edit
    pub fn subscribe(&mut self, listener: impl FnMut(&Modified) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Apply a mutation. Listeners are notified only if it succeeds.
    pub fn edit<T>(&mut self, f: impl FnOnce(&mut Entity) -> Result<T>) -> Result<T> {
        let mut scratch = self.entity.clone();
        let value = f(&mut scratch)?;
        self.entity = scratch;
        self.dirty = true;
        self.revision += 1;

        let event = Modified {
            entity_id: self.entity.id().to_string(),
            revision: self.revision,
        };
        for listener in &mut self.listeners {
            listener(&event);
        }
        Ok(value)
    }

    /// Save to the path the document was opened from or last saved to
    pub fn save(&mut self) -> Result<()> {
        let path = self
            .path
            .clone()
            .ok_or_else(|| EntdefError::NotFound("document has no file path".to_string()))?;
        self.save_as(path)
    }

    pub fn save_as<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        save_entity(path, &self.entity)?;
        if self.entity.format_version() != CURRENT_FORMAT_VERSION {
            info!(
                "Upgraded {} from format version {} to {}",
                path.display(),
                self.entity.format_version(),
                CURRENT_FORMAT_VERSION
            );
            self.entity.stamp_format_version(CURRENT_FORMAT_VERSION);
        }
        self.path = Some(path.to_path_buf());
        self.dirty = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use entdef_model::BodyPart;
    use std::cell::RefCell;
    use std::fs;
    use std::rc::Rc;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("entdef_document_test_{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_edit_notifies_on_success_only() {
        let mut doc = Document::from_entity(Entity::new("ent-1", "Test").unwrap());
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        doc.subscribe(move |m| sink.borrow_mut().push(m.revision));

        doc.edit(|e| e.add_body_part(BodyPart::new("head", "Head").unwrap())).unwrap();
        let err = doc.edit(|e| e.add_body_part(BodyPart::new("head", "Again").unwrap()));
        assert!(err.is_err());

        assert_eq!(*events.borrow(), vec![1]);
        assert_eq!(doc.revision(), 1);
        assert!(doc.is_dirty());
    }

    #[test]
    fn test_failed_edit_is_all_or_nothing() {
        let mut doc = Document::from_entity(Entity::new("ent-1", "Test").unwrap());
        let result = doc.edit(|e| {
            e.add_body_part(BodyPart::new("a", "A").unwrap())?;
            e.remove_body_part("missing")?;
            Ok(())
        });
        assert!(matches!(result, Err(EntdefError::NotFound(_))));
        assert!(doc.entity().body_parts().is_empty());
        assert!(!doc.is_dirty());
    }

    #[test]
    fn test_save_requires_path() {
        let mut doc = Document::new();
        assert!(doc.save().is_err());
    }

    #[test]
    fn test_save_and_reopen() {
        let dir = temp_dir();
        let path = dir.join("hero.entdef");

        let mut doc = Document::from_entity(Entity::new("hero", "Hero").unwrap());
        doc.edit(|e| e.add_body_part(BodyPart::new("torso", "Torso").unwrap())).unwrap();
        doc.save_as(&path).unwrap();
        assert!(!doc.is_dirty());
        assert_eq!(doc.path(), Some(path.as_path()));

        let reopened = Document::open(&path).unwrap();
        assert_eq!(reopened.entity(), doc.entity());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_failed_reopen_keeps_entity() {
        let dir = temp_dir();
        let bad = dir.join("bad.entdef");
        fs::write(&bad, b"NOPE").unwrap();

        let mut doc = Document::from_entity(Entity::new("keep", "Keep").unwrap());
        doc.edit(|e| {
            e.rename("Edited");
            Ok(())
        })
        .unwrap();

        assert!(doc.reopen(&bad).is_err());
        assert_eq!(doc.entity().name(), "Edited");
        assert!(doc.is_dirty());

        fs::remove_dir_all(&dir).ok();
    }
}
