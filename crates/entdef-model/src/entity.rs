//! The entity aggregate: the unit of load and save

use crate::body_part::BodyPart;
use crate::hitbox::Hitbox;
use crate::ids;
use entdef_core::naming::generate_copy_name;
use entdef_core::{check_id, generate_id, EntdefError, Result, Vec2, CURRENT_FORMAT_VERSION};
use std::collections::BTreeMap;

/// Display name given to entities created from scratch
pub const UNTITLED_NAME: &str = "New Entity";

/// Axis-aligned bounds in entity-local coordinates
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    fn include(&mut self, min: Vec2, max: Vec2) {
        self.min.x = self.min.x.min(min.x);
        self.min.y = self.min.y.min(min.y);
        self.max.x = self.max.x.max(max.x);
        self.max.y = self.max.y.max(max.y);
    }
}

/// Top-level entity definition.
///
/// Owns its body parts (and through them their hitboxes) as a strict tree.
/// Body part ids are unique within the entity, entity-level hitbox ids are
/// unique within the entity, and hitbox ids are unique within their part;
/// every mutation that would break this fails and leaves the entity as it was.
/// Every id in the tree passes `entdef_core::is_valid_id`.
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    id: String,
    name: String,
    pivot: Vec2,
    body_parts: Vec<BodyPart>,
    hitboxes: Vec<Hitbox>,
    tags: Vec<String>,
    metadata: BTreeMap<String, serde_json::Value>,
    format_version: u32,
}

impl Entity {
    /// Create an empty entity. Fails with `InvalidId` for an unusable id.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        let id = id.into();
        check_id(&id)?;
        Ok(Self::with_checked_id(id, name.into()))
    }

    /// A fresh "New Entity" with a generated id
    pub fn new_untitled() -> Self {
        Self::with_checked_id(generate_id(), UNTITLED_NAME.to_string())
    }

    fn with_checked_id(id: String, name: String) -> Self {
        Self {
            id,
            name,
            pivot: Vec2::ZERO,
            body_parts: Vec::new(),
            hitboxes: Vec::new(),
            tags: Vec::new(),
            metadata: BTreeMap::new(),
            format_version: CURRENT_FORMAT_VERSION,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pivot(&self) -> Vec2 {
        self.pivot
    }

    pub fn body_parts(&self) -> &[BodyPart] {
        &self.body_parts
    }

    /// Entity-level hitboxes, positioned relative to the pivot
    pub fn hitboxes(&self) -> &[Hitbox] {
        &self.hitboxes
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn metadata(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.metadata
    }

    /// Container version this entity was materialized from
    pub fn format_version(&self) -> u32 {
        self.format_version
    }

    /// Record the container version. Only the codec layer should call this.
    pub fn stamp_format_version(&mut self, version: u32) {
        self.format_version = version;
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_pivot(&mut self, pivot: Vec2) {
        self.pivot = pivot;
    }

    pub fn add_body_part(&mut self, part: BodyPart) -> Result<()> {
        ids::push_unique(&mut self.body_parts, part, BodyPart::id)
    }

    /// Remove a part together with every hitbox it owns
    pub fn remove_body_part(&mut self, id: &str) -> Result<BodyPart> {
        let index = self.part_index(id)?;
        Ok(self.body_parts.remove(index))
    }

    pub fn find_body_part(&self, id: &str) -> Option<&BodyPart> {
        self.body_parts.iter().find(|p| p.id() == id)
    }

    pub fn body_part_mut(&mut self, id: &str) -> Option<&mut BodyPart> {
        self.body_parts.iter_mut().find(|p| p.id() == id)
    }

    pub fn rename_body_part_id(&mut self, id: &str, new_id: impl Into<String>) -> Result<()> {
        let new_id = new_id.into();
        check_id(&new_id)?;
        if new_id != id && self.find_body_part(&new_id).is_some() {
            return Err(EntdefError::DuplicateId(new_id));
        }
        let index = self.part_index(id)?;
        self.body_parts[index].set_id(new_id);
        Ok(())
    }

    /// Deep-copy a part (hitboxes included) right after the source part.
    ///
    /// The copy's id and name get a `_copyN` suffix. Returns the new id.
    pub fn duplicate_body_part(&mut self, id: &str) -> Result<String> {
        let index = self.part_index(id)?;
        let mut copy = self.body_parts[index].clone();

        let new_id = generate_copy_name(id, self.body_parts.iter().map(BodyPart::id));
        let names: Vec<&str> = self.body_parts.iter().map(BodyPart::name).collect();
        let new_name = generate_copy_name(copy.name(), names.iter().copied());

        copy.set_id(new_id.clone());
        copy.set_name(new_name);
        self.body_parts.insert(index + 1, copy);
        Ok(new_id)
    }

    /// Move a part to `index` in insertion order (clamped to the end)
    pub fn move_body_part(&mut self, id: &str, index: usize) -> Result<()> {
        let part = self.remove_body_part(id)?;
        let index = index.min(self.body_parts.len());
        self.body_parts.insert(index, part);
        Ok(())
    }

    /// Parts in draw order: ascending z-order, ties in insertion order
    pub fn sorted_body_parts(&self) -> Vec<&BodyPart> {
        let mut parts: Vec<&BodyPart> = self.body_parts.iter().collect();
        parts.sort_by_key(|p| p.z_order());
        parts
    }

    pub fn add_hitbox(&mut self, hitbox: Hitbox) -> Result<()> {
        ids::push_unique(&mut self.hitboxes, hitbox, Hitbox::id)
    }

    pub fn remove_hitbox(&mut self, id: &str) -> Result<Hitbox> {
        let index = self
            .hitboxes
            .iter()
            .position(|h| h.id() == id)
            .ok_or_else(|| EntdefError::NotFound(format!("entity hitbox '{}'", id)))?;
        Ok(self.hitboxes.remove(index))
    }

    pub fn find_hitbox(&self, id: &str) -> Option<&Hitbox> {
        self.hitboxes.iter().find(|h| h.id() == id)
    }

    pub fn hitbox_mut(&mut self, id: &str) -> Option<&mut Hitbox> {
        self.hitboxes.iter_mut().find(|h| h.id() == id)
    }

    /// Total number of hitboxes, entity-level and per part
    pub fn hitbox_count(&self) -> usize {
        self.hitboxes.len() + self.body_parts.iter().map(|p| p.hitboxes().len()).sum::<usize>()
    }

    pub fn set_tags(&mut self, tags: Vec<String>) {
        self.tags = tags;
    }

    /// Add a tag unless it is already present. Returns whether it was added.
    pub fn add_tag(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        if self.tags.contains(&tag) {
            return false;
        }
        self.tags.push(tag);
        true
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        self.tags.len() != before
    }

    pub fn set_metadata(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.metadata.insert(key.into(), value);
    }

    pub fn remove_metadata(&mut self, key: &str) -> Option<serde_json::Value> {
        self.metadata.remove(key)
    }

    /// Bounds of all visible parts and enabled entity-level hitboxes.
    ///
    /// `None` when nothing contributes.
    pub fn bounds(&self) -> Option<Bounds> {
        let mut bounds: Option<Bounds> = None;
        let mut include = |min: Vec2, max: Vec2| match bounds.as_mut() {
            Some(b) => b.include(min, max),
            None => bounds = Some(Bounds { min, max }),
        };

        for part in self.body_parts.iter().filter(|p| p.visible()) {
            include(part.position(), part.position() + part.size());
        }

        for hitbox in self.hitboxes.iter().filter(|h| h.enabled()) {
            let r = hitbox.bounds();
            let min = self.pivot + Vec2::new(r.x as f32, r.y as f32);
            let max = self.pivot + Vec2::new(r.right() as f32, r.bottom() as f32);
            include(min, max);
        }

        bounds
    }

    fn part_index(&self, id: &str) -> Result<usize> {
        self.body_parts
            .iter()
            .position(|p| p.id() == id)
            .ok_or_else(|| EntdefError::NotFound(format!("body part '{}'", id)))
    }
}
