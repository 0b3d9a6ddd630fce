//! Body parts: the visual/logical layers of an entity

use crate::hitbox::Hitbox;
use crate::ids;
use entdef_core::{check_id, EntdefError, Result, UvRect, Vec2};
use std::collections::HashSet;

/// Default size of a freshly created part, in local units
pub const DEFAULT_PART_SIZE: Vec2 = Vec2::new(64.0, 64.0);

/// Presentation transform applied on top of position and size
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PartTransform {
    /// Rotation in degrees
    pub rotation: f32,
    /// Uniform scale multiplier
    pub scale: f32,
    pub flip_x: bool,
    pub flip_y: bool,
}

impl Default for PartTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl PartTransform {
    pub const IDENTITY: Self = Self {
        rotation: 0.0,
        scale: 1.0,
        flip_x: false,
        flip_y: false,
    };

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_flip(mut self, flip_x: bool, flip_y: bool) -> Self {
        self.flip_x = flip_x;
        self.flip_y = flip_y;
        self
    }
}

/// One visual/logical layer of an entity, owning its hitboxes
#[derive(Clone, Debug, PartialEq)]
pub struct BodyPart {
    id: String,
    name: String,
    position: Vec2,
    size: Vec2,
    transform: PartTransform,
    texture_path: Option<String>,
    uv: UvRect,
    z_order: i32,
    visible: bool,
    hitboxes: Vec<Hitbox>,
}

impl BodyPart {
    /// Create a visible part of the default size. Fails with `InvalidId` for an unusable id.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        let id = id.into();
        check_id(&id)?;
        Ok(Self {
            id,
            name: name.into(),
            position: Vec2::ZERO,
            size: DEFAULT_PART_SIZE,
            transform: PartTransform::IDENTITY,
            texture_path: None,
            uv: UvRect::FULL,
            z_order: 0,
            visible: true,
            hitboxes: Vec::new(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn transform(&self) -> PartTransform {
        self.transform
    }

    pub fn texture_path(&self) -> Option<&str> {
        self.texture_path.as_deref()
    }

    pub fn uv(&self) -> UvRect {
        self.uv
    }

    pub fn z_order(&self) -> i32 {
        self.z_order
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn hitboxes(&self) -> &[Hitbox] {
        &self.hitboxes
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn set_size(&mut self, size: Vec2) {
        self.size = size;
    }

    pub fn set_transform(&mut self, transform: PartTransform) {
        self.transform = transform;
    }

    /// Store a texture reference. An empty path clears it.
    pub fn set_texture(&mut self, path: Option<String>) {
        self.texture_path = path.filter(|p| !p.is_empty());
    }

    pub fn set_uv(&mut self, uv: UvRect) {
        self.uv = uv;
    }

    /// Sort key for renderers; parts with equal values keep insertion order
    pub fn set_z_order(&mut self, z_order: i32) {
        self.z_order = z_order;
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn find_hitbox(&self, id: &str) -> Option<&Hitbox> {
        self.hitboxes.iter().find(|h| h.id() == id)
    }

    pub fn hitbox_mut(&mut self, id: &str) -> Option<&mut Hitbox> {
        self.hitboxes.iter_mut().find(|h| h.id() == id)
    }

    pub fn add_hitbox(&mut self, hitbox: Hitbox) -> Result<()> {
        ids::push_unique(&mut self.hitboxes, hitbox, Hitbox::id)
    }

    /// Remove a hitbox and hand it back to the caller
    pub fn remove_hitbox(&mut self, id: &str) -> Result<Hitbox> {
        let index = self
            .hitboxes
            .iter()
            .position(|h| h.id() == id)
            .ok_or_else(|| EntdefError::NotFound(format!("hitbox '{}' in part '{}'", id, self.id)))?;
        Ok(self.hitboxes.remove(index))
    }

    /// Change a hitbox id, keeping ids unique within this part
    pub fn rename_hitbox_id(&mut self, id: &str, new_id: impl Into<String>) -> Result<()> {
        let new_id = new_id.into();
        check_id(&new_id)?;
        if new_id != id && self.find_hitbox(&new_id).is_some() {
            return Err(EntdefError::DuplicateId(new_id));
        }
        let part_id = self.id.clone();
        let hitbox = self
            .hitbox_mut(id)
            .ok_or_else(|| EntdefError::NotFound(format!("hitbox '{}' in part '{}'", id, part_id)))?;
        hitbox.set_id(new_id);
        Ok(())
    }

    /// Rearrange hitboxes to follow `order`, which must name every hitbox exactly once
    pub fn reorder_hitboxes<S: AsRef<str>>(&mut self, order: &[S]) -> Result<()> {
        if order.len() != self.hitboxes.len() {
            return Err(EntdefError::InvalidReorder(format!(
                "expected {} hitbox ids, got {}",
                self.hitboxes.len(),
                order.len()
            )));
        }

        let mut seen = HashSet::new();
        let mut reordered = Vec::with_capacity(order.len());
        for id in order {
            let id = id.as_ref();
            if !seen.insert(id) {
                return Err(EntdefError::InvalidReorder(format!("hitbox '{}' listed twice", id)));
            }
            let hitbox = self
                .find_hitbox(id)
                .ok_or_else(|| EntdefError::NotFound(format!("hitbox '{}' in part '{}'", id, self.id)))?;
            reordered.push(hitbox.clone());
        }

        self.hitboxes = reordered;
        Ok(())
    }

    /// Move one hitbox to `index` (clamped to the end of the list)
    pub fn move_hitbox(&mut self, id: &str, index: usize) -> Result<()> {
        let hitbox = self.remove_hitbox(id)?;
        let index = index.min(self.hitboxes.len());
        self.hitboxes.insert(index, hitbox);
        Ok(())
    }

    /// Id for a new hitbox that does not collide with the existing ones
    pub fn next_hitbox_id(&self, base: &str) -> String {
        entdef_core::naming::ensure_unique_name(base, self.hitboxes.iter().map(Hitbox::id))
    }

    pub(crate) fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hitbox::HitboxKind;
    use entdef_core::PixelRect;

    fn hitbox(id: &str) -> Hitbox {
        Hitbox::new(id, HitboxKind::Collision, PixelRect::new(0, 0, 8, 8).unwrap()).unwrap()
    }

    fn ids(part: &BodyPart) -> Vec<&str> {
        part.hitboxes().iter().map(Hitbox::id).collect()
    }

    #[test]
    fn test_new_part_defaults() {
        let part = BodyPart::new("head", "Head").unwrap();
        assert_eq!(part.size(), DEFAULT_PART_SIZE);
        assert_eq!(part.uv(), UvRect::FULL);
        assert_eq!(part.transform(), PartTransform::IDENTITY);
        assert!(part.visible());
        assert!(part.texture_path().is_none());
    }

    #[test]
    fn test_invalid_part_id() {
        assert!(matches!(BodyPart::new("", "Blank"), Err(EntdefError::InvalidId(_))));
        assert!(matches!(BodyPart::new("a\tb", "Tab"), Err(EntdefError::InvalidId(_))));
    }

    #[test]
    fn test_add_duplicate_hitbox_fails() {
        let mut part = BodyPart::new("torso", "Torso").unwrap();
        part.add_hitbox(hitbox("body")).unwrap();
        let err = part.add_hitbox(hitbox("body")).unwrap_err();
        assert!(matches!(err, EntdefError::DuplicateId(_)));
        assert_eq!(part.hitboxes().len(), 1);
    }

    #[test]
    fn test_remove_missing_hitbox() {
        let mut part = BodyPart::new("torso", "Torso").unwrap();
        assert!(matches!(part.remove_hitbox("nope"), Err(EntdefError::NotFound(_))));
    }

    #[test]
    fn test_reorder_hitboxes() {
        let mut part = BodyPart::new("torso", "Torso").unwrap();
        for id in ["a", "b", "c"] {
            part.add_hitbox(hitbox(id)).unwrap();
        }
        part.reorder_hitboxes(&["c", "a", "b"]).unwrap();
        assert_eq!(ids(&part), ["c", "a", "b"]);

        assert!(part.reorder_hitboxes(&["a", "b"]).is_err());
        assert!(part.reorder_hitboxes(&["a", "a", "b"]).is_err());
        assert!(matches!(
            part.reorder_hitboxes(&["a", "b", "z"]),
            Err(EntdefError::NotFound(_))
        ));
        assert_eq!(ids(&part), ["c", "a", "b"]);
    }

    #[test]
    fn test_move_hitbox() {
        let mut part = BodyPart::new("torso", "Torso").unwrap();
        for id in ["a", "b", "c"] {
            part.add_hitbox(hitbox(id)).unwrap();
        }
        part.move_hitbox("a", 10).unwrap();
        assert_eq!(ids(&part), ["b", "c", "a"]);
        part.move_hitbox("c", 0).unwrap();
        assert_eq!(ids(&part), ["c", "b", "a"]);
    }

    #[test]
    fn test_rename_hitbox_id() {
        let mut part = BodyPart::new("torso", "Torso").unwrap();
        part.add_hitbox(hitbox("a")).unwrap();
        part.add_hitbox(hitbox("b")).unwrap();
        assert!(matches!(part.rename_hitbox_id("a", "b"), Err(EntdefError::DuplicateId(_))));
        part.rename_hitbox_id("a", "front").unwrap();
        assert_eq!(ids(&part), ["front", "b"]);
        assert!(matches!(part.rename_hitbox_id("front", ""), Err(EntdefError::InvalidId(_))));
        assert_eq!(ids(&part), ["front", "b"]);
    }

    #[test]
    fn test_empty_texture_clears() {
        let mut part = BodyPart::new("torso", "Torso").unwrap();
        part.set_texture(Some("textures/torso.png".into()));
        assert_eq!(part.texture_path(), Some("textures/torso.png"));
        part.set_texture(Some(String::new()));
        assert!(part.texture_path().is_none());
    }

    #[test]
    fn test_next_hitbox_id() {
        let mut part = BodyPart::new("torso", "Torso").unwrap();
        part.add_hitbox(hitbox("hitbox")).unwrap();
        assert_eq!(part.next_hitbox_id("hitbox"), "hitbox_1");
    }
}
