//! Payload document definitions
//!
//! These structs are the JSON shape stored inside an `.entdef` container. They
//! mirror the model one-to-one but keep the wire schema separate from the
//! in-memory types, so the model can evolve without silently changing files.

use entdef_core::{is_valid_id, EntdefError, ErrorKind, PixelRect, Result, UvRect, Vec2};
use entdef_model::{BodyPart, Entity, Hitbox, HitboxKind, PartTransform};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Root of a payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDoc {
    pub format_version: u32,
    pub id: String,
    pub name: String,
    pub pivot: Vec2,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
    /// Entity-level hitboxes
    #[serde(default)]
    pub hitboxes: Vec<HitboxDoc>,
    #[serde(default)]
    pub body_parts: Vec<BodyPartDoc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyPartDoc {
    pub id: String,
    pub name: String,
    pub position: Vec2,
    pub size: Vec2,
    pub transform: TransformDoc,
    pub texture_path: Option<String>,
    pub uv: UvRect,
    pub z_order: i32,
    pub visible: bool,
    #[serde(default)]
    pub hitboxes: Vec<HitboxDoc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformDoc {
    pub rotation: f32,
    pub scale: f32,
    pub flip_x: bool,
    pub flip_y: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitboxDoc {
    pub id: String,
    /// Lowercase kind name, see `HitboxKind::NAMES`
    #[serde(rename = "type")]
    pub kind: String,
    /// Required when `type` is `custom`, otherwise null
    pub label: Option<String>,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub enabled: bool,
}

impl From<PartTransform> for TransformDoc {
    fn from(t: PartTransform) -> Self {
        Self {
            rotation: t.rotation,
            scale: t.scale,
            flip_x: t.flip_x,
            flip_y: t.flip_y,
        }
    }
}

impl From<TransformDoc> for PartTransform {
    fn from(t: TransformDoc) -> Self {
        PartTransform {
            rotation: t.rotation,
            scale: t.scale,
            flip_x: t.flip_x,
            flip_y: t.flip_y,
        }
    }
}

impl HitboxDoc {
    pub fn from_hitbox(hitbox: &Hitbox) -> Self {
        let bounds = hitbox.bounds();
        Self {
            id: hitbox.id().to_string(),
            kind: hitbox.kind().name().to_string(),
            label: hitbox.kind().label().map(str::to_string),
            x: bounds.x,
            y: bounds.y,
            width: bounds.width,
            height: bounds.height,
            enabled: hitbox.enabled(),
        }
    }

    fn validate(&self, path: &str) -> Result<()> {
        check_id(&format!("{}.id", path), &self.id)?;
        if HitboxKind::from_parts(&self.kind, self.label.as_deref()).is_none() {
            let message = if self.kind == "custom" {
                "custom hitbox requires a label".to_string()
            } else {
                format!(
                    "unknown hitbox type '{}', expected one of {:?}",
                    self.kind,
                    HitboxKind::NAMES
                )
            };
            return Err(EntdefError::integrity(format!("{}.type", path), message));
        }
        if self.kind != "custom" && self.label.is_some() {
            return Err(EntdefError::integrity(
                format!("{}.label", path),
                format!("'{}' hitboxes carry no label", self.kind),
            ));
        }
        if self.width <= 0 || self.height <= 0 {
            return Err(EntdefError::integrity(
                format!("{}.width", path),
                format!("size must be positive, got {}x{}", self.width, self.height),
            ));
        }
        if self.x.checked_add(self.width).is_none() {
            return Err(EntdefError::integrity(
                format!("{}.width", path),
                format!("right edge {} + {} overflows", self.x, self.width),
            ));
        }
        if self.y.checked_add(self.height).is_none() {
            return Err(EntdefError::integrity(
                format!("{}.height", path),
                format!("bottom edge {} + {} overflows", self.y, self.height),
            ));
        }
        Ok(())
    }

    fn into_hitbox(self, path: &str) -> Result<Hitbox> {
        let kind = HitboxKind::from_parts(&self.kind, self.label.as_deref())
            .ok_or_else(|| EntdefError::integrity(format!("{}.type", path), "invalid hitbox type"))?;
        let bounds = PixelRect {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        };
        let hitbox = Hitbox::new(self.id, kind, bounds).map_err(|e| {
            let field = if e.kind() == ErrorKind::InvalidId { "id" } else { "width" };
            EntdefError::integrity(format!("{}.{}", path, field), e.to_string())
        })?;
        Ok(hitbox.with_enabled(self.enabled))
    }
}

impl BodyPartDoc {
    pub fn from_part(part: &BodyPart) -> Self {
        Self {
            id: part.id().to_string(),
            name: part.name().to_string(),
            position: part.position(),
            size: part.size(),
            transform: part.transform().into(),
            texture_path: part.texture_path().map(str::to_string),
            uv: part.uv(),
            z_order: part.z_order(),
            visible: part.visible(),
            hitboxes: part.hitboxes().iter().map(HitboxDoc::from_hitbox).collect(),
        }
    }

    fn validate(&self, path: &str) -> Result<()> {
        check_id(&format!("{}.id", path), &self.id)?;
        check_vec2(&format!("{}.position", path), self.position)?;
        check_vec2(&format!("{}.size", path), self.size)?;
        check_f32(&format!("{}.transform.rotation", path), self.transform.rotation)?;
        check_f32(&format!("{}.transform.scale", path), self.transform.scale)?;
        if !self.uv.is_finite() {
            return Err(EntdefError::integrity(format!("{}.uv", path), "non-finite value"));
        }
        validate_hitboxes(&format!("{}.hitboxes", path), &self.hitboxes)
    }

    fn into_part(self, path: &str) -> Result<BodyPart> {
        let mut part = BodyPart::new(self.id, self.name)
            .map_err(|e| EntdefError::integrity(format!("{}.id", path), e.to_string()))?;
        part.set_position(self.position);
        part.set_size(self.size);
        part.set_transform(self.transform.into());
        part.set_texture(self.texture_path);
        part.set_uv(self.uv);
        part.set_z_order(self.z_order);
        part.set_visible(self.visible);
        for (i, hitbox) in self.hitboxes.into_iter().enumerate() {
            let hitbox_path = format!("{}.hitboxes[{}]", path, i);
            let hitbox = hitbox.into_hitbox(&hitbox_path)?;
            part.add_hitbox(hitbox)
                .map_err(|e| EntdefError::integrity(format!("{}.id", hitbox_path), e.to_string()))?;
        }
        Ok(part)
    }
}

impl EntityDoc {
    /// Snapshot a live entity. Never mutates the source.
    pub fn from_entity(entity: &Entity, format_version: u32) -> Self {
        Self {
            format_version,
            id: entity.id().to_string(),
            name: entity.name().to_string(),
            pivot: entity.pivot(),
            tags: entity.tags().to_vec(),
            metadata: entity.metadata().clone(),
            hitboxes: entity.hitboxes().iter().map(HitboxDoc::from_hitbox).collect(),
            body_parts: entity.body_parts().iter().map(BodyPartDoc::from_part).collect(),
        }
    }

    /// Check every invariant the model enforces, reporting the first failure
    /// with the path of the offending field.
    pub fn validate(&self) -> Result<()> {
        check_id("id", &self.id)?;
        check_vec2("pivot", self.pivot)?;
        validate_hitboxes("hitboxes", &self.hitboxes)?;

        let mut seen = HashSet::new();
        for (i, part) in self.body_parts.iter().enumerate() {
            let path = format!("body_parts[{}]", i);
            part.validate(&path)?;
            if !seen.insert(part.id.as_str()) {
                return Err(EntdefError::integrity(
                    format!("{}.id", path),
                    format!("duplicate body part id '{}'", part.id),
                ));
            }
        }
        Ok(())
    }

    /// Validate and build the entity. Nothing is returned unless every part
    /// and hitbox was reconstructed.
    pub fn into_entity(self) -> Result<Entity> {
        self.validate()?;

        let mut entity =
            Entity::new(self.id, self.name).map_err(|e| EntdefError::integrity("id", e.to_string()))?;
        entity.set_pivot(self.pivot);
        entity.set_tags(self.tags);
        for (key, value) in self.metadata {
            entity.set_metadata(key, value);
        }
        for (i, hitbox) in self.hitboxes.into_iter().enumerate() {
            let path = format!("hitboxes[{}]", i);
            let hitbox = hitbox.into_hitbox(&path)?;
            entity
                .add_hitbox(hitbox)
                .map_err(|e| EntdefError::integrity(format!("{}.id", path), e.to_string()))?;
        }
        for (i, part) in self.body_parts.into_iter().enumerate() {
            let path = format!("body_parts[{}]", i);
            let part = part.into_part(&path)?;
            entity
                .add_body_part(part)
                .map_err(|e| EntdefError::integrity(format!("{}.id", path), e.to_string()))?;
        }
        entity.stamp_format_version(self.format_version);
        Ok(entity)
    }
}

fn validate_hitboxes(path: &str, hitboxes: &[HitboxDoc]) -> Result<()> {
    let mut seen = HashSet::new();
    for (i, hitbox) in hitboxes.iter().enumerate() {
        let hitbox_path = format!("{}[{}]", path, i);
        hitbox.validate(&hitbox_path)?;
        if !seen.insert(hitbox.id.as_str()) {
            return Err(EntdefError::integrity(
                format!("{}.id", hitbox_path),
                format!("duplicate hitbox id '{}'", hitbox.id),
            ));
        }
    }
    Ok(())
}

fn check_id(path: &str, id: &str) -> Result<()> {
    if is_valid_id(id) {
        Ok(())
    } else {
        Err(EntdefError::integrity(path, format!("invalid id {:?}", id)))
    }
}

fn check_f32(path: &str, value: f32) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(EntdefError::integrity(path, format!("non-finite value {}", value)))
    }
}

fn check_vec2(path: &str, v: Vec2) -> Result<()> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(EntdefError::integrity(path, format!("non-finite value ({}, {})", v.x, v.y)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use entdef_core::CURRENT_FORMAT_VERSION;

    fn sample_entity() -> Entity {
        let mut entity = Entity::new("ent-1", "Knight").unwrap();
        entity.set_pivot(Vec2::new(32.0, 60.0));
        let mut torso = BodyPart::new("torso", "Torso").unwrap();
        torso.set_texture(Some("knight.png".into()));
        torso
            .add_hitbox(
                Hitbox::new(
                    "hurt",
                    HitboxKind::Custom("weak_spot".into()),
                    PixelRect::new(4, 4, 8, 8).unwrap(),
                )
                .unwrap(),
            )
            .unwrap();
        entity.add_body_part(torso).unwrap();
        entity
    }

    #[test]
    fn test_doc_roundtrip_through_model() {
        let entity = sample_entity();
        let doc = EntityDoc::from_entity(&entity, CURRENT_FORMAT_VERSION);
        assert_eq!(doc.body_parts[0].hitboxes[0].kind, "custom");
        assert_eq!(doc.body_parts[0].hitboxes[0].label.as_deref(), Some("weak_spot"));
        assert_eq!(doc.into_entity().unwrap(), entity);
    }

    #[test]
    fn test_unknown_hitbox_type_reports_path() {
        let mut doc = EntityDoc::from_entity(&sample_entity(), CURRENT_FORMAT_VERSION);
        doc.body_parts[0].hitboxes[0].kind = "explosion".into();
        match doc.into_entity().unwrap_err() {
            EntdefError::DataIntegrity { path, .. } => {
                assert_eq!(path, "body_parts[0].hitboxes[0].type")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicate_part_ids_rejected() {
        let mut doc = EntityDoc::from_entity(&sample_entity(), CURRENT_FORMAT_VERSION);
        let copy = doc.body_parts[0].clone();
        doc.body_parts.push(copy);
        match doc.validate().unwrap_err() {
            EntdefError::DataIntegrity { path, .. } => assert_eq!(path, "body_parts[1].id"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut doc = EntityDoc::from_entity(&sample_entity(), CURRENT_FORMAT_VERSION);
        doc.body_parts[0].size.x = f32::INFINITY;
        assert!(matches!(
            doc.validate(),
            Err(EntdefError::DataIntegrity { ref path, .. }) if path == "body_parts[0].size"
        ));
    }

    #[test]
    fn test_label_on_builtin_type_rejected() {
        let mut doc = EntityDoc::from_entity(&sample_entity(), CURRENT_FORMAT_VERSION);
        doc.body_parts[0].hitboxes[0].kind = "damage".into();
        match doc.into_entity().unwrap_err() {
            EntdefError::DataIntegrity { path, .. } => {
                assert_eq!(path, "body_parts[0].hitboxes[0].label")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_overflowing_extent_rejected() {
        let mut doc = EntityDoc::from_entity(&sample_entity(), CURRENT_FORMAT_VERSION);
        doc.body_parts[0].hitboxes[0].x = i32::MAX - 1;
        assert!(matches!(
            doc.validate(),
            Err(EntdefError::DataIntegrity { ref path, .. }) if path == "body_parts[0].hitboxes[0].width"
        ));

        let mut doc = EntityDoc::from_entity(&sample_entity(), CURRENT_FORMAT_VERSION);
        doc.body_parts[0].hitboxes[0].y = i32::MAX;
        assert!(matches!(
            doc.validate(),
            Err(EntdefError::DataIntegrity { ref path, .. }) if path == "body_parts[0].hitboxes[0].height"
        ));
    }

    #[test]
    fn test_invalid_ids_reported_at_field() {
        let mut doc = EntityDoc::from_entity(&sample_entity(), CURRENT_FORMAT_VERSION);
        doc.body_parts[0].id = String::new();
        assert!(matches!(
            doc.clone().into_entity(),
            Err(EntdefError::DataIntegrity { ref path, .. }) if path == "body_parts[0].id"
        ));

        doc.body_parts[0].id = "torso".into();
        doc.id = "\u{1b}[2J".into();
        assert!(matches!(
            doc.into_entity(),
            Err(EntdefError::DataIntegrity { ref path, .. }) if path == "id"
        ));
    }

    #[test]
    fn test_hitbox_type_serializes_as_name() {
        let doc = HitboxDoc {
            id: "feet".into(),
            kind: "collision".into(),
            label: None,
            x: 0,
            y: 0,
            width: 4,
            height: 2,
            enabled: true,
        };
        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.contains("\"type\":\"collision\""));
    }
}
