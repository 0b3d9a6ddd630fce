//! Typed rectangular zones attached to a body part

use entdef_core::{check_id, EntdefError, PixelRect, Result};
use std::fmt;

/// What a hitbox is used for by gameplay code.
///
/// The set is closed; project-specific zones go in `Custom` with a label.
/// Files store the lowercase variant name, never an ordinal.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum HitboxKind {
    #[default]
    Collision,
    Damage,
    Trigger,
    Interaction,
    Custom(String),
}

impl HitboxKind {
    /// Every variant name, in declaration order
    pub const NAMES: [&'static str; 5] = ["collision", "damage", "trigger", "interaction", "custom"];

    pub fn name(&self) -> &'static str {
        match self {
            HitboxKind::Collision => "collision",
            HitboxKind::Damage => "damage",
            HitboxKind::Trigger => "trigger",
            HitboxKind::Interaction => "interaction",
            HitboxKind::Custom(_) => "custom",
        }
    }

    /// Free-form label of a `Custom` kind
    pub fn label(&self) -> Option<&str> {
        match self {
            HitboxKind::Custom(label) => Some(label),
            _ => None,
        }
    }

    /// Rebuild a kind from its stored name and optional label.
    ///
    /// Returns `None` for unknown names and for `custom` without a label.
    pub fn from_parts(name: &str, label: Option<&str>) -> Option<Self> {
        match name {
            "collision" => Some(HitboxKind::Collision),
            "damage" => Some(HitboxKind::Damage),
            "trigger" => Some(HitboxKind::Trigger),
            "interaction" => Some(HitboxKind::Interaction),
            "custom" => label.map(|l| HitboxKind::Custom(l.to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for HitboxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HitboxKind::Custom(label) => write!(f, "custom({})", label),
            other => f.write_str(other.name()),
        }
    }
}

/// A named collision/interaction zone in body-part-local pixel coordinates
#[derive(Clone, Debug, PartialEq)]
pub struct Hitbox {
    id: String,
    kind: HitboxKind,
    bounds: PixelRect,
    enabled: bool,
}

impl Hitbox {
    /// Create an enabled hitbox.
    ///
    /// Fails with `InvalidId` for an empty id or one containing control
    /// characters, and with `InvalidBounds` for a rect `PixelRect::validate` rejects.
    pub fn new(id: impl Into<String>, kind: HitboxKind, bounds: PixelRect) -> Result<Self> {
        let id = id.into();
        check_id(&id)?;
        bounds.validate()?;
        Ok(Self {
            id,
            kind,
            bounds,
            enabled: true,
        })
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> &HitboxKind {
        &self.kind
    }

    pub fn bounds(&self) -> PixelRect {
        self.bounds
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Replace the bounds; the old bounds are kept if the new ones are rejected
    pub fn set_bounds(&mut self, bounds: PixelRect) -> Result<()> {
        bounds.validate()?;
        self.bounds = bounds;
        Ok(())
    }

    /// Set bounds from editor (float) coordinates, which must be whole pixels
    pub fn set_bounds_f32(&mut self, x: f32, y: f32, width: f32, height: f32) -> Result<()> {
        let bounds = PixelRect::from_f32(x, y, width, height)?;
        self.set_bounds(bounds)
    }

    /// Move without resizing. Fails if the far edge would leave the pixel range.
    pub fn set_position(&mut self, x: i32, y: i32) -> Result<()> {
        self.bounds = self.bounds.moved_to(x, y)?;
        Ok(())
    }

    pub fn set_kind(&mut self, kind: HitboxKind) {
        self.kind = kind;
    }

    /// Change the label of a custom hitbox
    pub fn rename(&mut self, label: impl Into<String>) -> Result<()> {
        match &mut self.kind {
            HitboxKind::Custom(current) => {
                *current = label.into();
                Ok(())
            }
            _ => Err(EntdefError::NotCustomHitbox(self.id.clone())),
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Id changes go through the owner so uniqueness can be checked
    pub(crate) fn set_id(&mut self, id: String) {
        self.id = id;
    }
}
