//! entdef Model - The in-memory entity definition graph
//!
//! Ownership is a strict tree: an `Entity` owns its `BodyPart`s, each part
//! owns its `Hitbox`es. Ids are checked when they are created or renamed,
//! uniqueness is enforced by every mutating operation, and hitbox rects never
//! reach past the pixel range, so a value of these types is always valid to
//! encode apart from non-finite floats.

mod body_part;
mod entity;
mod hitbox;
pub mod ids;

pub use body_part::{BodyPart, PartTransform, DEFAULT_PART_SIZE};
pub use entity::{Bounds, Entity, UNTITLED_NAME};
pub use hitbox::{Hitbox, HitboxKind};
