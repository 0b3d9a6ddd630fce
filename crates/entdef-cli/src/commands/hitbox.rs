//! Hitbox management commands

use super::{open_document, save_document};
use crate::config::EntdefConfig;
use anyhow::{anyhow, Context, Result};
use clap::Subcommand;
use entdef_core::naming::ensure_unique_name;
use entdef_core::{EntdefError, PixelRect};
use entdef_model::{Entity, Hitbox, HitboxKind};

#[derive(Subcommand)]
pub enum HitboxCommands {
    /// Add a hitbox to a body part, or to the entity itself
    Add {
        /// Path to .entdef file
        file: String,

        /// Owning body part id (entity-level if omitted)
        #[arg(long)]
        part: Option<String>,

        /// Hitbox id (derived from the type if omitted)
        #[arg(long)]
        id: Option<String>,

        /// Hitbox type: collision, damage, trigger, interaction or custom
        #[arg(long = "type", default_value = "collision")]
        kind: String,

        /// Label for custom hitboxes
        #[arg(long)]
        label: Option<String>,

        /// Left edge in pixels, relative to the owner
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        x: i32,

        /// Top edge in pixels, relative to the owner
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        y: i32,

        /// Width in pixels (config default if omitted)
        #[arg(long)]
        width: Option<i32>,

        /// Height in pixels (config default if omitted)
        #[arg(long)]
        height: Option<i32>,

        /// Create the hitbox disabled
        #[arg(long)]
        disabled: bool,
    },

    /// Remove a hitbox
    Remove {
        /// Path to .entdef file
        file: String,

        /// Hitbox id
        id: String,

        /// Owning body part id (entity-level if omitted)
        #[arg(long)]
        part: Option<String>,
    },

    /// List every hitbox in the entity
    List {
        /// Path to .entdef file
        file: String,
    },
}

pub fn run(cmd: HitboxCommands, config: &EntdefConfig) -> Result<()> {
    match cmd {
        HitboxCommands::Add {
            file,
            part,
            id,
            kind,
            label,
            x,
            y,
            width,
            height,
            disabled,
        } => {
            let kind = HitboxKind::from_parts(&kind, label.as_deref())
                .ok_or_else(|| anyhow!("Unknown hitbox type '{}' (custom types need --label)", kind))?;
            let bounds = PixelRect::new(
                x,
                y,
                width.unwrap_or(config.hitbox_width),
                height.unwrap_or(config.hitbox_height),
            )?;
            add(&file, part.as_deref(), id.as_deref(), kind, bounds, !disabled)
        }
        HitboxCommands::Remove { file, id, part } => remove(&file, &id, part.as_deref()),
        HitboxCommands::List { file } => list(&file),
    }
}

fn add(
    path: &str,
    part: Option<&str>,
    id: Option<&str>,
    kind: HitboxKind,
    bounds: PixelRect,
    enabled: bool,
) -> Result<()> {
    let mut doc = open_document(path)?;
    let id = match id {
        Some(id) => id.to_string(),
        None => default_hitbox_id(doc.entity(), part, &kind)?,
    };
    let hitbox = Hitbox::new(id.clone(), kind, bounds)
        .with_context(|| format!("Cannot create hitbox '{}'", id))?
        .with_enabled(enabled);

    doc.edit(|entity| match part {
        Some(part_id) => entity
            .body_part_mut(part_id)
            .ok_or_else(|| EntdefError::NotFound(format!("body part '{}'", part_id)))?
            .add_hitbox(hitbox),
        None => entity.add_hitbox(hitbox),
    })
    .with_context(|| format!("Failed to add hitbox '{}'", id))?;
    save_document(&mut doc)?;

    println!("Added hitbox '{}' to {}", id, owner_label(part));
    Ok(())
}

fn remove(path: &str, id: &str, part: Option<&str>) -> Result<()> {
    let mut doc = open_document(path)?;
    doc.edit(|entity| match part {
        Some(part_id) => entity
            .body_part_mut(part_id)
            .ok_or_else(|| EntdefError::NotFound(format!("body part '{}'", part_id)))?
            .remove_hitbox(id),
        None => entity.remove_hitbox(id),
    })
    .with_context(|| format!("Failed to remove hitbox '{}'", id))?;
    save_document(&mut doc)?;

    println!("Removed hitbox '{}' from {}", id, owner_label(part));
    Ok(())
}

fn list(path: &str) -> Result<()> {
    let doc = open_document(path)?;
    let entity = doc.entity();

    if entity.hitbox_count() == 0 {
        println!("No hitboxes.");
        return Ok(());
    }

    print_hitboxes("entity", entity.hitboxes());
    for part in entity.body_parts() {
        print_hitboxes(&format!("part '{}'", part.id()), part.hitboxes());
    }
    Ok(())
}

fn print_hitboxes(owner: &str, hitboxes: &[Hitbox]) {
    if hitboxes.is_empty() {
        return;
    }
    println!("{}:", owner);
    for hitbox in hitboxes {
        let b = hitbox.bounds();
        let disabled = if hitbox.enabled() { "" } else { " [disabled]" };
        println!(
            "  {} ({}) at ({}, {}) size {}x{}{}",
            hitbox.id(),
            hitbox.kind(),
            b.x,
            b.y,
            b.width,
            b.height,
            disabled
        );
    }
}

fn default_hitbox_id(entity: &Entity, part: Option<&str>, kind: &HitboxKind) -> Result<String> {
    let base = kind.label().unwrap_or(kind.name());
    match part {
        Some(part_id) => {
            let part = entity
                .find_body_part(part_id)
                .ok_or_else(|| anyhow!("Body part '{}' not found", part_id))?;
            Ok(part.next_hitbox_id(base))
        }
        None => Ok(ensure_unique_name(base, entity.hitboxes().iter().map(Hitbox::id))),
    }
}

fn owner_label(part: Option<&str>) -> String {
    match part {
        Some(part_id) => format!("body part '{}'", part_id),
        None => "entity".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use entdef_model::BodyPart;

    #[test]
    fn test_default_hitbox_id() {
        let mut entity = Entity::new("ent-1", "Test").unwrap();
        let mut arm = BodyPart::new("arm", "Arm").unwrap();
        let bounds = PixelRect::new(0, 0, 4, 4).unwrap();
        arm.add_hitbox(Hitbox::new("damage", HitboxKind::Damage, bounds).unwrap())
            .unwrap();
        entity.add_body_part(arm).unwrap();

        let id = default_hitbox_id(&entity, Some("arm"), &HitboxKind::Damage).unwrap();
        assert_eq!(id, "damage_1");

        let id = default_hitbox_id(&entity, None, &HitboxKind::Custom("weak_spot".into())).unwrap();
        assert_eq!(id, "weak_spot");

        assert!(default_hitbox_id(&entity, Some("leg"), &HitboxKind::Trigger).is_err());
    }
}
