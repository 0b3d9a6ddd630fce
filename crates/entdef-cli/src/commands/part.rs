//! Body part management commands

use super::{open_document, save_document};
use crate::config::EntdefConfig;
use anyhow::{bail, Context, Result};
use clap::Subcommand;
use entdef_core::naming::ensure_unique_name;
use entdef_core::Vec2;
use entdef_model::BodyPart;

#[derive(Subcommand)]
pub enum PartCommands {
    /// Add a body part
    Add {
        /// Path to .entdef file
        file: String,

        /// Display name
        #[arg(long)]
        name: String,

        /// Part id (derived from the name if omitted)
        #[arg(long)]
        id: Option<String>,

        /// Position relative to the entity pivot, x
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        x: f32,

        /// Position relative to the entity pivot, y
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        y: f32,

        /// Width in pixels (config default if omitted)
        #[arg(long)]
        width: Option<f32>,

        /// Height in pixels (config default if omitted)
        #[arg(long)]
        height: Option<f32>,

        /// Texture path
        #[arg(long)]
        texture: Option<String>,

        /// Draw order, lower draws first
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        z_order: i32,
    },

    /// Remove a body part and all of its hitboxes
    Remove {
        /// Path to .entdef file
        file: String,

        /// Part id
        id: String,
    },

    /// List body parts in draw order
    List {
        /// Path to .entdef file
        file: String,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Copy a body part under a new id
    Duplicate {
        /// Path to .entdef file
        file: String,

        /// Part id
        id: String,
    },

    /// Move a body part to a new position in the part list
    Move {
        /// Path to .entdef file
        file: String,

        /// Part id
        id: String,

        /// Target index
        index: usize,
    },
}

pub fn run(cmd: PartCommands, config: &EntdefConfig) -> Result<()> {
    match cmd {
        PartCommands::Add {
            file,
            name,
            id,
            x,
            y,
            width,
            height,
            texture,
            z_order,
        } => {
            let size = Vec2::new(
                width.unwrap_or(config.part_size.x),
                height.unwrap_or(config.part_size.y),
            );
            add(&file, &name, id.as_deref(), Vec2::new(x, y), size, texture, z_order)
        }
        PartCommands::Remove { file, id } => remove(&file, &id),
        PartCommands::List { file, format } => list(&file, &format),
        PartCommands::Duplicate { file, id } => duplicate(&file, &id),
        PartCommands::Move { file, id, index } => move_to(&file, &id, index),
    }
}

fn add(
    path: &str,
    name: &str,
    id: Option<&str>,
    position: Vec2,
    size: Vec2,
    texture: Option<String>,
    z_order: i32,
) -> Result<()> {
    if !(size.is_finite() && size.x > 0.0 && size.y > 0.0) {
        bail!("Part size must be positive, got {}x{}", size.x, size.y);
    }

    let mut doc = open_document(path)?;
    let id = match id {
        Some(id) => id.to_string(),
        None => ensure_unique_name(
            &default_part_id(name),
            doc.entity().body_parts().iter().map(BodyPart::id),
        ),
    };

    let mut part =
        BodyPart::new(id.clone(), name).with_context(|| format!("Cannot create body part '{}'", id))?;
    part.set_position(position);
    part.set_size(size);
    part.set_texture(texture);
    part.set_z_order(z_order);

    doc.edit(|entity| entity.add_body_part(part))
        .with_context(|| format!("Failed to add body part '{}'", id))?;
    save_document(&mut doc)?;

    println!("Added body part '{}' to {}", id, path);
    Ok(())
}

fn remove(path: &str, id: &str) -> Result<()> {
    let mut doc = open_document(path)?;
    let removed = doc
        .edit(|entity| entity.remove_body_part(id))
        .with_context(|| format!("Failed to remove body part '{}'", id))?;
    save_document(&mut doc)?;

    println!(
        "Removed body part '{}' ({} hitbox(es))",
        removed.id(),
        removed.hitboxes().len()
    );
    Ok(())
}

fn list(path: &str, format: &str) -> Result<()> {
    let doc = open_document(path)?;
    let parts = doc.entity().sorted_body_parts();

    match format {
        "text" => {
            if parts.is_empty() {
                println!("No body parts.");
            }
            for part in parts {
                let hidden = if part.visible() { "" } else { " [hidden]" };
                println!(
                    "  [{}] {} '{}' at ({}, {}) size {}x{}, {} hitbox(es){}",
                    part.z_order(),
                    part.id(),
                    part.name(),
                    part.position().x,
                    part.position().y,
                    part.size().x,
                    part.size().y,
                    part.hitboxes().len(),
                    hidden
                );
            }
        }
        "json" => {
            let parts: Vec<serde_json::Value> = parts
                .iter()
                .map(|part| {
                    serde_json::json!({
                        "id": part.id(),
                        "name": part.name(),
                        "position": part.position(),
                        "size": part.size(),
                        "texture_path": part.texture_path(),
                        "z_order": part.z_order(),
                        "visible": part.visible(),
                        "hitboxes": part.hitboxes().len(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&parts)?);
        }
        _ => bail!("Unknown format: {}", format),
    }

    Ok(())
}

fn duplicate(path: &str, id: &str) -> Result<()> {
    let mut doc = open_document(path)?;
    let new_id = doc
        .edit(|entity| entity.duplicate_body_part(id))
        .with_context(|| format!("Failed to duplicate body part '{}'", id))?;
    save_document(&mut doc)?;

    println!("Duplicated body part '{}' as '{}'", id, new_id);
    Ok(())
}

fn move_to(path: &str, id: &str, index: usize) -> Result<()> {
    let mut doc = open_document(path)?;
    doc.edit(|entity| entity.move_body_part(id, index))
        .with_context(|| format!("Failed to move body part '{}'", id))?;
    save_document(&mut doc)?;

    println!("Moved body part '{}' to index {}", id, index);
    Ok(())
}

/// Lowercase the name and join words with underscores, e.g. "Left Arm" -> "left_arm"
fn default_part_id(name: &str) -> String {
    let id = name
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_");
    if id.is_empty() {
        "part".to_string()
    } else {
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_part_id() {
        assert_eq!(default_part_id("Left Arm"), "left_arm");
        assert_eq!(default_part_id("  Head "), "head");
        assert_eq!(default_part_id("   "), "part");
    }
}
