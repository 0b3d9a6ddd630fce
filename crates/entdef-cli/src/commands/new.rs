//! Entity creation command

use anyhow::{bail, Context, Result};
use entdef_format::save_entity;
use entdef_model::{Entity, UNTITLED_NAME};
use std::path::Path;

pub fn run(path: &str, id: Option<&str>, name: Option<&str>) -> Result<()> {
    if Path::new(path).exists() {
        bail!("File already exists: {}", path);
    }

    let entity = match id {
        Some(id) => Entity::new(id, name.unwrap_or(UNTITLED_NAME))
            .with_context(|| format!("Cannot create entity '{}'", id))?,
        None => {
            let mut entity = Entity::new_untitled();
            if let Some(name) = name {
                entity.rename(name);
            }
            entity
        }
    };

    save_entity(path, &entity).with_context(|| format!("Failed to write {}", path))?;
    println!("Created entity '{}' ({}) at {}", entity.name(), entity.id(), path);

    Ok(())
}
