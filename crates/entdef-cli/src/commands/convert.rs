//! JSON export/import and format upgrade commands

use super::open_document;
use anyhow::{Context, Result};
use entdef_core::CURRENT_FORMAT_VERSION;
use entdef_format::{export_json, load_entity, load_entity_json, save_entity, save_entity_json};

pub fn export(path: &str, output: Option<&str>, pretty: bool) -> Result<()> {
    let entity = load_entity(path).with_context(|| format!("Failed to load {}", path))?;

    match output {
        Some(out) => {
            save_entity_json(out, &entity, pretty).with_context(|| format!("Failed to write {}", out))?;
            println!("Exported '{}' to {}", entity.id(), out);
        }
        None => println!("{}", export_json(&entity, pretty)?),
    }

    Ok(())
}

pub fn import(json_path: &str, output: &str) -> Result<()> {
    let entity =
        load_entity_json(json_path).with_context(|| format!("Failed to import entity JSON from {}", json_path))?;

    save_entity(output, &entity).with_context(|| format!("Failed to write {}", output))?;
    println!("Imported '{}' into {}", entity.id(), output);

    Ok(())
}

pub fn upgrade(path: &str) -> Result<()> {
    let mut doc = open_document(path)?;
    let from = doc.entity().format_version();

    if from == CURRENT_FORMAT_VERSION {
        println!("{} is already at format version {}", path, CURRENT_FORMAT_VERSION);
        return Ok(());
    }

    doc.save().context("Failed to save upgraded entity")?;
    println!(
        "Upgraded {} from format version {} to {}",
        path, from, CURRENT_FORMAT_VERSION
    );

    Ok(())
}
