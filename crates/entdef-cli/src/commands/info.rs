//! File information command

use anyhow::{bail, Context, Result};
use entdef_format::{decode, inspect, HeaderInfo};
use entdef_model::Entity;

pub fn run(path: &str, format: &str) -> Result<()> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path))?;
    let header = inspect(&bytes).with_context(|| format!("{} is not an entity definition", path))?;
    let decoded = decode(&bytes);

    match format {
        "text" => print_text(path, &header, decoded.as_ref()),
        "json" => print_json(path, &header, decoded.as_ref())?,
        _ => bail!("Unknown format: {}", format),
    }

    Ok(())
}

fn print_text(path: &str, header: &HeaderInfo, decoded: Result<&Entity, &entdef_core::EntdefError>) {
    println!("File:            {}", path);
    println!("Format version:  {}", header.header.version);
    println!(
        "Payload:         {} bytes declared, {} available",
        header.header.payload_len, header.available
    );
    if let Some(hash) = &header.payload_hash {
        println!("Payload SHA-256: {}", hash.to_hex());
    }
    if header.trailing_bytes() > 0 {
        println!("Trailing bytes:  {}", header.trailing_bytes());
    }
    if header.needs_migration() {
        println!("Migration:       needed (run `entdef upgrade`)");
    }

    match decoded {
        Ok(entity) => {
            println!();
            println!("Entity:          {} ({})", entity.name(), entity.id());
            println!("Pivot:           ({}, {})", entity.pivot().x, entity.pivot().y);
            println!("Body parts:      {}", entity.body_parts().len());
            println!("Hitboxes:        {}", entity.hitbox_count());
            if !entity.tags().is_empty() {
                println!("Tags:            {}", entity.tags().join(", "));
            }
        }
        Err(e) => {
            println!();
            println!("Decode failed:   [{}] {}", e.kind(), e);
        }
    }
}

fn print_json(path: &str, header: &HeaderInfo, decoded: Result<&Entity, &entdef_core::EntdefError>) -> Result<()> {
    let entity = match decoded {
        Ok(entity) => serde_json::json!({
            "id": entity.id(),
            "name": entity.name(),
            "pivot": entity.pivot(),
            "body_parts": entity.body_parts().len(),
            "hitboxes": entity.hitbox_count(),
            "tags": entity.tags(),
        }),
        Err(_) => serde_json::Value::Null,
    };

    let output = serde_json::json!({
        "file": path,
        "format_version": header.header.version,
        "payload_len": header.header.payload_len,
        "available": header.available,
        "trailing_bytes": header.trailing_bytes(),
        "needs_migration": header.needs_migration(),
        "payload_hash": header.payload_hash.as_ref().map(|h| h.to_prefixed_hex()),
        "error": decoded.err().map(|e| serde_json::json!({
            "kind": e.kind().to_string(),
            "message": e.to_string(),
        })),
        "entity": entity,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
