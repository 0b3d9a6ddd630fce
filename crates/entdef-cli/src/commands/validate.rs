//! File validation command

use anyhow::{Context, Result};
use entdef_format::decode;

pub fn run(path: &str) -> Result<()> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path))?;

    match decode(&bytes) {
        Ok(entity) => {
            println!(
                "{}: valid (format version {}, {} body part(s), {} hitbox(es))",
                path,
                entity.format_version(),
                entity.body_parts().len(),
                entity.hitbox_count()
            );
            Ok(())
        }
        Err(e) => {
            println!("{}: invalid [{}] {}", path, e.kind(), e);
            std::process::exit(1);
        }
    }
}
