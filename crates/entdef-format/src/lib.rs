//! entdef Format - `.entdef` serialization
//!
//! An `.entdef` file is a fixed little-endian header (magic, version,
//! payload length) followed by a JSON payload describing one entity.
//! Older payload versions are upgraded through the migration chain before
//! validation.

pub mod codec;
mod document;
mod format;
mod loader;
pub mod migrate;
mod saver;

pub use codec::{decode, encode, inspect, Header, HeaderInfo, HEADER_LEN, MAGIC};
pub use document::{Document, Modified};
pub use format::{BodyPartDoc, EntityDoc, HitboxDoc, TransformDoc};
pub use loader::{import_json, is_entdef, load_entity, load_entity_json};
pub use saver::{export_json, save_entity, save_entity_json};

pub use entdef_core::CURRENT_FORMAT_VERSION;
