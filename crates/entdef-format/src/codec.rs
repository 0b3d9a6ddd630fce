//! The `.entdef` binary container
//!
//! Layout, all integers little-endian:
//!
//! | offset | size | field                         |
//! |-------:|-----:|-------------------------------|
//! | 0      | 4    | magic `b"ENTD"`               |
//! | 4      | 4    | format version (`u32`)        |
//! | 8      | 4    | payload length (`u32`)        |
//! | 12     | n    | payload: UTF-8 JSON object    |
//!
//! Bytes after the declared payload are ignored.

use crate::format::EntityDoc;
use crate::migrate::migrate;
use entdef_core::{ContentHash, EntdefError, Result, CURRENT_FORMAT_VERSION};
use entdef_model::Entity;
use tracing::{debug, warn};

/// Sentinel at the start of every container
pub const MAGIC: [u8; 4] = *b"ENTD";

/// Size of the fixed header preceding the payload
pub const HEADER_LEN: usize = 12;

/// Decoded fixed header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub version: u32,
    pub payload_len: u32,
}

impl Header {
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut bytes = [0u8; HEADER_LEN];
        bytes[0..4].copy_from_slice(&MAGIC);
        bytes[4..8].copy_from_slice(&self.version.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.payload_len.to_le_bytes());
        bytes
    }

    /// Parse the fixed header from the start of `bytes`.
    ///
    /// A buffer that ends before the header is complete is reported as
    /// truncated as long as what is there still matches the magic.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let magic_len = bytes.len().min(MAGIC.len());
        if bytes[..magic_len] != MAGIC[..magic_len] {
            return Err(EntdefError::InvalidFormat(format!(
                "magic number mismatch (got {:?}, expected {:?})",
                String::from_utf8_lossy(&bytes[..magic_len]),
                String::from_utf8_lossy(&MAGIC)
            )));
        }
        if bytes.len() < HEADER_LEN {
            return Err(EntdefError::TruncatedFile {
                declared: HEADER_LEN,
                available: bytes.len(),
            });
        }

        let version = read_u32(&bytes[4..8]);
        let payload_len = read_u32(&bytes[8..12]);
        Ok(Self {
            version,
            payload_len,
        })
    }
}

/// What a container says about itself, read without parsing the payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderInfo {
    pub header: Header,
    /// Payload bytes actually present after the header
    pub available: usize,
    /// Digest of the declared payload, when it is fully present
    pub payload_hash: Option<ContentHash>,
}

impl HeaderInfo {
    pub fn is_truncated(&self) -> bool {
        self.available < self.header.payload_len as usize
    }

    pub fn trailing_bytes(&self) -> usize {
        self.available.saturating_sub(self.header.payload_len as usize)
    }

    pub fn needs_migration(&self) -> bool {
        self.header.version < CURRENT_FORMAT_VERSION
    }
}

/// Read the header and fingerprint the payload without decoding it
pub fn inspect(bytes: &[u8]) -> Result<HeaderInfo> {
    let header = Header::parse(bytes)?;
    let available = bytes.len() - HEADER_LEN;
    let declared = header.payload_len as usize;
    let payload_hash = if available >= declared {
        Some(ContentHash::from_bytes(&bytes[HEADER_LEN..HEADER_LEN + declared]))
    } else {
        None
    };
    Ok(HeaderInfo {
        header,
        available,
        payload_hash,
    })
}

/// Serialize the payload document for an entity at the current version
pub fn encode_payload(entity: &Entity) -> Result<Vec<u8>> {
    let doc = EntityDoc::from_entity(entity, CURRENT_FORMAT_VERSION);
    doc.validate()?;
    Ok(serde_json::to_vec(&doc)?)
}

/// Encode an entity into a complete container.
///
/// The same entity always produces the same bytes. Only an entity holding
/// non-finite numbers is rejected, with a `DataIntegrity` error.
pub fn encode(entity: &Entity) -> Result<Vec<u8>> {
    let payload = encode_payload(entity)?;
    let payload_len = u32::try_from(payload.len()).map_err(|_| {
        EntdefError::InvalidFormat(format!("payload of {} bytes exceeds u32 length field", payload.len()))
    })?;

    let header = Header {
        version: CURRENT_FORMAT_VERSION,
        payload_len,
    };

    let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
    bytes.extend_from_slice(&header.to_bytes());
    bytes.extend_from_slice(&payload);

    debug!(
        "Encoded entity '{}' ({} parts) into {} bytes",
        entity.id(),
        entity.body_parts().len(),
        bytes.len()
    );
    Ok(bytes)
}

/// Decode a container into a fully validated entity.
///
/// Checks run in order: magic, version, declared length, payload syntax,
/// migration, structure, domain invariants. The first failure is returned
/// and no partially built entity escapes.
pub fn decode(bytes: &[u8]) -> Result<Entity> {
    let header = Header::parse(bytes)?;

    if header.version == 0 || header.version > CURRENT_FORMAT_VERSION {
        return Err(EntdefError::UnsupportedVersion {
            found: header.version,
            supported: CURRENT_FORMAT_VERSION,
        });
    }

    let declared = header.payload_len as usize;
    let available = bytes.len() - HEADER_LEN;
    if available < declared {
        return Err(EntdefError::TruncatedFile {
            declared,
            available,
        });
    }
    if available > declared {
        warn!("Ignoring {} trailing bytes after entity payload", available - declared);
    }

    let payload = &bytes[HEADER_LEN..HEADER_LEN + declared];
    let entity = decode_payload(payload, header.version)?;

    debug!(
        "Decoded entity '{}' (format version {}, {} parts)",
        entity.id(),
        header.version,
        entity.body_parts().len()
    );
    Ok(entity)
}

/// Parse a bare payload stored at `version`, migrating it first if needed
pub fn decode_payload(payload: &[u8], version: u32) -> Result<Entity> {
    let value: serde_json::Value = serde_json::from_slice(payload)
        .map_err(|e| EntdefError::InvalidFormat(format!("payload is not valid JSON: {}", e)))?;
    if !value.is_object() {
        return Err(EntdefError::InvalidFormat(
            "payload is not a JSON object".to_string(),
        ));
    }

    let value = migrate(value, version)?;
    let doc: EntityDoc =
        serde_json::from_value(value).map_err(|e| EntdefError::integrity("payload", e.to_string()))?;

    if doc.format_version != CURRENT_FORMAT_VERSION {
        return Err(EntdefError::integrity(
            "format_version",
            format!(
                "payload declares version {}, container expects {}",
                doc.format_version, CURRENT_FORMAT_VERSION
            ),
        ));
    }

    let mut entity = doc.into_entity()?;
    entity.stamp_format_version(version);
    Ok(entity)
}

fn read_u32(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(bytes);
    u32::from_le_bytes(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use entdef_core::ErrorKind;

    fn container(version: u32, payload: &[u8]) -> Vec<u8> {
        let header = Header {
            version,
            payload_len: payload.len() as u32,
        };
        let mut bytes = header.to_bytes().to_vec();
        bytes.extend_from_slice(payload);
        bytes
    }

    #[test]
    fn test_header_layout() {
        let bytes = encode(&Entity::new("ent-1", "Test").unwrap()).unwrap();
        assert_eq!(&bytes[0..4], b"ENTD");
        assert_eq!(&bytes[4..8], &CURRENT_FORMAT_VERSION.to_le_bytes());
        let len = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize;
        assert_eq!(len, bytes.len() - HEADER_LEN);
    }

    #[test]
    fn test_short_buffers() {
        assert_eq!(decode(b"").unwrap_err().kind(), ErrorKind::TruncatedFile);
        assert_eq!(decode(b"EN").unwrap_err().kind(), ErrorKind::TruncatedFile);
        assert_eq!(decode(b"ENTD\x02\x00").unwrap_err().kind(), ErrorKind::TruncatedFile);
        assert_eq!(decode(b"PNG").unwrap_err().kind(), ErrorKind::InvalidFormat);
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        let entity = Entity::new("ent-1", "Test").unwrap();
        let mut bytes = encode(&entity).unwrap();
        bytes.extend_from_slice(b"FOOTER");
        assert_eq!(decode(&bytes).unwrap(), entity);
    }

    #[test]
    fn test_version_zero_rejected() {
        let bytes = container(0, b"{}");
        assert_eq!(decode(&bytes).unwrap_err().kind(), ErrorKind::UnsupportedVersion);
    }

    #[test]
    fn test_non_json_payload() {
        let bytes = container(CURRENT_FORMAT_VERSION, b"\xff\xfe not json");
        assert_eq!(decode(&bytes).unwrap_err().kind(), ErrorKind::InvalidFormat);
        let bytes = container(CURRENT_FORMAT_VERSION, b"[1, 2]");
        assert_eq!(decode(&bytes).unwrap_err().kind(), ErrorKind::InvalidFormat);
    }

    #[test]
    fn test_missing_field_is_integrity_error() {
        let bytes = container(CURRENT_FORMAT_VERSION, br#"{"format_version":2,"id":"a"}"#);
        assert_eq!(decode(&bytes).unwrap_err().kind(), ErrorKind::DataIntegrity);
    }

    #[test]
    fn test_payload_version_must_match() {
        let payload = br#"{"format_version":7,"id":"a","name":"A","pivot":{"x":0.0,"y":0.0}}"#;
        let bytes = container(CURRENT_FORMAT_VERSION, payload);
        assert!(matches!(
            decode(&bytes),
            Err(EntdefError::DataIntegrity { ref path, .. }) if path == "format_version"
        ));
    }

    #[test]
    fn test_non_finite_entity_not_encoded() {
        let mut entity = Entity::new("ent-1", "Test").unwrap();
        entity.set_pivot(entdef_core::Vec2::new(f32::NAN, 0.0));
        assert_eq!(encode(&entity).unwrap_err().kind(), ErrorKind::DataIntegrity);
    }

    #[test]
    fn test_inspect() {
        let bytes = encode(&Entity::new("ent-1", "Test").unwrap()).unwrap();
        let info = inspect(&bytes).unwrap();
        assert_eq!(info.header.version, CURRENT_FORMAT_VERSION);
        assert!(!info.is_truncated());
        assert!(!info.needs_migration());
        assert_eq!(info.trailing_bytes(), 0);
        assert!(info.payload_hash.is_some());

        let info = inspect(&bytes[..bytes.len() - 1]).unwrap();
        assert!(info.is_truncated());
        assert!(info.payload_hash.is_none());
    }
}
