//! Upgrading payloads written by older versions of the format
//!
//! Each step takes a payload at version N and returns the same definition at
//! version N + 1. Steps work on untyped JSON so they never depend on the
//! current document structs.

use entdef_core::naming::ensure_unique_name;
use entdef_core::{EntdefError, Result, CURRENT_FORMAT_VERSION};
use serde_json::{json, Map, Value};
use tracing::info;

/// A single upgrade step from one version to the next
pub type MigrationStep = fn(Value) -> Result<Value>;

/// Registered steps, keyed by the version they upgrade from
const STEPS: &[(u32, MigrationStep)] = &[(1, v1_to_v2)];

/// The step that upgrades `from_version` payloads, if one is registered
pub fn step_for(from_version: u32) -> Option<MigrationStep> {
    STEPS
        .iter()
        .find(|(version, _)| *version == from_version)
        .map(|(_, step)| *step)
}

/// Bring a payload stored at `from_version` up to the current version
pub fn migrate(mut payload: Value, from_version: u32) -> Result<Value> {
    if from_version > CURRENT_FORMAT_VERSION {
        return Err(unsupported(from_version));
    }

    let mut version = from_version;
    while version < CURRENT_FORMAT_VERSION {
        let step = step_for(version).ok_or_else(|| unsupported(from_version))?;
        payload = step(payload)?;
        info!("Migrated entity payload from format version {} to {}", version, version + 1);
        version += 1;
    }
    Ok(payload)
}

fn unsupported(found: u32) -> EntdefError {
    EntdefError::UnsupportedVersion {
        found,
        supported: CURRENT_FORMAT_VERSION,
    }
}

/// Version 1 is the layout written by the first editor release.
///
/// Differences handled here:
/// - `entity_id` is now `id`, `entity_hitboxes` is now `hitboxes`, the
///   free-form `version` string is gone
/// - `uv_rect {x, y, width, height}` became `uv {u_min, v_min, u_max, v_max}`
/// - rotation, pixel scale and flips moved into `transform`
/// - hitboxes were keyed by a non-unique `name` and a `hitbox_type` string;
///   very old hitboxes stored `position`/`size` vectors instead of integers
/// - most fields were optional and fell back to editor defaults
pub fn v1_to_v2(payload: Value) -> Result<Value> {
    let root = as_object(payload, "payload")?;

    let name = string_or(&root, "name", "NewEntity");
    let id = root
        .get("entity_id")
        .or_else(|| root.get("id"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| EntdefError::integrity("entity_id", "missing entity id"))?;

    let hitboxes = convert_hitboxes(root.get("entity_hitboxes"), "entity_hitboxes")?;

    let parts = array_or_empty(root.get("body_parts"), "body_parts")?;
    // Explicit ids are reserved up front so a derived id never takes one
    let mut part_ids: Vec<String> = parts
        .iter()
        .filter_map(explicit_id)
        .map(str::to_string)
        .collect();
    let mut body_parts = Vec::new();
    for (i, part) in parts.iter().enumerate() {
        let path = format!("body_parts[{}]", i);
        let converted = convert_part(part, &path, &part_ids)?;
        if explicit_id(part).is_none() {
            if let Some(id) = converted.get("id").and_then(Value::as_str) {
                part_ids.push(id.to_string());
            }
        }
        body_parts.push(converted);
    }

    Ok(json!({
        "format_version": 2,
        "id": id,
        "name": name,
        "pivot": vec2_or(root.get("pivot"), 0.0, 0.0),
        "tags": root.get("tags").cloned().unwrap_or_else(|| json!([])),
        "metadata": root.get("metadata").cloned().unwrap_or_else(|| json!({})),
        "hitboxes": hitboxes,
        "body_parts": body_parts,
    }))
}

fn convert_part(part_value: &Value, path: &str, taken_ids: &[String]) -> Result<Value> {
    let part = part_value
        .as_object()
        .ok_or_else(|| EntdefError::integrity(path, "expected an object"))?;

    let name = string_or(part, "name", "BodyPart");
    // Later v1 editors dropped the part id; derive one from the name
    let id = match explicit_id(part_value) {
        Some(id) => id.to_string(),
        None => ensure_unique_name(&name, taken_ids.iter().map(String::as_str)),
    };

    let texture_path = part
        .get("texture_path")
        .and_then(Value::as_str)
        .filter(|p| !p.is_empty());

    let uv = part.get("uv_rect").and_then(Value::as_object);
    let uv_x = uv.map_or(0.0, |r| number_or(r, "x", 0.0));
    let uv_y = uv.map_or(0.0, |r| number_or(r, "y", 0.0));
    let uv_w = uv.map_or(1.0, |r| number_or(r, "width", 1.0));
    let uv_h = uv.map_or(1.0, |r| number_or(r, "height", 1.0));

    let hitboxes = convert_hitboxes(part.get("hitboxes"), &format!("{}.hitboxes", path))?;

    Ok(json!({
        "id": id,
        "name": name,
        "position": vec2_or(part.get("position"), 0.0, 0.0),
        "size": vec2_or(part.get("size"), 64.0, 64.0),
        "transform": {
            "rotation": number_or(part, "rotation", 0.0),
            "scale": number_or(part, "pixel_scale", 1.0),
            "flip_x": bool_or(part, "flip_x", false),
            "flip_y": bool_or(part, "flip_y", false),
        },
        "texture_path": texture_path,
        "uv": {
            "u_min": uv_x,
            "v_min": uv_y,
            "u_max": uv_x + uv_w,
            "v_max": uv_y + uv_h,
        },
        "z_order": part.get("z_order").and_then(Value::as_i64).unwrap_or(0),
        "visible": bool_or(part, "visible", true),
        "hitboxes": hitboxes,
    }))
}

fn convert_hitboxes(hitboxes: Option<&Value>, path: &str) -> Result<Vec<Value>> {
    let mut taken: Vec<String> = Vec::new();
    let mut converted = Vec::new();

    for (i, hitbox) in array_or_empty(hitboxes, path)?.iter().enumerate() {
        let hitbox_path = format!("{}[{}]", path, i);
        let hitbox = hitbox
            .as_object()
            .ok_or_else(|| EntdefError::integrity(&hitbox_path, "expected an object"))?;

        // v1 hitbox names were labels, not ids, and could repeat
        let id = ensure_unique_name(
            &string_or(hitbox, "name", "Hitbox"),
            taken.iter().map(String::as_str),
        );
        taken.push(id.clone());

        let (x, y, width, height) = if hitbox.contains_key("x") && hitbox.contains_key("y") {
            (
                number_or(hitbox, "x", 0.0),
                number_or(hitbox, "y", 0.0),
                number_or(hitbox, "width", 32.0),
                number_or(hitbox, "height", 32.0),
            )
        } else {
            let position = hitbox.get("position").and_then(Value::as_object);
            let size = hitbox.get("size").and_then(Value::as_object);
            (
                position.map_or(0.0, |p| number_or(p, "x", 0.0)),
                position.map_or(0.0, |p| number_or(p, "y", 0.0)),
                size.map_or(32.0, |s| number_or(s, "x", 32.0)),
                size.map_or(32.0, |s| number_or(s, "y", 32.0)),
            )
        };

        let legacy_type = string_or(hitbox, "hitbox_type", "collision");
        let (kind, label) = match legacy_type.as_str() {
            "collision" | "damage" | "trigger" | "interaction" => (legacy_type.clone(), None),
            _ => ("custom".to_string(), Some(legacy_type.clone())),
        };

        converted.push(json!({
            "id": id,
            "type": kind,
            "label": label,
            "x": x.trunc() as i64,
            "y": y.trunc() as i64,
            "width": width.trunc() as i64,
            "height": height.trunc() as i64,
            "enabled": bool_or(hitbox, "enabled", true),
        }));
    }

    Ok(converted)
}

fn explicit_id(part: &Value) -> Option<&str> {
    part.get("id").and_then(Value::as_str)
}

fn as_object(value: Value, path: &str) -> Result<Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(EntdefError::integrity(path, "expected an object")),
    }
}

fn array_or_empty<'a>(value: Option<&'a Value>, path: &str) -> Result<&'a [Value]> {
    match value {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(items)) => Ok(items.as_slice()),
        Some(_) => Err(EntdefError::integrity(path, "expected an array")),
    }
}

fn string_or(map: &Map<String, Value>, key: &str, default: &str) -> String {
    map.get(key)
        .and_then(Value::as_str)
        .unwrap_or(default)
        .to_string()
}

fn number_or(map: &Map<String, Value>, key: &str, default: f64) -> f64 {
    map.get(key).and_then(Value::as_f64).unwrap_or(default)
}

fn bool_or(map: &Map<String, Value>, key: &str, default: bool) -> bool {
    map.get(key).and_then(Value::as_bool).unwrap_or(default)
}

fn vec2_or(value: Option<&Value>, x: f64, y: f64) -> Value {
    let v = value.and_then(Value::as_object);
    json!({
        "x": v.map_or(x, |m| number_or(m, "x", x)),
        "y": v.map_or(y, |m| number_or(m, "y", y)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn legacy_payload() -> Value {
        json!({
            "name": "Slime",
            "entity_id": "0b9c",
            "pivot": {"x": 16.0, "y": 30.0},
            "body_parts": [{
                "name": "Body",
                "id": "p1",
                "position": {"x": 0.0, "y": 0.0},
                "size": {"x": 32.0, "y": 32.0},
                "texture_path": "",
                "uv_rect": {"x": 0.5, "y": 0.0, "width": 0.5, "height": 0.25},
                "flip_x": true,
                "flip_y": false,
                "hitboxes": [
                    {"name": "Hitbox", "x": 1, "y": 2, "width": 30, "height": 28,
                     "hitbox_type": "damage", "enabled": true},
                    {"name": "Hitbox", "position": {"x": 3.7, "y": 0.0},
                     "size": {"x": 8.0, "y": 8.0}, "hitbox_type": "stomp"}
                ],
                "uv_tile_id": null,
                "pixel_scale": 2,
                "rotation": 90.0,
                "z_order": 3,
                "visible": true
            }],
            "entity_hitboxes": [],
            "version": "1.0",
            "tags": ["enemy"],
            "metadata": {"hp": 3}
        })
    }

    #[test]
    fn test_step_registry() {
        assert!(step_for(1).is_some());
        assert!(step_for(CURRENT_FORMAT_VERSION).is_none());
    }

    #[test]
    fn test_v1_to_v2_entity_fields() {
        let v2 = v1_to_v2(legacy_payload()).unwrap();
        assert_eq!(v2["format_version"], 2);
        assert_eq!(v2["id"], "0b9c");
        assert_eq!(v2["tags"], json!(["enemy"]));
        assert_eq!(v2["metadata"]["hp"], 3);
        assert!(v2.get("version").is_none());
        assert!(v2.get("entity_id").is_none());
    }

    #[test]
    fn test_v1_to_v2_part_fields() {
        let v2 = v1_to_v2(legacy_payload()).unwrap();
        let part = &v2["body_parts"][0];
        assert_eq!(part["uv"], json!({"u_min": 0.5, "v_min": 0.0, "u_max": 1.0, "v_max": 0.25}));
        assert_eq!(part["transform"]["scale"], 2.0);
        assert_eq!(part["transform"]["rotation"], 90.0);
        assert_eq!(part["transform"]["flip_x"], true);
        assert_eq!(part["texture_path"], Value::Null);
        assert_eq!(part["z_order"], 3);
    }

    #[test]
    fn test_v1_to_v2_hitboxes() {
        let v2 = v1_to_v2(legacy_payload()).unwrap();
        let hitboxes = &v2["body_parts"][0]["hitboxes"];
        assert_eq!(hitboxes[0]["id"], "Hitbox");
        assert_eq!(hitboxes[0]["type"], "damage");
        assert_eq!(hitboxes[0]["label"], Value::Null);

        // Repeated names become unique ids, old vector layout becomes integers
        assert_eq!(hitboxes[1]["id"], "Hitbox_1");
        assert_eq!(hitboxes[1]["x"], 3);
        assert_eq!(hitboxes[1]["width"], 8);
        assert_eq!(hitboxes[1]["type"], "custom");
        assert_eq!(hitboxes[1]["label"], "stomp");
        assert_eq!(hitboxes[1]["enabled"], true);
    }

    #[test]
    fn test_v1_missing_part_id_derived_from_name() {
        let payload = json!({
            "entity_id": "e",
            "body_parts": [{"name": "Arm"}, {"name": "Arm"}]
        });
        let v2 = v1_to_v2(payload).unwrap();
        assert_eq!(v2["body_parts"][0]["id"], "Arm");
        assert_eq!(v2["body_parts"][1]["id"], "Arm_1");
        assert_eq!(v2["body_parts"][0]["size"], json!({"x": 64.0, "y": 64.0}));
    }

    #[test]
    fn test_v1_derived_id_skips_later_explicit_id() {
        let payload = json!({
            "entity_id": "e",
            "body_parts": [{"name": "Arm"}, {"name": "X", "id": "Arm"}, {"name": "Arm"}]
        });
        let v2 = v1_to_v2(payload).unwrap();
        assert_eq!(v2["body_parts"][0]["id"], "Arm_1");
        assert_eq!(v2["body_parts"][1]["id"], "Arm");
        assert_eq!(v2["body_parts"][2]["id"], "Arm_2");
    }

    #[test]
    fn test_v1_requires_entity_id() {
        let err = v1_to_v2(json!({"name": "x"})).unwrap_err();
        assert!(matches!(err, EntdefError::DataIntegrity { .. }));
    }

    #[test]
    fn test_migrate_rejects_unknown_versions() {
        assert!(matches!(
            migrate(json!({}), 0),
            Err(EntdefError::UnsupportedVersion { found: 0, .. })
        ));
        assert!(matches!(
            migrate(json!({}), CURRENT_FORMAT_VERSION + 1),
            Err(EntdefError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn test_migrate_current_is_noop() {
        let payload = json!({"anything": true});
        assert_eq!(migrate(payload.clone(), CURRENT_FORMAT_VERSION).unwrap(), payload);
    }
}
