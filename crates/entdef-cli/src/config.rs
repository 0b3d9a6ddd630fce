//! Layered configuration system
//!
//! Config is loaded with three layers of precedence (highest wins):
//! 1. Environment variables: `ENTDEF_LOG_LEVEL`, `ENTDEF_PRETTY_PAYLOAD`
//! 2. Project-local: `.entdef/config.toml`
//! 3. Global: `~/.entdef/config.toml`

use anyhow::{bail, Context, Result};
use entdef_core::Vec2;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_LOG_LEVEL: &str = "warn";
const DEFAULT_PART_SIZE: f32 = 64.0;
const DEFAULT_HITBOX_SIZE: i32 = 32;

/// Sizes used when a command creates a part or hitbox without explicit dimensions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsSection {
    #[serde(default)]
    pub part_width: Option<f32>,
    #[serde(default)]
    pub part_height: Option<f32>,
    #[serde(default)]
    pub hitbox_width: Option<i32>,
    #[serde(default)]
    pub hitbox_height: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSection {
    /// Indent debug JSON exports. Never affects the binary payload.
    #[serde(default)]
    pub pretty_json: Option<bool>,
}

/// Top-level config file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub log_level: Option<String>,
    #[serde(default)]
    pub defaults: DefaultsSection,
    #[serde(default)]
    pub output: OutputSection,
}

/// Resolved configuration with every layer applied
#[derive(Debug, Clone, PartialEq)]
pub struct EntdefConfig {
    pub log_level: String,
    pub part_size: Vec2,
    pub hitbox_width: i32,
    pub hitbox_height: i32,
    pub pretty_json: bool,
}

impl Default for EntdefConfig {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            part_size: Vec2::new(DEFAULT_PART_SIZE, DEFAULT_PART_SIZE),
            hitbox_width: DEFAULT_HITBOX_SIZE,
            hitbox_height: DEFAULT_HITBOX_SIZE,
            pretty_json: true,
        }
    }
}

impl EntdefConfig {
    /// Load config with layered precedence: global < project < env vars
    pub fn load() -> Result<Self> {
        let mut config = ConfigFile::default();

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                let global = Self::load_file(&global_path)?;
                Self::merge_into(&mut config, global);
            }
        }

        let local_path = PathBuf::from(".entdef/config.toml");
        if local_path.exists() {
            let local = Self::load_file(&local_path)?;
            Self::merge_into(&mut config, local);
        }

        Self::apply_overrides(&mut config, |key| std::env::var(key).ok())?;
        Self::resolve(config)
    }

    /// Load config from a specific file path only, without env overrides
    pub fn load_from_file(path: &Path) -> Result<Self> {
        Self::resolve(Self::load_file(path)?)
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".entdef").join("config.toml"))
    }

    fn load_file(path: &Path) -> Result<ConfigFile> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config {}", path.display()))
    }

    fn merge_into(base: &mut ConfigFile, overlay: ConfigFile) {
        if overlay.log_level.is_some() {
            base.log_level = overlay.log_level;
        }

        let defaults = overlay.defaults;
        if defaults.part_width.is_some() {
            base.defaults.part_width = defaults.part_width;
        }
        if defaults.part_height.is_some() {
            base.defaults.part_height = defaults.part_height;
        }
        if defaults.hitbox_width.is_some() {
            base.defaults.hitbox_width = defaults.hitbox_width;
        }
        if defaults.hitbox_height.is_some() {
            base.defaults.hitbox_height = defaults.hitbox_height;
        }

        if overlay.output.pretty_json.is_some() {
            base.output.pretty_json = overlay.output.pretty_json;
        }
    }

    fn apply_overrides(config: &mut ConfigFile, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(level) = lookup("ENTDEF_LOG_LEVEL") {
            config.log_level = Some(level);
        }
        if let Some(value) = lookup("ENTDEF_PRETTY_PAYLOAD") {
            config.output.pretty_json = Some(parse_flag(&value).with_context(|| {
                format!("Invalid ENTDEF_PRETTY_PAYLOAD value '{}'", value)
            })?);
        }
        Ok(())
    }

    fn resolve(file: ConfigFile) -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            log_level: file.log_level.unwrap_or(defaults.log_level),
            part_size: Vec2::new(
                file.defaults.part_width.unwrap_or(defaults.part_size.x),
                file.defaults.part_height.unwrap_or(defaults.part_size.y),
            ),
            hitbox_width: file.defaults.hitbox_width.unwrap_or(defaults.hitbox_width),
            hitbox_height: file.defaults.hitbox_height.unwrap_or(defaults.hitbox_height),
            pretty_json: file.output.pretty_json.unwrap_or(defaults.pretty_json),
        };

        if !(config.part_size.is_finite() && config.part_size.x > 0.0 && config.part_size.y > 0.0) {
            bail!(
                "Default part size must be positive, got {}x{}",
                config.part_size.x,
                config.part_size.y
            );
        }
        if config.hitbox_width <= 0 || config.hitbox_height <= 0 {
            bail!(
                "Default hitbox size must be positive, got {}x{}",
                config.hitbox_width,
                config.hitbox_height
            );
        }
        Ok(config)
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("expected a boolean, got '{}'", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn temp_config(content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("entdef_config_test_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    fn cleanup(path: &Path) {
        std::fs::remove_file(path).ok();
        std::fs::remove_dir(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_load_config_from_file() {
        let path = temp_config(
            r#"
log_level = "debug"

[defaults]
part_width = 48.0
hitbox_height = 16

[output]
pretty_json = false
"#,
        );
        let config = EntdefConfig::load_from_file(&path).unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.part_size, Vec2::new(48.0, 64.0));
        assert_eq!(config.hitbox_width, 32);
        assert_eq!(config.hitbox_height, 16);
        assert!(!config.pretty_json);

        cleanup(&path);
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let path = temp_config("");
        let config = EntdefConfig::load_from_file(&path).unwrap();
        assert_eq!(config, EntdefConfig::default());
        cleanup(&path);
    }

    #[test]
    fn test_merge_precedence() {
        let mut base: ConfigFile = toml::from_str(
            r#"
log_level = "info"
[defaults]
part_width = 10.0
part_height = 20.0
"#,
        )
        .unwrap();
        let overlay: ConfigFile = toml::from_str(
            r#"
[defaults]
part_height = 30.0
"#,
        )
        .unwrap();

        EntdefConfig::merge_into(&mut base, overlay);
        let config = EntdefConfig::resolve(base).unwrap();

        assert_eq!(config.log_level, "info");
        assert_eq!(config.part_size, Vec2::new(10.0, 30.0));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> =
            [("ENTDEF_LOG_LEVEL", "trace"), ("ENTDEF_PRETTY_PAYLOAD", "no")].into_iter().collect();
        let mut file = ConfigFile::default();
        EntdefConfig::apply_overrides(&mut file, |key| env.get(key).map(|v| v.to_string())).unwrap();
        let config = EntdefConfig::resolve(file).unwrap();

        assert_eq!(config.log_level, "trace");
        assert!(!config.pretty_json);
    }

    #[test]
    fn test_invalid_env_flag() {
        let mut file = ConfigFile::default();
        let result = EntdefConfig::apply_overrides(&mut file, |key| {
            (key == "ENTDEF_PRETTY_PAYLOAD").then(|| "sometimes".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_non_positive_defaults() {
        let path = temp_config("[defaults]\nhitbox_width = 0\n");
        assert!(EntdefConfig::load_from_file(&path).is_err());
        cleanup(&path);
    }

    #[test]
    fn test_malformed_file() {
        let path = temp_config("log_level = [");
        assert!(EntdefConfig::load_from_file(&path).is_err());
        cleanup(&path);
    }
}
