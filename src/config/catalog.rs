use crate::config::overrides::Overrides;
use crate::config::profile::{DeviceProfile, SERIAL_KEY};
use crate::utils::error::{ProjectorError, Result};
use crate::utils::validation::Validate;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

pub const DEFAULT_CATALOG_DIR: &str = "projector_configs";
pub const CATALOG_ENV_VAR: &str = "PROJECTOR_CATALOG";

static ENV_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("placeholder pattern is valid"));

/// Every device profile found in one catalog directory, keyed by the file
/// name without extension.
#[derive(Debug, Clone)]
pub struct Catalog {
    dir: PathBuf,
    profiles: BTreeMap<String, Map<String, Value>>,
}

impl Catalog {
    /// `$PROJECTOR_CATALOG`, or `projector_configs` in the working directory.
    pub fn default_dir() -> PathBuf {
        std::env::var_os(CATALOG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CATALOG_DIR))
    }

    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        let catalog_error = |source: std::io::Error| ProjectorError::CatalogLoad {
            path: dir.clone(),
            source,
        };

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(&dir).map_err(catalog_error)? {
            let path = entry.map_err(catalog_error)?.path();
            if path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        let mut profiles = BTreeMap::new();
        for path in paths {
            let Some(format) = ProfileFormat::from_path(&path) else {
                tracing::debug!("Skipping non-profile file {}", path.display());
                continue;
            };
            let Some(device_id) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
                tracing::warn!("Skipping profile with a non UTF-8 name: {}", path.display());
                continue;
            };

            let values = Self::read_profile(&path, format)?;
            if profiles.insert(device_id.clone(), values).is_some() {
                tracing::warn!(
                    "Profile {} defined more than once, {} wins",
                    device_id,
                    path.display()
                );
            }
        }

        tracing::info!("📁 Loaded {} device profile(s) from {}", profiles.len(), dir.display());
        Ok(Self { dir, profiles })
    }

    /// Builds a catalog from in-memory profiles.
    pub fn from_profiles<P: Into<PathBuf>>(
        dir: P,
        profiles: impl IntoIterator<Item = (String, Map<String, Value>)>,
    ) -> Self {
        Self {
            dir: dir.into(),
            profiles: profiles.into_iter().collect(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn device_ids(&self) -> Vec<&str> {
        self.profiles.keys().map(String::as_str).collect()
    }

    pub fn contains(&self, device_id: &str) -> bool {
        self.profiles.contains_key(device_id)
    }

    /// Looks up `device_id`, merges `overrides` over its top-level keys and
    /// checks that the result has a `serial` block and a command table.
    pub fn resolve(&self, device_id: &str, overrides: &Overrides) -> Result<DeviceProfile> {
        let values = self
            .profiles
            .get(device_id)
            .ok_or_else(|| ProjectorError::ProfileNotFound {
                device_id: device_id.to_string(),
                catalog: self.dir.clone(),
            })?;

        let mut profile = DeviceProfile::new(device_id, values.clone());
        profile.apply_overrides(overrides);
        profile.validate()?;
        Ok(profile)
    }

    fn read_profile(path: &Path, format: ProfileFormat) -> Result<Map<String, Value>> {
        let parse_error = |message: String| ProjectorError::ProfileParse {
            path: path.to_path_buf(),
            message,
        };

        let content = std::fs::read_to_string(path).map_err(|e| parse_error(e.to_string()))?;

        let value: Value = match format {
            ProfileFormat::Json => serde_json::from_str(&content).map_err(|e| parse_error(e.to_string()))?,
            ProfileFormat::Toml => toml::from_str(&content).map_err(|e| parse_error(e.to_string()))?,
        };

        match value {
            Value::Object(mut map) => {
                // Only transport settings take placeholders; wire templates stay literal.
                if let Some(serial) = map.get_mut(SERIAL_KEY) {
                    substitute_env_vars(serial);
                }
                Ok(map)
            }
            _ => Err(parse_error("top level must be an object".to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProfileFormat {
    Json,
    Toml,
}

impl ProfileFormat {
    fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "json" => Some(Self::Json),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }
}

/// Replaces `${VAR}` in every string below `value` with the variable's value.
/// Unknown variables stay as written.
fn substitute_env_vars(value: &mut Value) {
    match value {
        Value::String(text) => {
            let replaced = ENV_PLACEHOLDER
                .replace_all(text, |caps: &regex::Captures| {
                    let var_name = &caps[1];
                    std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
                })
                .into_owned();
            *text = replaced;
        }
        Value::Array(items) => items.iter_mut().for_each(substitute_env_vars),
        Value::Object(map) => map.values_mut().for_each(substitute_env_vars),
        _ => {}
    }
}
