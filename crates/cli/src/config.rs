use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Defaults for `find` flags, loaded from an optional TOML file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FindDefaults {
    pub case_sensitive: bool,
    pub regex: bool,
    pub wrap: bool,
    pub max_items: u32,
    pub timeout_ms: Option<u64>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    schema_version: Option<u32>,
    find: Option<RawFindConfig>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawFindConfig {
    case_sensitive: Option<bool>,
    regex: Option<bool>,
    wrap: Option<bool>,
    max_items: Option<u32>,
    timeout_ms: Option<u64>,
}

impl FindDefaults {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&text)
            .with_context(|| format!("Config file {} is not valid", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(text)?;
        if let Some(schema_version) = raw.schema_version {
            if schema_version != 1 {
                return Err(anyhow!(
                    "schema_version {schema_version} is not supported (expected 1)"
                ));
            }
        }

        let defaults = Self::default();
        let find = raw.find.unwrap_or_default();
        let timeout_ms = find.timeout_ms.filter(|ms| *ms > 0);
        Ok(Self {
            case_sensitive: find.case_sensitive.unwrap_or(defaults.case_sensitive),
            regex: find.regex.unwrap_or(defaults.regex),
            wrap: find.wrap.unwrap_or(defaults.wrap),
            max_items: find.max_items.unwrap_or(defaults.max_items),
            timeout_ms,
        })
    }
}
