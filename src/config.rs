//! Cache configuration.
//!
//! Built once at startup and handed to [`crate::cache::SharedCaches`], which
//! owns it for the lifetime of the delegate. Toggles never change during a
//! pass.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::util::Result;

/// Environment variable enabling the shared transform cache.
pub const ENV_XFORM_CACHE: &str = "SCENE_IMAGING_ENABLE_SHARED_XFORM_CACHE";
/// Environment variable enabling the material binding cache.
pub const ENV_BINDING_CACHE: &str = "SCENE_IMAGING_ENABLE_BINDING_CACHE";
/// Environment variable enabling the visibility cache.
pub const ENV_VIS_CACHE: &str = "SCENE_IMAGING_ENABLE_VIS_CACHE";

/// Which shared caches are in use. A disabled cache falls back to direct
/// computation on every query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub enable_xform_cache: bool,
    pub enable_binding_cache: bool,
    pub enable_vis_cache: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enable_xform_cache: true,
            enable_binding_cache: true,
            enable_vis_cache: true,
        }
    }
}

impl Config {
    /// All caches off.
    pub fn uncached() -> Self {
        Self {
            enable_xform_cache: false,
            enable_binding_cache: false,
            enable_vis_cache: false,
        }
    }

    /// Read toggles from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read toggles through `lookup`. `"1"` enables, `"0"` disables, unset
    /// keeps the default; anything else is reported and ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let read = |key: &str, slot: &mut bool| match lookup(key).as_deref().map(str::trim) {
            None => {}
            Some("1") => *slot = true,
            Some("0") => *slot = false,
            Some(other) => {
                tracing::warn!(key, value = other, "ignoring invalid cache toggle, expected 0 or 1");
            }
        };
        read(ENV_XFORM_CACHE, &mut config.enable_xform_cache);
        read(ENV_BINDING_CACHE, &mut config.enable_binding_cache);
        read(ENV_VIS_CACHE, &mut config.enable_vis_cache);
        config
    }

    /// Load from a JSON file. Missing keys keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Save as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
