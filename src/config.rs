//! `remap.toml` configuration.
//!
//! Holds one mapping profile per client-facing entity, the backend base
//! address and the nesting limit.
//!
//! ```toml
//! [backend]
//! base_url = "http://myserver/OData/"
//!
//! [limits]
//! max_depth = 256
//!
//! [entities.Customers]
//! allow_count = false
//! delete = ["Ref3"]
//! fields = [
//!   { from = "CustCode", to = "No" },
//!   { from = "Email", to = "E_Mail" },
//! ]
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{RemapError, RemapResult};
use crate::mapping::FieldMapping;
use crate::transpiler::{Passthrough, Translator, DEFAULT_MAX_DEPTH};

/// File name looked up in the working directory and the user config dir.
pub const CONFIG_FILE: &str = "remap.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemapConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub limits: Limits,
    #[serde(default)]
    pub entities: BTreeMap<String, EntityConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackendConfig {
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Limits {
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn yes() -> bool {
    true
}

/// Mapping profile for one client-facing entity.
#[derive(Debug, Clone, Deserialize)]
pub struct EntityConfig {
    /// Backend entity set; defaults to the profile name.
    pub remote: Option<String>,
    #[serde(default = "yes")]
    pub allow_skip: bool,
    #[serde(default = "yes")]
    pub allow_top: bool,
    #[serde(default = "yes")]
    pub allow_count: bool,
    #[serde(flatten)]
    pub mapping: FieldMapping,
}

impl Default for EntityConfig {
    fn default() -> Self {
        Self {
            remote: None,
            allow_skip: true,
            allow_top: true,
            allow_count: true,
            mapping: FieldMapping::default(),
        }
    }
}

impl EntityConfig {
    pub fn passthrough(&self) -> Passthrough {
        Passthrough::new(self.allow_skip, self.allow_top, self.allow_count)
    }
}

impl RemapConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> RemapResult<Self> {
        let config: RemapConfig =
            toml::from_str(content).map_err(|e| RemapError::Config(e.to_string()))?;
        if config.limits.max_depth == 0 {
            return Err(RemapError::Config("limits.max_depth must be at least 1".to_string()));
        }
        for (name, entity) in &config.entities {
            for dup in entity.mapping.duplicate_sources() {
                warn!(
                    entity = %name,
                    field = %dup,
                    "field mapped more than once; the first pair wins"
                );
            }
        }
        Ok(config)
    }

    /// Load from an explicit path.
    pub fn load(path: &Path) -> RemapResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content).map_err(|e| match e {
            RemapError::Config(msg) => RemapError::Config(format!("{}: {}", path.display(), msg)),
            other => other,
        })
    }

    /// Load from `path`, or from the first default location that exists.
    /// Falls back to an empty configuration when no file is found.
    pub fn discover(path: Option<&Path>) -> RemapResult<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match default_paths().into_iter().find(|p| p.exists()) {
            Some(found) => {
                debug!(path = %found.display(), "using config file");
                Self::load(&found)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn entity(&self, name: &str) -> RemapResult<&EntityConfig> {
        self.entities
            .get(name)
            .ok_or_else(|| RemapError::UnknownEntity(name.to_string()))
    }

    /// Translator for an entity mapping, carrying the configured limits.
    pub fn translator<'m>(&self, mapping: &'m FieldMapping) -> Translator<'m> {
        Translator::new(mapping).with_max_depth(self.limits.max_depth)
    }

    /// Full backend address for an assembled query string.
    pub fn backend_url(&self, entity: &str, query: &str) -> RemapResult<String> {
        let base = self
            .backend
            .base_url
            .as_deref()
            .ok_or_else(|| RemapError::Config("backend.base_url is not set".to_string()))?;
        let remote = self
            .entities
            .get(entity)
            .and_then(|e| e.remote.as_deref())
            .unwrap_or(entity);
        Ok(format!("{}/{}{}", base.trim_end_matches('/'), remote, query))
    }
}

/// `./remap.toml`, then `<config dir>/odata-remap/remap.toml`.
pub fn default_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILE)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("odata-remap").join(CONFIG_FILE));
    }
    paths
}
