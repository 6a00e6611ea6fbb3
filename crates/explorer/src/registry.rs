//! Named API registrations with JSON persistence.
//!
//! Maps short names to `(url, headers)` pairs so callers can say `petstore` instead of a
//! full schema URL. Identifiers that are not saved names are accepted as-is when they
//! parse as absolute URLs.

use crate::error::{ExplorerError, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use url::Url;

/// One saved API registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEntry {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    apis: HashMap<String, ApiEntry>,
}

/// Registry of saved APIs, persisted as pretty JSON after every mutation.
pub struct ApiRegistry {
    path: PathBuf,
    entries: RwLock<HashMap<String, ApiEntry>>,
}

/// Default location of the registry file, under the user config directory.
///
/// # Errors
///
/// Returns [`ExplorerError::Config`] when neither `XDG_CONFIG_HOME` nor `HOME` is set.
pub fn default_registry_path() -> Result<PathBuf> {
    let base = if let Ok(v) = std::env::var("XDG_CONFIG_HOME") {
        PathBuf::from(v)
    } else {
        let home = std::env::var("HOME")
            .map_err(|_| ExplorerError::Config("HOME is not set".to_string()))?;
        PathBuf::from(home).join(".config")
    };
    Ok(base.join("specscope").join("apis.json"))
}

impl ApiRegistry {
    /// Load the registry from `path`. A missing file starts empty; a corrupt file is
    /// logged and ignored rather than blocking startup.
    #[must_use]
    pub fn load(path: PathBuf) -> Self {
        let entries = match std::fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<RegistryFile>(&bytes) {
                Ok(file) => file.apis,
                Err(e) => {
                    tracing::warn!("Failed to parse registry {}: {e}", path.display());
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                tracing::warn!("Failed to read registry {}: {e}", path.display());
                HashMap::new()
            }
        };
        tracing::info!("Loaded {} API registrations", entries.len());
        Self {
            path,
            entries: RwLock::new(entries),
        }
    }

    /// Save a registration and persist the registry. Re-registering a name replaces it.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorerError::Validation`] for a URL that is not absolute with scheme
    /// and host, and [`ExplorerError::Config`] when persisting fails.
    pub fn add_api(
        &self,
        name: &str,
        url: &str,
        description: Option<String>,
        headers: Option<HashMap<String, String>>,
    ) -> Result<String> {
        if parse_absolute_url(url).is_none() {
            return Err(ExplorerError::Validation(format!("Invalid URL: {url}")));
        }

        let entry = ApiEntry {
            name: name.to_string(),
            url: url.to_string(),
            description,
            headers: headers.unwrap_or_default(),
        };
        self.entries.write().insert(name.to_string(), entry);
        self.save()?;
        tracing::info!("Added API registration: {name}");
        Ok(format!("Added API '{name}' with URL {url}"))
    }

    /// Remove a registration and persist the registry.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorerError::NotFound`] for an unknown name.
    pub fn remove_api(&self, name: &str) -> Result<String> {
        if self.entries.write().remove(name).is_none() {
            return Err(ExplorerError::NotFound(format!("API '{name}' not found")));
        }
        self.save()?;
        tracing::info!("Removed API registration: {name}");
        Ok(format!("Removed API '{name}'"))
    }

    /// All registrations, sorted by name.
    #[must_use]
    pub fn list_apis(&self) -> Vec<ApiEntry> {
        let mut entries: Vec<ApiEntry> = self.entries.read().values().cloned().collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries
    }

    /// Resolve an identifier to a `(url, headers)` pair: saved name first, then the
    /// identifier itself when it is an absolute URL with scheme and host.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorerError::InvalidIdentifier`] when neither applies.
    pub fn resolve(&self, identifier: &str) -> Result<(String, HashMap<String, String>)> {
        if let Some(entry) = self.entries.read().get(identifier) {
            return Ok((entry.url.clone(), entry.headers.clone()));
        }
        if parse_absolute_url(identifier).is_some() {
            return Ok((identifier.to_string(), HashMap::new()));
        }
        Err(ExplorerError::InvalidIdentifier(identifier.to_string()))
    }

    fn save(&self) -> Result<()> {
        let file = RegistryFile {
            apis: self.entries.read().clone(),
        };
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ExplorerError::Config(format!("create dir {}: {e}", parent.display()))
            })?;
        }
        let bytes = serde_json::to_vec_pretty(&file)?;
        std::fs::write(&self.path, bytes).map_err(|e| {
            ExplorerError::Config(format!("write registry {}: {e}", self.path.display()))
        })?;
        Ok(())
    }
}

fn parse_absolute_url(raw: &str) -> Option<Url> {
    let parsed = Url::parse(raw).ok()?;
    if parsed.has_host() { Some(parsed) } else { None }
}
