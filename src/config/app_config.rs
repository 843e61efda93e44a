use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::core::errors::{ExportError, Result};

/// Configuration read from `config.toml`.
///
/// Every section is optional; command-line flags fill in or override
/// whatever the file leaves out.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub engine: EngineSection,
    #[serde(default)]
    pub session: SessionSection,
    #[serde(default)]
    pub keys: KeysSection,
}

impl AppConfig {
    /// Default config location for the current platform.
    ///
    /// - Linux: `~/.config/encrypted-export/config.toml`
    /// - macOS: `~/Library/Application Support/encrypted-export/config.toml`
    /// - Windows: `%APPDATA%/encrypted-export/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("encrypted-export").join("config.toml"))
    }

    /// Load the configuration.
    ///
    /// An explicit `path` must exist. Without one, the default location is
    /// used if present and an empty configuration otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ExportError::InvalidConfig {
                        detail: format!("config file {} not found", path.display()),
                    });
                }
                Self::from_file(path)
            }
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path),
                None => Ok(Self::default()),
            },
        }
    }

    /// Parse one config file, resolving relative paths against its directory.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&content).map_err(|e| ExportError::InvalidConfig {
            detail: format!("Failed to parse {}: {e}", path.display()),
        })?;
        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }
        Ok(config)
    }

    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    fn resolve_relative_to(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        self.keys.files.iter_mut().for_each(resolve);
        self.session.temp_dir.iter_mut().for_each(resolve);
    }
}

/// The `[engine]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineSection {
    pub gpg_path: Option<PathBuf>,
    pub gpgconf_path: Option<PathBuf>,
}

/// The `[session]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionSection {
    /// Parent directory for ephemeral workspaces (system temp dir if unset).
    pub temp_dir: Option<PathBuf>,
}

/// The `[keys]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeysSection {
    #[serde(default)]
    pub files: Vec<PathBuf>,
    #[serde(default)]
    pub recipients: Vec<String>,
}
