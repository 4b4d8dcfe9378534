use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classify::Classifier;
use crate::engine::{EncryptionMode, Engine};
use crate::error::{Result, ZbError};
use crate::platform::paths;

/// Environment variable overriding the registry location.
pub const CONFIG_ENV: &str = "ZBWRAP_CONFIG";

const REGISTRY_FILE: &str = "registry.yaml";

fn default_classifier_program() -> String {
    "file".to_string()
}

fn default_classifier_args() -> Vec<String> {
    vec!["--brief".into(), "--mime-type".into(), "-".into()]
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptionConfig {
    /// `none` or `password-file`. Anything else is treated as `none`.
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials_path: Option<String>,
}

impl EncryptionConfig {
    pub fn mode(&self) -> EncryptionMode {
        EncryptionMode::from_config(&self.kind, self.credentials_path.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default = "default_classifier_program")]
    pub program: String,
    #[serde(default = "default_classifier_args")]
    pub args: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            program: default_classifier_program(),
            args: default_classifier_args(),
        }
    }
}

/// Alias → repository path mapping plus the settings shared by every
/// repository. Persisted as YAML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Registry {
    #[serde(default)]
    pub repositories: BTreeMap<String, String>,
    #[serde(default)]
    pub encryption: EncryptionConfig,
    /// Location of the zbackup binary. Unset means a `PATH` lookup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zbackup_path: Option<String>,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl Registry {
    /// Load the registry at `path`. A missing file is a fresh, empty registry.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no registry yet, starting empty");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(ZbError::Config(format!(
                    "cannot read '{}': {e}",
                    path.display()
                )))
            }
        };
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&contents).map_err(|e| {
            ZbError::Config(format!("invalid registry '{}': {e}", path.display()))
        })
    }

    /// Write the registry to `path`, creating the parent directory.
    pub fn save(&mut self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| ZbError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }
        self.last_updated = Some(Utc::now());
        let text = serde_yaml::to_string(self)
            .map_err(|e| ZbError::Config(format!("cannot serialize registry: {e}")))?;
        std::fs::write(path, text).map_err(|e| {
            ZbError::Config(format!("cannot write '{}': {e}", path.display()))
        })
    }

    /// Register `path` under `alias`. The path must be an existing directory.
    pub fn add(&mut self, alias: &str, path: &str) -> Result<()> {
        let expanded = expand_tilde(path);
        let meta = std::fs::metadata(&expanded)
            .map_err(|_| ZbError::Config(format!("path does not exist: {expanded}")))?;
        if !meta.is_dir() {
            return Err(ZbError::Config(format!(
                "path is not a directory: {expanded}"
            )));
        }
        if self.repositories.contains_key(alias) {
            return Err(ZbError::AliasExists(alias.to_string()));
        }
        self.repositories.insert(alias.to_string(), expanded);
        Ok(())
    }

    pub fn get(&self, alias: &str) -> Option<&str> {
        self.repositories.get(alias).map(String::as_str)
    }

    /// Like [`Registry::get`] but with a descriptive error for unknown aliases.
    pub fn require(&self, alias: &str) -> Result<&str> {
        self.get(alias)
            .ok_or_else(|| ZbError::AliasNotFound(alias.to_string()))
    }

    pub fn list(&self) -> &BTreeMap<String, String> {
        &self.repositories
    }

    pub fn engine(&self) -> Engine {
        let program = self
            .zbackup_path
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(|p| PathBuf::from(expand_tilde(p)))
            .unwrap_or_else(|| PathBuf::from(Engine::DEFAULT_PROGRAM));
        Engine::new(program, self.encryption.mode())
    }

    pub fn classifier(&self) -> Classifier {
        Classifier::new(&self.classifier.program, self.classifier.args.clone())
    }
}

/// Tracks where the registry file was found.
#[derive(Debug, Clone)]
pub enum ConfigSource {
    /// Explicitly passed via `--config`.
    CliArg(PathBuf),
    /// Set via the `ZBWRAP_CONFIG` env var.
    EnvVar(PathBuf),
    /// The per-user default location.
    Default(PathBuf),
}

impl ConfigSource {
    pub fn path(&self) -> &Path {
        match self {
            ConfigSource::CliArg(p) => p,
            ConfigSource::EnvVar(p) => p,
            ConfigSource::Default(p) => p,
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::CliArg(p) => write!(f, "{} (--config)", p.display()),
            ConfigSource::EnvVar(p) => write!(f, "{} ({CONFIG_ENV})", p.display()),
            ConfigSource::Default(p) => write!(f, "{} (default)", p.display()),
        }
    }
}

/// Default registry location: `<user config dir>/zbwrap/registry.yaml`.
pub fn default_registry_path() -> Option<PathBuf> {
    paths::config_dir().map(|base| base.join("zbwrap").join(REGISTRY_FILE))
}

/// Resolve which registry file to use.
///
/// Priority: CLI arg > `ZBWRAP_CONFIG` env var > per-user default.
pub fn resolve_registry_path(cli_config: Option<&str>) -> Result<ConfigSource> {
    if let Some(path) = cli_config {
        return Ok(ConfigSource::CliArg(PathBuf::from(expand_tilde(path))));
    }

    if let Ok(val) = std::env::var(CONFIG_ENV) {
        if !val.is_empty() {
            return Ok(ConfigSource::EnvVar(PathBuf::from(expand_tilde(&val))));
        }
    }

    default_registry_path()
        .map(ConfigSource::Default)
        .ok_or_else(|| ZbError::Config("cannot determine the user config directory".into()))
}

/// Expand a leading `~` or `~/` to the user's home directory.
pub fn expand_tilde(path: &str) -> String {
    if path == "~" {
        if let Some(home) = paths::home_dir() {
            return home.to_string_lossy().to_string();
        }
    }
    if let Some(suffix) = path.strip_prefix("~/") {
        if let Some(home) = paths::home_dir() {
            return home.join(suffix).to_string_lossy().to_string();
        }
    }
    path.to_string()
}
