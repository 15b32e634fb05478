use crate::config::schema::{FormatConfig, ValidationError, VersionHeader, DEFAULT_CONFIG_VERSION};
use crate::config::version::{is_supported, VersionError, SUPPORTED_VERSIONS};
use crate::rules::RuleRegistry;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use toml_edit::{value, Array, DocumentMut, Item, Table};
use tracing::debug;

/// Default file name looked up next to the formatted sources.
pub const CONFIG_FILE_NAME: &str = "livespan.toml";

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Toml {
        path: Option<PathBuf>,
        source: toml_edit::de::Error,
    },
    MissingVersion {
        path: Option<PathBuf>,
    },
    Version {
        path: Option<PathBuf>,
        source: VersionError,
    },
    UnsupportedVersion {
        path: Option<PathBuf>,
        version: String,
    },
    Validation {
        path: Option<PathBuf>,
        source: ValidationError,
    },
}

impl ConfigError {
    fn with_path(self, path: &Path) -> Self {
        let path = Some(path.to_path_buf());
        match self {
            ConfigError::Toml { path: None, source } => ConfigError::Toml { path, source },
            ConfigError::MissingVersion { path: None } => ConfigError::MissingVersion { path },
            ConfigError::Version { path: None, source } => ConfigError::Version { path, source },
            ConfigError::UnsupportedVersion {
                path: None,
                version,
            } => ConfigError::UnsupportedVersion { path, version },
            ConfigError::Validation { path: None, source } => {
                ConfigError::Validation { path, source }
            }
            other => other,
        }
    }

    fn path(&self) -> Option<&Path> {
        match self {
            ConfigError::Io { path, .. } => Some(path),
            ConfigError::Toml { path, .. }
            | ConfigError::MissingVersion { path }
            | ConfigError::Version { path, .. }
            | ConfigError::UnsupportedVersion { path, .. }
            | ConfigError::Validation { path, .. } => path.as_deref(),
        }
    }
}

impl From<ValidationError> for ConfigError {
    fn from(source: ValidationError) -> Self {
        ConfigError::Validation { path: None, source }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let ConfigError::Io { path, source } = self {
            return write!(f, "failed to read config from {}: {}", path.display(), source);
        }
        match self.path() {
            Some(path) => write!(f, "invalid config ({}): ", path.display())?,
            None => write!(f, "invalid config: ")?,
        }
        match self {
            ConfigError::Io { .. } => Ok(()),
            ConfigError::Toml { source, .. } => write!(f, "failed to parse TOML: {source}"),
            ConfigError::MissingVersion { .. } => write!(f, "missing required key 'version'"),
            ConfigError::Version { source, .. } => write!(f, "{source}"),
            ConfigError::UnsupportedVersion { version, .. } => write!(
                f,
                "unsupported version '{version}' (supported: {SUPPORTED_VERSIONS})"
            ),
            ConfigError::Validation { source, .. } => write!(f, "{source}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Toml { source, .. } => Some(source),
            ConfigError::Version { source, .. } => Some(source),
            ConfigError::Validation { source, .. } => Some(source),
            ConfigError::MissingVersion { .. } | ConfigError::UnsupportedVersion { .. } => None,
        }
    }
}

/// Decode and validate a configuration against the built-in rules.
pub fn load_from_str(input: &str) -> Result<FormatConfig, ConfigError> {
    load_with_registry(input, &RuleRegistry::builtin())
}

/// Decode and validate a configuration against `registry`.
///
/// The version is checked before anything else is decoded, so a document
/// written for another major version fails on its version, not on a key
/// this build does not know.
pub fn load_with_registry(
    input: &str,
    registry: &RuleRegistry,
) -> Result<FormatConfig, ConfigError> {
    let header: VersionHeader = toml_edit::de::from_str(input)
        .map_err(|source| ConfigError::Toml { path: None, source })?;
    let version = header
        .version
        .ok_or(ConfigError::MissingVersion { path: None })?;
    let supported =
        is_supported(&version).map_err(|source| ConfigError::Version { path: None, source })?;
    if !supported {
        return Err(ConfigError::UnsupportedVersion {
            path: None,
            version,
        });
    }

    let config: FormatConfig = toml_edit::de::from_str(input)
        .map_err(|source| ConfigError::Toml { path: None, source })?;
    config.validate(registry)?;
    debug!(version = %config.version, "loaded config");
    Ok(config)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<FormatConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&contents).map_err(|error| error.with_path(path))
}

/// The document `livespan init` writes: every registered rule enabled and
/// default options spelled out.
pub fn default_document(registry: &RuleRegistry) -> DocumentMut {
    let mut document = DocumentMut::new();
    document["version"] = value(DEFAULT_CONFIG_VERSION);

    let mut rules = Array::new();
    for name in registry.names() {
        rules.push(name);
    }
    document["rules"] = value(rules);

    let mut options = Table::new();
    options["sugar_optionals"] = value(true);
    options["custom_rules"] = value(Array::new());
    options["exclude"] = value(Array::new());
    document["options"] = Item::Table(options);
    document
}
