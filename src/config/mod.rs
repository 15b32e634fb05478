pub mod loader;
pub mod schema;
pub mod version;

pub use loader::{
    default_document, load_from_path, load_from_str, load_with_registry, ConfigError,
    CONFIG_FILE_NAME,
};
pub use schema::{
    FormatConfig, FormatOptions, ValidationError, ValidationIssue, DEFAULT_CONFIG_VERSION,
};
pub use version::{is_supported, matches_requirement, VersionError, SUPPORTED_VERSIONS};
