//! Version gate for configuration documents.
//!
//! A document declares the format version it was written for; the loader
//! refuses anything outside [`SUPPORTED_VERSIONS`] before decoding the rest.

use semver::{Version, VersionReq};
use thiserror::Error;

/// Configuration versions this build understands.
pub const SUPPORTED_VERSIONS: &str = ">=1.0.0, <2.0.0";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    /// Invalid version string (e.g., "one")
    #[error("invalid version '{value}': {reason}")]
    InvalidVersion { value: String, reason: String },
    /// Invalid version requirement (e.g., ">=bad")
    #[error("invalid version requirement '{value}': {reason}")]
    InvalidRequirement { value: String, reason: String },
}

/// Check if a version matches a requirement string
///
/// # Examples
///
/// ```
/// use livespan::config::version::matches_requirement;
///
/// assert!(matches_requirement("1.2.0", Some(">=1.0.0, <2.0.0")).unwrap());
/// assert!(!matches_requirement("2.0.0", Some(">=1.0.0, <2.0.0")).unwrap());
/// assert!(matches_requirement("0.1.0", None).unwrap());
/// ```
pub fn matches_requirement(
    version: &str,
    requirement: Option<&str>,
) -> Result<bool, VersionError> {
    let Some(req_str) = requirement.map(str::trim).filter(|req| !req.is_empty()) else {
        return Ok(true);
    };

    let version = Version::parse(version.trim()).map_err(|e| VersionError::InvalidVersion {
        value: version.to_string(),
        reason: e.to_string(),
    })?;

    let req = VersionReq::parse(req_str).map_err(|e| VersionError::InvalidRequirement {
        value: req_str.to_string(),
        reason: e.to_string(),
    })?;

    Ok(req.matches(&version))
}

/// Whether a configuration declaring `version` can be loaded.
pub fn is_supported(version: &str) -> Result<bool, VersionError> {
    matches_requirement(version, Some(SUPPORTED_VERSIONS))
}
