// crates/authz-chain-config/src/load.rs
// ============================================================================
// Module: Structured Configuration Loading
// Description: Bounded reading and parsing of authorization config files.
// Purpose: Turn a config file into an unvalidated chain or a fatal error.
// Dependencies: serde_json, serde_yaml, thiserror, toml, tracing
// ============================================================================

//! ## Overview
//! The structured configuration file is read with strict path, size, and
//! encoding limits, then parsed according to its extension (TOML, YAML, or
//! JSON). Loading failures are fatal [`ConfigError`] values and never mix
//! with the accumulated field errors of chain validation.
//!
//! Security posture: config inputs are untrusted; reads are bounded and fail
//! closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use thiserror::Error;

use crate::model::AuthorizerChainConfig;
use crate::model::CONFIG_API_VERSIONS;
use crate::model::CONFIG_KIND;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Fatal configuration errors; the process cannot start with these.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// Parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration input.
    #[error("invalid config: {0}")]
    Invalid(String),
    /// Validation found defects; the message aggregates all of them.
    #[error("invalid authorization configuration: {0}")]
    Validation(String),
}

// ============================================================================
// SECTION: File Formats
// ============================================================================

/// Document formats accepted for the structured configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML document.
    Toml,
    /// YAML document.
    Yaml,
    /// JSON document.
    Json,
}

impl ConfigFormat {
    /// Selects a format from the file extension; unknown extensions are
    /// treated as YAML, which also accepts JSON.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "toml" => Self::Toml,
            "json" => Self::Json,
            _ => Self::Yaml,
        }
    }
}

// ============================================================================
// SECTION: Loading
// ============================================================================

/// Loads and parses a structured chain configuration file.
///
/// The result is not validated.
///
/// # Errors
///
/// Returns [`ConfigError`] when the path, read, encoding, parse, or header
/// checks fail.
pub fn load_chain_file(path: &Path) -> Result<AuthorizerChainConfig, ConfigError> {
    validate_path(path)?;
    let bytes = read_bytes_with_limit(path, MAX_CONFIG_FILE_SIZE)?;
    let content = std::str::from_utf8(&bytes)
        .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
    let format = ConfigFormat::from_path(path);
    tracing::debug!(
        path = %path.display(),
        ?format,
        bytes = bytes.len(),
        "loading authorization config"
    );
    parse_chain(content, format)
}

/// Parses chain configuration text in the given format.
///
/// # Errors
///
/// Returns [`ConfigError`] when parsing or header checks fail.
pub fn parse_chain(
    content: &str,
    format: ConfigFormat,
) -> Result<AuthorizerChainConfig, ConfigError> {
    let chain: AuthorizerChainConfig = match format {
        ConfigFormat::Toml => {
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?
        }
        ConfigFormat::Yaml => {
            serde_yaml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?
        }
        ConfigFormat::Json => {
            serde_json::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?
        }
    };
    validate_headers(&chain)?;
    Ok(chain)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Checks the optional `kind` and `apiVersion` headers.
fn validate_headers(chain: &AuthorizerChainConfig) -> Result<(), ConfigError> {
    if let Some(kind) = chain.kind.as_deref()
        && kind != CONFIG_KIND
    {
        return Err(ConfigError::Parse(format!(
            "unexpected kind {kind:?}, expected {CONFIG_KIND}"
        )));
    }
    if let Some(api_version) = chain.api_version.as_deref()
        && !CONFIG_API_VERSIONS.contains(&api_version)
    {
        return Err(ConfigError::Parse(format!(
            "unsupported apiVersion {api_version:?}, expected one of {}",
            CONFIG_API_VERSIONS.join(", ")
        )));
    }
    Ok(())
}

/// Validates the path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.trim().is_empty() {
        return Err(ConfigError::Invalid("config path must be non-empty".to_string()));
    }
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Reads at most `limit` bytes, failing when the file is larger.
///
/// Only regular files are opened; opening a FIFO would block until a writer
/// appears.
fn read_bytes_with_limit(path: &Path, limit: usize) -> Result<Vec<u8>, ConfigError> {
    let metadata = fs::metadata(path).map_err(|err| ConfigError::Io(err.to_string()))?;
    if !metadata.is_file() {
        return Err(ConfigError::Invalid("config path must be a regular file".to_string()));
    }
    let file = File::open(path).map_err(|err| ConfigError::Io(err.to_string()))?;
    let max_read = u64::try_from(limit).unwrap_or(u64::MAX).saturating_add(1);
    let mut bytes = Vec::new();
    file.take(max_read).read_to_end(&mut bytes).map_err(|err| ConfigError::Io(err.to_string()))?;
    if bytes.len() > limit {
        return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
    }
    Ok(bytes)
}
