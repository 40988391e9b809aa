//! # Config Loader
//!
//! Configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON broadcast profiles
//! - Validate profile legality
//! - Load auxiliary documents (provider fixtures) in the same formats
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let profile = ConfigLoader::load_from_path(Path::new("broadcast.toml")).unwrap();
//! println!("Rounds: {}", profile.broadcast.rounds);
//! ```

mod parser;
mod validator;

pub use contracts::BroadcastProfile;
pub use parser::ConfigFormat;
pub use validator::validate;

use contracts::ContractError;
use serde::de::DeserializeOwned;
use std::path::Path;

/// Configuration loader
///
/// Provides static methods to load configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load a broadcast profile from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<BroadcastProfile, ContractError> {
        let profile = Self::parse_from_path(path)?;
        validator::validate(&profile)?;
        Ok(profile)
    }

    /// Parse a broadcast profile without validating it
    ///
    /// Callers that layer overrides on top of the file (env, CLI flags) must
    /// run [`validate`] themselves once the overrides are applied.
    pub fn parse_from_path(path: &Path) -> Result<BroadcastProfile, ContractError> {
        Self::load_document(path)
    }

    /// Load a broadcast profile from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<BroadcastProfile, ContractError> {
        let profile = parser::parse(content, format)?;
        validator::validate(&profile)?;
        Ok(profile)
    }

    /// Load any deserializable document without profile validation
    ///
    /// Used for provider fixtures, which share the profile's file formats.
    pub fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T, ContractError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        parser::parse(&content, format)
    }

    /// Serialize a profile to TOML string
    pub fn to_toml(profile: &BroadcastProfile) -> Result<String, ContractError> {
        toml::to_string_pretty(profile)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize a profile to JSON string
    pub fn to_json(profile: &BroadcastProfile) -> Result<String, ContractError> {
        serde_json::to_string_pretty(profile)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    /// Read configuration file content
    fn read_file(path: &Path) -> Result<String, ContractError> {
        Ok(std::fs::read_to_string(path)?)
    }
}
