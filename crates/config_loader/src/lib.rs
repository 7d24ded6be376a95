//! # Config Loader
//!
//! Blueprint loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON blueprint files
//! - Validate blueprint legality
//! - Produce a `HubBlueprint`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let blueprint = ConfigLoader::load_from_path(Path::new("hub.toml")).unwrap();
//! println!("Hub: {}", blueprint.hub.name);
//! ```

mod parser;
mod validator;

pub use contracts::HubBlueprint;
pub use parser::ConfigFormat;

use contracts::HubError;
use std::path::Path;

/// Blueprint loader
///
/// Provides static methods to load a blueprint from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load a blueprint from a file path
    ///
    /// Automatically detects format from the file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<HubBlueprint, HubError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load a blueprint from a string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(content: &str, format: ConfigFormat) -> Result<HubBlueprint, HubError> {
        Self::parse_and_validate(content, format)
    }

    /// Serialize a blueprint to a TOML string
    pub fn to_toml(blueprint: &HubBlueprint) -> Result<String, HubError> {
        toml::to_string_pretty(blueprint)
            .map_err(|e| HubError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize a blueprint to a JSON string
    pub fn to_json(blueprint: &HubBlueprint) -> Result<String, HubError> {
        serde_json::to_string_pretty(blueprint)
            .map_err(|e| HubError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer blueprint format from the file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, HubError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| HubError::config_parse("cannot determine file format from extension"))?;

        ConfigFormat::from_extension(ext)
            .ok_or_else(|| HubError::config_parse(format!("unsupported config format: .{ext}")))
    }

    /// Read blueprint file content
    fn read_file(path: &Path) -> Result<String, HubError> {
        Ok(std::fs::read_to_string(path)?)
    }

    /// Parse and validate blueprint content
    fn parse_and_validate(content: &str, format: ConfigFormat) -> Result<HubBlueprint, HubError> {
        let blueprint = parser::parse(content, format)?;
        validator::validate(&blueprint)?;
        Ok(blueprint)
    }
}
