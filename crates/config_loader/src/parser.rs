//! Blueprint parsing.
//!
//! Supports TOML (primary) and JSON (alternative) formats.

use contracts::{HubBlueprint, HubError};

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML format (recommended)
    Toml,
    /// JSON format
    Json,
}

impl ConfigFormat {
    /// Infer format from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Parse a TOML blueprint
pub fn parse_toml(content: &str) -> Result<HubBlueprint, HubError> {
    toml::from_str(content).map_err(|e| HubError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse a JSON blueprint
pub fn parse_json(content: &str) -> Result<HubBlueprint, HubError> {
    serde_json::from_str(content).map_err(|e| HubError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse blueprint content in the given format
pub fn parse(content: &str, format: ConfigFormat) -> Result<HubBlueprint, HubError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{SinkKind, SourceKind};

    #[test]
    fn test_parse_toml_minimal() {
        let content = r#"
[hub]
name = "drive-hub"

[[sources]]
id = "replay"
kind = "trace"
[sources.params]
path = "traces/drive.json"

[[sinks]]
name = "console"
kind = "log"
"#;
        let result = parse_toml(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert_eq!(bp.hub.name, "drive-hub");
        assert_eq!(bp.sources.len(), 1);
        assert_eq!(bp.sources[0].kind, SourceKind::Trace);
        assert_eq!(bp.sources[0].params["path"], "traces/drive.json");
        assert_eq!(bp.sinks[0].kind, SinkKind::Log);
    }

    #[test]
    fn test_parse_json_minimal() {
        let content = r#"{
            "hub": { "name": "drive-hub" },
            "sources": [{
                "id": "replay",
                "kind": "trace",
                "params": { "path": "traces/drive.json" }
            }],
            "sinks": [{ "name": "console", "kind": "log" }]
        }"#;
        let result = parse_json(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        assert_eq!(result.unwrap().hub.name, "drive-hub");
    }

    #[test]
    fn test_defaults_fill_missing_sections() {
        let bp = parse_toml("").unwrap();
        assert_eq!(bp.hub.name, "vehicle-hub");
        assert!(bp.hub.standard_signals);
        assert!(bp.sources.is_empty());
        assert!(bp.sinks.is_empty());
    }

    #[test]
    fn test_parse_custom_signal_shapes() {
        let content = r#"
[[hub.signals]]
id = "cabin_temperature"
[hub.signals.shape.numeric]
min = -40.0
max = 85.0
unit = "C"

[[hub.signals]]
id = "door_ajar"
shape = "boolean"
evented = true
"#;
        let bp = parse_toml(content).unwrap();
        assert_eq!(bp.hub.signals.len(), 2);
        assert!(bp.hub.signals[1].evented);
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let content = "invalid toml [[[";
        let result = parse_toml(content);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, HubError::ConfigParse { .. }));
    }

    #[test]
    fn test_parse_unknown_kind_fails() {
        let content = r#"
[[sources]]
id = "x"
kind = "carrier_pigeon"
"#;
        assert!(parse_toml(content).is_err());
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_extension("toml"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("TOML"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("json"),
            Some(ConfigFormat::Json)
        );
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }
}
