//! HubBlueprint - Config Loader output
//!
//! Describes a complete hub deployment: signal catalog extensions, attached
//! sources and output sinks.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{MeasurementDescriptor, MeasurementRegistry};

/// Config version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete hub configuration blueprint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubBlueprint {
    /// Config version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Hub-wide settings
    #[serde(default)]
    pub hub: HubSettings,

    /// Attached source definitions
    #[serde(default)]
    pub sources: Vec<SourceConfig>,

    /// Output sink definitions
    #[serde(default)]
    pub sinks: Vec<SinkConfig>,
}

/// Hub-wide settings: instance name and signal catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubSettings {
    /// Instance name (used in logs and summaries)
    #[serde(default = "default_hub_name")]
    pub name: String,

    /// Start from the standard vehicle signal catalog
    #[serde(default = "default_true")]
    pub standard_signals: bool,

    /// Additional signal definitions on top of the catalog
    #[serde(default)]
    pub signals: Vec<SignalConfig>,
}

impl Default for HubSettings {
    fn default() -> Self {
        Self {
            name: default_hub_name(),
            standard_signals: true,
            signals: Vec::new(),
        }
    }
}

fn default_hub_name() -> String {
    "vehicle-hub".to_string()
}

fn default_true() -> bool {
    true
}

/// One custom signal definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalConfig {
    /// Unique measurement type identifier
    pub id: String,

    /// Payload shape
    #[serde(default)]
    pub shape: SignalShape,

    /// Whether records of this type may carry an event payload
    #[serde(default)]
    pub evented: bool,
}

/// Payload shape of a configured signal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalShape {
    Numeric {
        #[serde(default)]
        min: f64,
        #[serde(default = "default_numeric_max")]
        max: f64,
        #[serde(default)]
        unit: String,
    },
    Boolean,
    State {
        states: Vec<String>,
    },
}

impl Default for SignalShape {
    fn default() -> Self {
        SignalShape::Boolean
    }
}

fn default_numeric_max() -> f64 {
    f64::MAX
}

impl SignalConfig {
    /// Convert into a registry descriptor.
    pub fn to_descriptor(&self) -> MeasurementDescriptor {
        let descriptor = match &self.shape {
            SignalShape::Numeric { min, max, unit } => {
                MeasurementDescriptor::numeric(self.id.as_str(), unit, *min, *max)
            }
            SignalShape::Boolean => MeasurementDescriptor::boolean(self.id.as_str()),
            SignalShape::State { states } => {
                MeasurementDescriptor::state(self.id.as_str(), states)
            }
        };
        if self.evented {
            descriptor.evented()
        } else {
            descriptor
        }
    }
}

/// Source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Unique identifier
    pub id: String,

    /// Source kind
    pub kind: SourceKind,

    /// Kind-specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

/// Source kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// JSON-lines trace file playback
    Trace,
    /// Deterministic scripted emitter
    Mock,
}

/// Sink configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Sink name
    pub name: String,

    /// Sink kind
    pub kind: SinkKind,

    /// Kind-specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

/// Sink kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkKind {
    /// Periodic throughput summary in the log
    Log,
    /// JSON-lines trace recorder
    Trace,
    /// UDP datagram relay
    Relay,
}

impl HubBlueprint {
    /// Build the measurement registry described by this blueprint.
    pub fn build_registry(&self) -> MeasurementRegistry {
        let mut registry = if self.hub.standard_signals {
            MeasurementRegistry::standard()
        } else {
            MeasurementRegistry::new()
        };
        for signal in &self.hub.signals {
            registry.register(signal.to_descriptor());
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ValueShape;

    fn sample_blueprint() -> HubBlueprint {
        HubBlueprint {
            version: ConfigVersion::V1,
            hub: HubSettings {
                name: "test-hub".into(),
                standard_signals: true,
                signals: vec![SignalConfig {
                    id: "cabin_temperature".into(),
                    shape: SignalShape::Numeric {
                        min: -40.0,
                        max: 85.0,
                        unit: "C".into(),
                    },
                    evented: false,
                }],
            },
            sources: vec![SourceConfig {
                id: "trace_replay".into(),
                kind: SourceKind::Trace,
                params: HashMap::from([("path".to_string(), "drive.json".to_string())]),
            }],
            sinks: vec![SinkConfig {
                name: "recorder".into(),
                kind: SinkKind::Trace,
                params: HashMap::from([("path".to_string(), "out.json".to_string())]),
            }],
        }
    }

    #[test]
    fn registry_includes_standard_and_custom() {
        let blueprint = sample_blueprint();
        let registry = blueprint.build_registry();
        assert!(registry.contains("vehicle_speed"));

        let custom = registry.descriptor("cabin_temperature").unwrap();
        assert_eq!(
            custom.shape,
            ValueShape::Numeric {
                min: -40.0,
                max: 85.0,
                unit: "C".into()
            }
        );
    }

    #[test]
    fn registry_without_standard_catalog() {
        let mut blueprint = sample_blueprint();
        blueprint.hub.standard_signals = false;
        let registry = blueprint.build_registry();
        assert!(!registry.contains("vehicle_speed"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn custom_signal_evented_flag() {
        let config = SignalConfig {
            id: "lane_change".into(),
            shape: SignalShape::State {
                states: vec!["left".into(), "right".into()],
            },
            evented: true,
        };
        let descriptor = config.to_descriptor();
        assert!(descriptor.evented);
    }
}
