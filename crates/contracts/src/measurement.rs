//! Measurement descriptors, the process-wide registry and typed measurements.
//!
//! The registry maps a `MeasurementId` to the metadata needed to reify a raw
//! `VehicleRecord` into a validated `Measurement`. It is built once at
//! startup and shared read-only afterwards.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::{HubError, MeasurementId, Value, VehicleRecord};

/// Payload shape a measurement type accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueShape {
    /// Numeric payload with a nominal range and display unit
    Numeric { min: f64, max: f64, unit: String },

    /// Boolean payload
    Boolean,

    /// One of a fixed set of state strings
    State { states: Vec<String> },
}

/// Metadata for one measurement type.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementDescriptor {
    /// Stable process-wide identifier
    pub id: MeasurementId,

    /// Accepted payload shape
    pub shape: ValueShape,

    /// Whether records of this type may carry an event payload
    pub evented: bool,
}

impl MeasurementDescriptor {
    /// Numeric measurement with a nominal range and unit.
    pub fn numeric(id: impl Into<MeasurementId>, unit: &str, min: f64, max: f64) -> Self {
        Self {
            id: id.into(),
            shape: ValueShape::Numeric {
                min,
                max,
                unit: unit.to_string(),
            },
            evented: false,
        }
    }

    /// Boolean measurement.
    pub fn boolean(id: impl Into<MeasurementId>) -> Self {
        Self {
            id: id.into(),
            shape: ValueShape::Boolean,
            evented: false,
        }
    }

    /// State measurement over a fixed state set.
    pub fn state<S: AsRef<str>>(id: impl Into<MeasurementId>, states: &[S]) -> Self {
        Self {
            id: id.into(),
            shape: ValueShape::State {
                states: states.iter().map(|s| s.as_ref().to_string()).collect(),
            },
            evented: false,
        }
    }

    /// Mark this type as evented (dual name/value semantics).
    pub fn evented(mut self) -> Self {
        self.evented = true;
        self
    }

    /// Display unit, empty for non-numeric shapes.
    pub fn unit(&self) -> &str {
        match &self.shape {
            ValueShape::Numeric { unit, .. } => unit,
            _ => "",
        }
    }

    /// Check a payload value against this descriptor's shape.
    fn check_value(&self, value: &Value) -> Result<(), HubError> {
        match (&self.shape, value) {
            (ValueShape::Numeric { .. }, Value::Num(_)) => Ok(()),
            (ValueShape::Boolean, Value::Bool(_)) => Ok(()),
            (ValueShape::State { states }, Value::Str(s)) => {
                if states.iter().any(|known| known == s) {
                    Ok(())
                } else {
                    Err(HubError::malformed(
                        self.id.as_str(),
                        format!("'{s}' is not a valid state"),
                    ))
                }
            }
            (expected, got) => Err(HubError::malformed(
                self.id.as_str(),
                format!("payload {got:?} does not match shape {expected:?}"),
            )),
        }
    }
}

/// Process-wide catalog of measurement types.
///
/// Identifier to descriptor lookups are deterministic in both directions:
/// every descriptor knows its id, and `descriptor()` either returns the one
/// registered entry or nothing. Built at startup, then shared immutably.
#[derive(Debug, Default)]
pub struct MeasurementRegistry {
    descriptors: HashMap<MeasurementId, Arc<MeasurementDescriptor>>,
}

impl MeasurementRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the standard vehicle signal catalog.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for descriptor in standard_descriptors() {
            registry.register(descriptor);
        }
        registry
    }

    /// Register a descriptor, replacing any previous entry with the same id.
    pub fn register(&mut self, descriptor: MeasurementDescriptor) {
        self.descriptors
            .insert(descriptor.id.clone(), Arc::new(descriptor));
    }

    /// Look up the descriptor for an identifier.
    pub fn descriptor(&self, id: &str) -> Option<Arc<MeasurementDescriptor>> {
        self.descriptors.get(id).cloned()
    }

    /// Whether an identifier is known.
    pub fn contains(&self, id: &str) -> bool {
        self.descriptors.contains_key(id)
    }

    /// All registered identifiers, sorted for stable display.
    pub fn ids(&self) -> Vec<MeasurementId> {
        let mut ids: Vec<MeasurementId> = self.descriptors.keys().cloned().collect();
        ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        ids
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Reify a raw record into a typed, validated measurement.
    ///
    /// # Errors
    /// - `UnrecognizedMeasurement` if the record's name is not registered
    /// - `NoValue` if the record carries no payload
    /// - `MalformedRecord` if the payload does not match the descriptor
    pub fn reify(&self, record: &VehicleRecord) -> Result<Measurement, HubError> {
        let descriptor = self
            .descriptor(record.name.as_str())
            .ok_or_else(|| HubError::unrecognized(record.name.as_str()))?;

        let value = record
            .value
            .clone()
            .ok_or_else(|| HubError::no_value(record.name.as_str()))?;

        descriptor.check_value(&value)?;

        if record.event.is_some() && !descriptor.evented {
            return Err(HubError::malformed(
                record.name.as_str(),
                "event payload on a non-evented measurement type",
            ));
        }

        Ok(Measurement {
            descriptor,
            value,
            event: record.event.clone(),
            timestamp: record.timestamp,
        })
    }
}

/// A raw record reified against its descriptor.
///
/// Always carries a payload value; "never received" is represented by the
/// absence of a `Measurement` (the `NoValue` error), not by a default value.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    descriptor: Arc<MeasurementDescriptor>,
    value: Value,
    event: Option<Value>,
    timestamp: Option<f64>,
}

impl Measurement {
    pub fn id(&self) -> &MeasurementId {
        &self.descriptor.id
    }

    pub fn descriptor(&self) -> &MeasurementDescriptor {
        &self.descriptor
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn event(&self) -> Option<&Value> {
        self.event.as_ref()
    }

    pub fn timestamp(&self) -> Option<f64> {
        self.timestamp
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.value.as_f64()
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.value.as_bool()
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = self.descriptor.unit();
        if unit.is_empty() {
            write!(f, "{}: {}", self.descriptor.id, self.value)
        } else {
            write!(f, "{}: {} {}", self.descriptor.id, self.value, unit)
        }
    }
}

/// The standard vehicle signal catalog.
fn standard_descriptors() -> Vec<MeasurementDescriptor> {
    use MeasurementDescriptor as D;

    let gears = [
        "first", "second", "third", "fourth", "fifth", "sixth", "seventh", "eighth", "reverse",
        "neutral",
    ];
    let lever = [
        "neutral", "park", "reverse", "drive", "sport", "low", "first", "second", "third",
        "fourth", "fifth", "sixth",
    ];

    vec![
        D::numeric("vehicle_speed", "km/h", 0.0, 655.0),
        D::numeric("engine_speed", "RPM", 0.0, 65535.0),
        D::numeric("steering_wheel_angle", "degrees", -600.0, 600.0),
        D::numeric("torque_at_transmission", "Nm", -1500.0, 1500.0),
        D::numeric("accelerator_pedal_position", "%", 0.0, 100.0),
        D::numeric("fuel_level", "%", 0.0, 100.0),
        D::numeric("fuel_consumed_since_restart", "L", 0.0, 4294967295.0),
        D::numeric("odometer", "km", 0.0, 16777214.0),
        D::numeric("latitude", "degrees", -90.0, 90.0),
        D::numeric("longitude", "degrees", -180.0, 180.0),
        D::boolean("parking_brake_status"),
        D::boolean("brake_pedal_status"),
        D::boolean("headlamp_status"),
        D::boolean("high_beam_status"),
        D::boolean("windshield_wiper_status"),
        D::state("ignition_status", &["off", "accessory", "run", "start"]),
        D::state("transmission_gear_position", &gears),
        D::state("gear_lever_position", &lever),
        D::state(
            "door_status",
            &["driver", "passenger", "rear_left", "rear_right"],
        )
        .evented(),
        D::state("button_event", &["left", "right", "up", "down", "ok"]).evented(),
    ]
}
