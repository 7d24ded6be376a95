//! VehicleRecord - the wire-level unit exchanged across the remote boundary
//! and within the pipeline.
//!
//! Wire form is a flat JSON object:
//! `{"name": "...", "value": ..., "event": ..., "timestamp": ...}`
//! where `event` and `timestamp` are optional.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::MeasurementId;

/// Scalar payload carried by a record.
///
/// Untagged on the wire: booleans, numbers and strings serialize as bare
/// JSON scalars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Num(f64),
    Str(String),
}

impl Value {
    /// Numeric view, `None` for non-numeric payloads.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Num(n) => Some(*n),
            _ => None,
        }
    }

    /// Boolean view, `None` for non-boolean payloads.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// String view, `None` for non-string payloads.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Num(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Num(n) => write!(f, "{n}"),
            Value::Str(s) => write!(f, "{s}"),
        }
    }
}

/// Untyped wire record: a measurement type identifier, an optional payload
/// value and an optional event payload (for dual name/value measurements).
///
/// Immutable once constructed; the pipeline passes records by reference and
/// never retains them beyond the latest-value cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleRecord {
    /// Measurement type identifier (e.g. "vehicle_speed")
    pub name: MeasurementId,

    /// Payload value, absent for queries that returned no data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    /// Event payload, only meaningful for evented measurement types
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<Value>,

    /// Unix seconds at the producing source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
}

impl VehicleRecord {
    /// Create a record with a payload value.
    pub fn new(name: impl Into<MeasurementId>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            event: None,
            timestamp: None,
        }
    }

    /// Create a record carrying both a value and an event payload.
    pub fn with_event(
        name: impl Into<MeasurementId>,
        value: impl Into<Value>,
        event: impl Into<Value>,
    ) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            event: Some(event.into()),
            timestamp: None,
        }
    }

    /// Create a record with no payload (a "no data" answer).
    pub fn empty(name: impl Into<MeasurementId>) -> Self {
        Self {
            name: name.into(),
            value: None,
            event: None,
            timestamp: None,
        }
    }

    /// Attach a timestamp, replacing any existing one.
    pub fn at(mut self, timestamp: f64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Stamp the record with the current wall clock if it has no timestamp.
    pub fn stamped(self) -> Self {
        if self.timestamp.is_some() {
            return self;
        }
        Self {
            timestamp: Some(unix_now()),
            ..self
        }
    }

    /// Whether the record carries a payload value.
    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }
}

/// Current wall clock as unix seconds.
pub(crate) fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
