//! Layered error definitions
//!
//! Categorized by source: query / remote / adapter / config

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum HubError {
    // ===== Query Errors =====
    /// No data has ever arrived for the requested measurement
    #[error("no value available for '{measurement}'")]
    NoValue { measurement: String },

    /// The measurement registry does not know this type identifier
    #[error("unrecognized measurement type: {measurement}")]
    UnrecognizedMeasurement { measurement: String },

    /// The record payload does not match the measurement descriptor
    #[error("malformed record for '{measurement}': {message}")]
    MalformedRecord {
        measurement: String,
        message: String,
    },

    // ===== Remote Errors =====
    /// Any failure reaching the remote aggregation endpoint
    #[error("remote endpoint unavailable: {message}")]
    RemoteUnavailable { message: String },

    // ===== Adapter Errors =====
    /// An adapter could not be constructed (bad address, missing file, ...)
    #[error("failed to construct '{adapter}': {message}")]
    Construction { adapter: String, message: String },

    /// Sink write error
    #[error("sink '{sink_name}' write error: {message}")]
    SinkWrite { sink_name: String, message: String },

    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl HubError {
    /// Create a no-value error
    pub fn no_value(measurement: impl Into<String>) -> Self {
        Self::NoValue {
            measurement: measurement.into(),
        }
    }

    /// Create an unrecognized-measurement error
    pub fn unrecognized(measurement: impl Into<String>) -> Self {
        Self::UnrecognizedMeasurement {
            measurement: measurement.into(),
        }
    }

    /// Create a malformed-record error
    pub fn malformed(measurement: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedRecord {
            measurement: measurement.into(),
            message: message.into(),
        }
    }

    /// Create a remote-unavailable error
    pub fn remote_unavailable(message: impl Into<String>) -> Self {
        Self::RemoteUnavailable {
            message: message.into(),
        }
    }

    /// Create an adapter construction error
    pub fn construction(adapter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Construction {
            adapter: adapter.into(),
            message: message.into(),
        }
    }

    /// Create a sink write error
    pub fn sink_write(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }

    /// Create a configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }
}
