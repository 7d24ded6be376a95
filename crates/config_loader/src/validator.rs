//! Blueprint validation.
//!
//! Rules:
//! - signal ids unique and non-empty
//! - numeric signal ranges well-formed (min <= max), state signals non-empty
//! - source ids unique, required per-kind params present
//! - sink names unique and non-empty, required per-kind params present
//! - numeric params parse where the kind demands it

use std::collections::HashSet;
use std::net::SocketAddr;

use contracts::{HubBlueprint, HubError, SignalShape, SinkKind, SourceKind};

/// Validate a parsed blueprint.
///
/// Returns the first violation found, or Ok(()).
pub fn validate(blueprint: &HubBlueprint) -> Result<(), HubError> {
    validate_signals(blueprint)?;
    validate_sources(blueprint)?;
    validate_sinks(blueprint)?;
    Ok(())
}

/// Signal id uniqueness and shape sanity
fn validate_signals(blueprint: &HubBlueprint) -> Result<(), HubError> {
    let mut seen = HashSet::new();
    for signal in &blueprint.hub.signals {
        if signal.id.is_empty() {
            return Err(HubError::config_validation(
                "hub.signals[].id",
                "signal id cannot be empty",
            ));
        }
        if !seen.insert(&signal.id) {
            return Err(HubError::config_validation(
                format!("hub.signals[id={}]", signal.id),
                "duplicate signal id",
            ));
        }
        match &signal.shape {
            SignalShape::Numeric { min, max, .. } => {
                if min > max {
                    return Err(HubError::config_validation(
                        format!("hub.signals[id={}].shape", signal.id),
                        format!("min ({min}) must be <= max ({max})"),
                    ));
                }
            }
            SignalShape::State { states } => {
                if states.is_empty() {
                    return Err(HubError::config_validation(
                        format!("hub.signals[id={}].shape", signal.id),
                        "state signal needs at least one state",
                    ));
                }
            }
            SignalShape::Boolean => {}
        }
    }
    Ok(())
}

/// Source id uniqueness and per-kind required params
fn validate_sources(blueprint: &HubBlueprint) -> Result<(), HubError> {
    let mut seen = HashSet::new();
    for source in &blueprint.sources {
        if source.id.is_empty() {
            return Err(HubError::config_validation(
                "sources[].id",
                "source id cannot be empty",
            ));
        }
        if !seen.insert(&source.id) {
            return Err(HubError::config_validation(
                format!("sources[id={}]", source.id),
                "duplicate source id",
            ));
        }

        match source.kind {
            SourceKind::Trace => {
                if !source.params.contains_key("path") {
                    return Err(HubError::config_validation(
                        format!("sources[id={}].params.path", source.id),
                        "trace source requires a 'path' parameter",
                    ));
                }
                validate_positive_number(&source.params, "speed", &source.id, "sources")?;
            }
            SourceKind::Mock => {
                validate_positive_number(&source.params, "frequency_hz", &source.id, "sources")?;
            }
        }
    }
    Ok(())
}

/// Sink name uniqueness and per-kind required params
fn validate_sinks(blueprint: &HubBlueprint) -> Result<(), HubError> {
    let mut seen = HashSet::new();
    for sink in &blueprint.sinks {
        if sink.name.is_empty() {
            return Err(HubError::config_validation(
                "sinks[].name",
                "sink name cannot be empty",
            ));
        }
        if !seen.insert(&sink.name) {
            return Err(HubError::config_validation(
                format!("sinks[name={}]", sink.name),
                "duplicate sink name",
            ));
        }

        match sink.kind {
            SinkKind::Trace => {
                if !sink.params.contains_key("path") {
                    return Err(HubError::config_validation(
                        format!("sinks[name={}].params.path", sink.name),
                        "trace sink requires a 'path' parameter",
                    ));
                }
            }
            SinkKind::Relay => {
                let Some(addr) = sink.params.get("addr") else {
                    return Err(HubError::config_validation(
                        format!("sinks[name={}].params.addr", sink.name),
                        "relay sink requires an 'addr' parameter",
                    ));
                };
                if addr.parse::<SocketAddr>().is_err() {
                    return Err(HubError::config_validation(
                        format!("sinks[name={}].params.addr", sink.name),
                        format!("'{addr}' is not a valid socket address"),
                    ));
                }
            }
            SinkKind::Log => {
                validate_positive_number(&sink.params, "interval", &sink.name, "sinks")?;
            }
        }
    }
    Ok(())
}

/// Optional numeric param: absent is fine, present must parse > 0
fn validate_positive_number(
    params: &std::collections::HashMap<String, String>,
    key: &str,
    id: &str,
    section: &str,
) -> Result<(), HubError> {
    let Some(raw) = params.get(key) else {
        return Ok(());
    };
    match raw.parse::<f64>() {
        Ok(v) if v > 0.0 => Ok(()),
        Ok(v) => Err(HubError::config_validation(
            format!("{section}[{id}].params.{key}"),
            format!("{key} must be > 0, got {v}"),
        )),
        Err(_) => Err(HubError::config_validation(
            format!("{section}[{id}].params.{key}"),
            format!("{key} must be a number, got '{raw}'"),
        )),
    }
}
