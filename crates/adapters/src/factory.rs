//! Adapter factory
//!
//! Constructs sources and sinks from blueprint config entries. Construction
//! failures carry the adapter kind and the offending parameter so a bad
//! config line is traceable from the error alone.

use std::sync::Arc;

use tracing::info;

use contracts::{
    HubError, RecordSink, RecordSource, SinkConfig, SinkKind, SourceConfig, SourceKind,
};
use pipeline::{LogSink, RelaySink, TraceSink};

use crate::{MockSource, TraceSource};

/// Construct a source from its config entry.
pub fn build_source(config: &SourceConfig) -> Result<Arc<dyn RecordSource>, HubError> {
    let source: Arc<dyn RecordSource> = match config.kind {
        SourceKind::Trace => {
            Arc::new(TraceSource::from_params(config.id.clone(), &config.params)?)
        }
        SourceKind::Mock => Arc::new(MockSource::from_params(config.id.clone(), &config.params)),
    };

    info!(source = %config.id, kind = ?config.kind, "Source constructed");
    Ok(source)
}

/// Construct a sink from its config entry.
pub fn build_sink(config: &SinkConfig) -> Result<Arc<dyn RecordSink>, HubError> {
    let sink: Arc<dyn RecordSink> = match config.kind {
        SinkKind::Log => Arc::new(LogSink::from_params(config.name.clone(), &config.params)),
        SinkKind::Trace => Arc::new(TraceSink::from_params(config.name.clone(), &config.params)?),
        SinkKind::Relay => Arc::new(RelaySink::from_params(config.name.clone(), &config.params)?),
    };

    info!(sink = %config.name, kind = ?config.kind, "Sink constructed");
    Ok(sink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn builds_mock_source() {
        let config = SourceConfig {
            id: "dev_feed".to_string(),
            kind: SourceKind::Mock,
            params: HashMap::from([("frequency_hz".to_string(), "5".to_string())]),
        };
        let source = build_source(&config).unwrap();
        assert_eq!(source.name(), "dev_feed");
        assert!(!source.is_running());
    }

    #[test]
    fn trace_source_needs_path() {
        let config = SourceConfig {
            id: "replay".to_string(),
            kind: SourceKind::Trace,
            params: HashMap::new(),
        };
        let err = build_source(&config).unwrap_err();
        assert!(matches!(err, HubError::Construction { .. }));
    }

    #[test]
    fn builds_log_and_trace_sinks() {
        let sink = build_sink(&SinkConfig {
            name: "console".to_string(),
            kind: SinkKind::Log,
            params: HashMap::new(),
        })
        .unwrap();
        assert_eq!(sink.name(), "console");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let sink = build_sink(&SinkConfig {
            name: "recorder".to_string(),
            kind: SinkKind::Trace,
            params: HashMap::from([("path".to_string(), path.display().to_string())]),
        })
        .unwrap();
        assert_eq!(sink.name(), "recorder");
    }

    #[test]
    fn relay_sink_rejects_bad_addr() {
        let err = build_sink(&SinkConfig {
            name: "relay".to_string(),
            kind: SinkKind::Relay,
            params: HashMap::from([("addr".to_string(), "not-an-address".to_string())]),
        })
        .unwrap_err();
        assert!(matches!(err, HubError::Construction { .. }));
    }
}
