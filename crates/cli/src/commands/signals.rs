//! `signals` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use contracts::{MeasurementDescriptor, MeasurementRegistry, ValueShape};

use crate::cli::SignalsArgs;

/// Signal catalog for JSON output
#[derive(Serialize)]
struct SignalCatalog {
    total: usize,
    signals: Vec<SignalInfo>,
}

#[derive(Serialize)]
struct SignalInfo {
    id: String,
    shape: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    states: Option<Vec<String>>,
    evented: bool,
}

/// Execute the `signals` command
pub fn run_signals(args: &SignalsArgs) -> Result<()> {
    let registry = match &args.config {
        Some(path) => {
            info!(config = %path.display(), "Loading signal catalog from configuration");

            if !path.exists() {
                anyhow::bail!("Configuration file not found: {}", path.display());
            }

            let blueprint = config_loader::ConfigLoader::load_from_path(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            blueprint.build_registry()
        }
        None => {
            info!("Using the standard signal catalog");
            MeasurementRegistry::standard()
        }
    };

    let mut signals: Vec<SignalInfo> = registry
        .ids()
        .iter()
        .filter_map(|id| registry.descriptor(id))
        .map(|descriptor| build_signal_info(&descriptor))
        .collect();

    if args.evented {
        signals.retain(|s| s.evented);
    }

    if args.json {
        let catalog = SignalCatalog {
            total: signals.len(),
            signals,
        };
        let json =
            serde_json::to_string_pretty(&catalog).context("Failed to serialize signal catalog")?;
        println!("{}", json);
    } else {
        print_catalog(&signals);
    }

    Ok(())
}

fn build_signal_info(descriptor: &MeasurementDescriptor) -> SignalInfo {
    match &descriptor.shape {
        ValueShape::Numeric { min, max, unit } => SignalInfo {
            id: descriptor.id.to_string(),
            shape: "numeric".to_string(),
            unit: if unit.is_empty() {
                None
            } else {
                Some(unit.clone())
            },
            min: Some(*min),
            max: Some(*max),
            states: None,
            evented: descriptor.evented,
        },
        ValueShape::Boolean => SignalInfo {
            id: descriptor.id.to_string(),
            shape: "boolean".to_string(),
            unit: None,
            min: None,
            max: None,
            states: None,
            evented: descriptor.evented,
        },
        ValueShape::State { states } => SignalInfo {
            id: descriptor.id.to_string(),
            shape: "state".to_string(),
            unit: None,
            min: None,
            max: None,
            states: Some(states.clone()),
            evented: descriptor.evented,
        },
    }
}

fn print_catalog(signals: &[SignalInfo]) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                Vehicle Hub Signal Catalog                    ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("📋 Signals ({})", signals.len());
    for (i, signal) in signals.iter().enumerate() {
        let is_last = i == signals.len() - 1;
        let prefix = if is_last { "└─" } else { "├─" };

        let detail = match signal.shape.as_str() {
            "numeric" => {
                let unit = signal.unit.as_deref().unwrap_or("-");
                let max = signal.max.unwrap_or(f64::MAX);
                if max == f64::MAX {
                    format!("numeric, {}", unit)
                } else {
                    format!(
                        "numeric, {}, {}..{}",
                        unit,
                        signal.min.unwrap_or(0.0),
                        max
                    )
                }
            }
            "state" => {
                let states = signal
                    .states
                    .as_deref()
                    .unwrap_or(&[])
                    .join(", ");
                format!("state: [{}]", states)
            }
            other => other.to_string(),
        };

        let evented = if signal.evented { ", evented" } else { "" };
        println!("   {} {} ({}{})", prefix, signal.id, detail, evented);
    }

    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog_infos() -> Vec<SignalInfo> {
        let registry = MeasurementRegistry::standard();
        registry
            .ids()
            .iter()
            .filter_map(|id| registry.descriptor(id))
            .map(|descriptor| build_signal_info(&descriptor))
            .collect()
    }

    #[test]
    fn test_catalog_shapes() {
        let signals = catalog_infos();

        let speed = signals.iter().find(|s| s.id == "vehicle_speed").unwrap();
        assert_eq!(speed.shape, "numeric");
        assert_eq!(speed.unit.as_deref(), Some("km/h"));
        assert!(speed.max.unwrap() > 0.0);

        let beam = signals.iter().find(|s| s.id == "high_beam_status").unwrap();
        assert_eq!(beam.shape, "boolean");
        assert!(beam.min.is_none());

        let gear = signals.iter().find(|s| s.id == "gear_lever_position").unwrap();
        assert_eq!(gear.shape, "state");
        assert!(gear.states.as_ref().unwrap().contains(&"drive".to_string()));
    }

    #[test]
    fn test_evented_filter_keeps_button_events() {
        let mut signals = catalog_infos();
        signals.retain(|s| s.evented);
        assert!(signals.iter().any(|s| s.id == "button_event"));
        assert!(signals.iter().all(|s| s.evented));
    }
}
