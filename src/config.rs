// Copyright 2024-2026 ImageGate Contributors
// Licensed under the Apache License, Version 2.0

//! Gateway configuration loading from environment variables.
//!
//! All values are read from `IMAGEGATE_*` environment variables with
//! sensible defaults. Invalid values fall back to defaults without crashing.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |---|---|---|
//! | `IMAGEGATE_DEVICES` | `0` | Comma-separated device indices to load |
//! | `IMAGEGATE_ALIGNMENT` | 32 | Output side alignment in pixels (8..=256) |
//! | `IMAGEGATE_SHUTDOWN_TIMEOUT` | 30 | Graceful drain timeout (secs) |
//! | `IMAGEGATE_LOG_LEVEL` | `info` | Log filter directive |
//! | `IMAGEGATE_LOG_FORMAT` | `json` | `json` or `pretty` |
//! | `IMAGEGATE_OUTPUT_DIR` | unset | Root for `file://` delivery targets |
//! | `IMAGEGATE_SIM_LATENCY_MS` | 250 | Simulated pipeline latency (ms) |

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use crate::engine::DEFAULT_ALIGNMENT;
use crate::telemetry::{LogConfig, LogFormat};
use crate::workers::WorkerHandle;
use crate::GatewayConfig;

pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_SIM_LATENCY_MS: u64 = 250;
const MIN_ALIGNMENT: u32 = 8;
const MAX_ALIGNMENT: u32 = 256;

/// Effective configuration summary (serializable).
#[derive(Debug, Clone, Serialize)]
pub struct EffectiveConfig {
    pub devices: Vec<u32>,
    pub alignment: u32,
    pub shutdown_timeout_secs: u64,
    pub log_level: String,
    pub log_format: String,
    pub output_dir: Option<String>,
    pub sim_latency_ms: u64,
}

/// All configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    /// Devices in the order listed; duplicates are kept for validation.
    pub devices: Vec<WorkerHandle>,
    pub gateway: GatewayConfig,
    pub log: LogConfig,
    pub output_dir: Option<PathBuf>,
    pub sim_latency: Duration,
}

fn parse_u32(key: &str, default: u32) -> u32 {
    match std::env::var(key) {
        Ok(val) => val.trim().parse::<u32>().unwrap_or(default),
        Err(_) => default,
    }
}

fn parse_u64(key: &str, default: u64) -> u64 {
    match std::env::var(key) {
        Ok(val) => val.trim().parse::<u64>().unwrap_or(default),
        Err(_) => default,
    }
}

/// Parse `"0,1,2"`. Any malformed entry rejects the whole list.
fn parse_devices(raw: &str) -> Option<Vec<WorkerHandle>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<u32>().ok().map(WorkerHandle::new))
        .collect()
}

fn load_devices() -> Vec<WorkerHandle> {
    let default = vec![WorkerHandle::new(0)];
    match std::env::var("IMAGEGATE_DEVICES") {
        Ok(raw) => parse_devices(&raw).unwrap_or(default),
        Err(_) => default,
    }
}

fn load_log_config() -> LogConfig {
    let level = std::env::var("IMAGEGATE_LOG_LEVEL")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| "info".to_string());
    let format = std::env::var("IMAGEGATE_LOG_FORMAT")
        .ok()
        .and_then(|v| v.parse::<LogFormat>().ok())
        .unwrap_or_default();
    LogConfig { format, level }
}

/// Load all configuration from environment variables.
///
/// Missing or invalid values fall back to safe defaults without panicking.
pub fn load() -> EnvConfig {
    let alignment = parse_u32("IMAGEGATE_ALIGNMENT", DEFAULT_ALIGNMENT)
        .clamp(MIN_ALIGNMENT, MAX_ALIGNMENT);
    let shutdown_secs = parse_u64("IMAGEGATE_SHUTDOWN_TIMEOUT", DEFAULT_SHUTDOWN_TIMEOUT_SECS).max(1);
    let sim_latency_ms = parse_u64("IMAGEGATE_SIM_LATENCY_MS", DEFAULT_SIM_LATENCY_MS);
    let output_dir = std::env::var("IMAGEGATE_OUTPUT_DIR")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from);

    EnvConfig {
        devices: load_devices(),
        gateway: GatewayConfig {
            alignment,
            shutdown_timeout: Duration::from_secs(shutdown_secs),
        },
        log: load_log_config(),
        output_dir,
        sim_latency: Duration::from_millis(sim_latency_ms),
    }
}

impl EnvConfig {
    /// Return a serializable summary of all effective values.
    pub fn effective_config(&self) -> EffectiveConfig {
        EffectiveConfig {
            devices: self.devices.iter().map(|d| d.index()).collect(),
            alignment: self.gateway.alignment,
            shutdown_timeout_secs: self.gateway.shutdown_timeout.as_secs(),
            log_level: self.log.level.clone(),
            log_format: self.log.format.as_str().to_string(),
            output_dir: self.output_dir.as_ref().map(|p| p.display().to_string()),
            sim_latency_ms: self.sim_latency.as_millis() as u64,
        }
    }

    /// Human-readable warnings for likely misconfiguration.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.devices.is_empty() {
            warnings.push("IMAGEGATE_DEVICES is empty; no worker will load".to_string());
        }
        let mut seen = std::collections::BTreeSet::new();
        for device in &self.devices {
            if !seen.insert(*device) {
                warnings.push(format!("IMAGEGATE_DEVICES lists {device} more than once"));
            }
        }
        warnings
    }
}

// Serializes env-mutating tests across modules.
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
pub(crate) const ENV_KEYS: &[&str] = &[
    "IMAGEGATE_DEVICES",
    "IMAGEGATE_ALIGNMENT",
    "IMAGEGATE_SHUTDOWN_TIMEOUT",
    "IMAGEGATE_LOG_LEVEL",
    "IMAGEGATE_LOG_FORMAT",
    "IMAGEGATE_OUTPUT_DIR",
    "IMAGEGATE_SIM_LATENCY_MS",
];

#[cfg(test)]
pub(crate) fn clear_env_vars() {
    for k in ENV_KEYS {
        std::env::remove_var(k);
    }
}
