// Copyright 2024-2026 ImageGate Contributors
// Licensed under the Apache License, Version 2.0

//! Config CLI subcommands: show, defaults, validate.
//!
//! These commands read configuration directly from environment variables.

use crate::config::{self, EffectiveConfig, DEFAULT_SHUTDOWN_TIMEOUT_SECS, DEFAULT_SIM_LATENCY_MS};
use crate::engine::DEFAULT_ALIGNMENT;

/// Print effective config as key-value pairs to stdout.
pub fn run_show(json: bool) {
    let cfg = config::load().effective_config();
    if json {
        match serde_json::to_string_pretty(&cfg) {
            Ok(text) => println!("{text}"),
            Err(e) => eprintln!("Failed to encode config: {e}"),
        }
    } else {
        print_config(&cfg);
    }
}

/// Print default config values (no env overrides) to stdout.
pub fn run_defaults() {
    println!("IMAGEGATE_DEVICES=0");
    println!("IMAGEGATE_ALIGNMENT={DEFAULT_ALIGNMENT}");
    println!("IMAGEGATE_SHUTDOWN_TIMEOUT={DEFAULT_SHUTDOWN_TIMEOUT_SECS}");
    println!("IMAGEGATE_LOG_LEVEL=info");
    println!("IMAGEGATE_LOG_FORMAT=json");
    println!("IMAGEGATE_OUTPUT_DIR=");
    println!("IMAGEGATE_SIM_LATENCY_MS={DEFAULT_SIM_LATENCY_MS}");
}

/// Validate configuration for obvious misconfigurations.
///
/// Returns 0 if valid, 1 if any warnings are found.
pub fn run_validate() -> i32 {
    let warnings = config::load().warnings();
    if warnings.is_empty() {
        println!("Configuration is valid.");
        return 0;
    }
    for warning in &warnings {
        eprintln!("WARNING: {warning}");
    }
    1
}

fn print_config(cfg: &EffectiveConfig) {
    let devices: Vec<String> = cfg.devices.iter().map(u32::to_string).collect();
    println!("IMAGEGATE_DEVICES={}", devices.join(","));
    println!("IMAGEGATE_ALIGNMENT={}", cfg.alignment);
    println!("IMAGEGATE_SHUTDOWN_TIMEOUT={}", cfg.shutdown_timeout_secs);
    println!("IMAGEGATE_LOG_LEVEL={}", cfg.log_level);
    println!("IMAGEGATE_LOG_FORMAT={}", cfg.log_format);
    println!("IMAGEGATE_OUTPUT_DIR={}", cfg.output_dir.as_deref().unwrap_or_default());
    println!("IMAGEGATE_SIM_LATENCY_MS={}", cfg.sim_latency_ms);
}
