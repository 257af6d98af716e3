// Copyright 2024-2026 ImageGate Contributors
// Licensed under the Apache License, Version 2.0

//! ImageGate command-line entry point.
//!
//! ## CLI Subcommands
//!
//! - `imagegate-cli plan` - Show the output size for a ratio and pixel target
//! - `imagegate-cli simulate` - Run a burst of jobs on simulated devices
//! - `imagegate-cli config` - Show, list defaults for, or validate configuration

use std::process::ExitCode;

use imagegate::cli::{config_cmd, has_flag, plan_cmd, simulate_cmd};
use imagegate::config as gate_config;
use imagegate::telemetry;

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("help");

    match command {
        "plan" => {
            let config = gate_config::load();
            let code = plan_cmd::run(&args, config.gateway.alignment);
            ExitCode::from(code as u8)
        }
        "simulate" => {
            let options = match simulate_cmd::SimulateOptions::from_args(&args) {
                Ok(options) => options,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    print_command_help("simulate");
                    return ExitCode::from(2u8);
                }
            };
            let config = gate_config::load();
            for warning in config.warnings() {
                eprintln!("WARNING: {}", warning);
            }
            if let Err(e) = telemetry::init_logging(&config.log) {
                eprintln!("Logging setup failed: {}", e);
                return ExitCode::FAILURE;
            }
            let code = simulate_cmd::run(&options, &config).await;
            ExitCode::from(code as u8)
        }
        "config" => {
            let subcommand = args.get(2).map(|s| s.as_str()).unwrap_or("show");
            match subcommand {
                "show" => {
                    config_cmd::run_show(has_flag(&args, "--json"));
                    ExitCode::SUCCESS
                }
                "defaults" => {
                    config_cmd::run_defaults();
                    ExitCode::SUCCESS
                }
                "validate" => {
                    let code = config_cmd::run_validate();
                    ExitCode::from(code as u8)
                }
                _ => {
                    eprintln!("Unknown config subcommand: {}", subcommand);
                    print_command_help("config");
                    ExitCode::FAILURE
                }
            }
        }
        "help" | "--help" | "-h" => {
            if let Some(subcommand) = args.get(2) {
                print_command_help(subcommand);
            } else {
                print_usage();
            }
            ExitCode::SUCCESS
        }
        "version" | "--version" | "-V" => {
            println!("imagegate {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            ExitCode::FAILURE
        }
    }
}

fn print_usage() {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!(
        "imagegate - image generation dispatch gateway v{}

USAGE:
    imagegate-cli <COMMAND> [OPTIONS]

COMMANDS:
    plan        Show the output size for a ratio and megapixel target
    simulate    Run jobs through the gateway on simulated devices
    config      Configuration management (show, defaults, validate)
    version     Show version information
    help        Show this help message

Run 'imagegate-cli help <COMMAND>' for details on a command.",
        version
    );
}

fn print_command_help(command: &str) {
    match command {
        "plan" => eprintln!(
            "imagegate-cli plan [--ratio W:H] [--pixel MP] [--alignment N] [--strict] [--json]

Derive the output size. Without --strict a malformed ratio falls back to 1:1
and a bad pixel target to 1.0 megapixels.

EXIT CODES:
    0   Size derived
    1   Invalid input (--strict)
    2   Usage error"
        ),
        "simulate" => eprintln!(
            "imagegate-cli simulate [--jobs N] [--prompt TEXT] [--ratio W:H] [--pixel MP] [--seed N] [--json]

Load one simulated worker per IMAGEGATE_DEVICES entry and submit N jobs at
once. Jobs beyond the device count wait for a free device.

ENVIRONMENT:
    IMAGEGATE_SIM_LATENCY_MS    Per-job simulated latency
    IMAGEGATE_OUTPUT_DIR        Deliver images as files under this directory

EXIT CODES:
    0   All jobs succeeded
    1   At least one job failed
    2   Usage error"
        ),
        "config" => eprintln!(
            "imagegate-cli config <show|defaults|validate> [--json]

    show        Print effective configuration from the environment
    defaults    Print default values
    validate    Exit 1 if the configuration has warnings"
        ),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
        }
    }
}
