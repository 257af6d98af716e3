// Copyright 2024-2026 ImageGate Contributors
// Licensed under the Apache License, Version 2.0

//! CLI subcommands for the ImageGate binary.
//!
//! ## Usage
//!
//! ```bash
//! imagegate-cli plan --ratio 16:9 --pixel 1.0   # Show derived output size
//! imagegate-cli simulate --jobs 8               # Run jobs on simulated workers
//! imagegate-cli config show                     # Show effective configuration
//! ```

pub mod config_cmd;
pub mod plan_cmd;
pub mod simulate_cmd;

/// Value following `flag` in `args`, if present.
pub fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

/// Whether `flag` appears in `args`.
pub fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}
