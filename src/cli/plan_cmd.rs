// Copyright 2024-2026 ImageGate Contributors
// Licensed under the Apache License, Version 2.0

//! `plan` subcommand: print the output size a request would get.

use serde::Serialize;

use super::{flag_value, has_flag};
use crate::engine::{ImageSize, SizePlanner, DEFAULT_MEGAPIXELS};
use crate::scheduler::DEFAULT_RATIO;

#[derive(Debug, Serialize)]
struct PlanReport<'a> {
    ratio: &'a str,
    pixel: f64,
    alignment: u32,
    size: ImageSize,
    pixels: u64,
}

/// Run the plan command. Returns the process exit code.
///
/// With `--strict`, malformed input is an error instead of falling back to
/// defaults.
pub fn run(args: &[String], alignment: u32) -> i32 {
    let ratio = flag_value(args, "--ratio").unwrap_or(DEFAULT_RATIO);
    let pixel = match flag_value(args, "--pixel") {
        Some(raw) => match raw.parse::<f64>() {
            Ok(p) => p,
            Err(_) => {
                eprintln!("Error: --pixel expects a number, got {raw:?}");
                return 2;
            }
        },
        None => DEFAULT_MEGAPIXELS,
    };
    let alignment = match flag_value(args, "--alignment").map(str::parse::<u32>) {
        Some(Ok(a)) if a > 0 => a,
        Some(_) => {
            eprintln!("Error: --alignment expects a positive integer");
            return 2;
        }
        None => alignment,
    };

    let planner = SizePlanner::new(alignment);
    let size = if has_flag(args, "--strict") {
        match planner.try_plan(ratio, pixel) {
            Ok(size) => size,
            Err(e) => {
                eprintln!("Error: {e}");
                return 1;
            }
        }
    } else {
        planner.plan(ratio, pixel)
    };

    let report = PlanReport {
        ratio,
        pixel,
        alignment: planner.alignment(),
        size,
        pixels: size.pixels(),
    };
    if has_flag(args, "--json") {
        match serde_json::to_string(&report) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("Error: {e}");
                return 1;
            }
        }
    } else {
        println!(
            "{}x{} ({} pixels, ratio {}, {} MP, alignment {})",
            size.width, size.height, report.pixels, ratio, pixel, report.alignment
        );
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn plan_defaults_succeed() {
        assert_eq!(run(&args(&["plan"]), 32), 0);
    }

    #[test]
    fn strict_mode_rejects_bad_ratio() {
        assert_eq!(run(&args(&["plan", "--ratio", "wide", "--strict"]), 32), 1);
        assert_eq!(run(&args(&["plan", "--ratio", "wide"]), 32), 0);
    }

    #[test]
    fn unparsable_flags_are_usage_errors() {
        assert_eq!(run(&args(&["plan", "--pixel", "lots"]), 32), 2);
        assert_eq!(run(&args(&["plan", "--alignment", "0"]), 32), 2);
    }
}
