// Copyright 2024-2026 ImageGate Contributors
// Licensed under the Apache License, Version 2.0

//! Fuzz target for output size derivation.
//!
//! Any ratio string, pixel target and alignment must yield an aligned size
//! within bounds, never a panic.

#![no_main]

use arbitrary::Arbitrary;
use imagegate::engine::sizing::MAX_SIDE;
use imagegate::engine::SizePlanner;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    ratio: String,
    pixel: f64,
    alignment: u16,
}

fuzz_target!(|input: Input| {
    let planner = SizePlanner::new(u32::from(input.alignment));
    let size = planner.plan(&input.ratio, input.pixel);
    let unit = planner.alignment();

    assert_eq!(size.width % unit, 0);
    assert_eq!(size.height % unit, 0);
    assert!(size.width >= unit && size.width <= MAX_SIDE);
    assert!(size.height >= unit && size.height <= MAX_SIDE);

    if let Ok(strict) = planner.try_plan(&input.ratio, input.pixel) {
        assert_eq!(strict, size);
    }
});
