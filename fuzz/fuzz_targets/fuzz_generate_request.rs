// Copyright 2024-2026 ImageGate Contributors
// Licensed under the Apache License, Version 2.0

//! Fuzz target for generation request decoding.
//!
//! Arbitrary bytes parsed as a request must either fail to decode or produce
//! a job whose parameters can be derived without panicking.

#![no_main]

use imagegate::engine::SizePlanner;
use imagegate::scheduler::GenerateRequest;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(request) = serde_json::from_slice::<GenerateRequest>(data) else {
        return;
    };
    let job = request.into_job();
    let _ = SizePlanner::default().plan(&job.ratio, job.megapixels);
    if let Some(target) = &job.target {
        assert!(!target.public_url().contains('?'));
    }
});
