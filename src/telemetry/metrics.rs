// Copyright 2024-2026 ImageGate Contributors
// Licensed under the Apache License, Version 2.0

//! Metric recording through the `metrics` facade.
//!
//! Without an installed recorder these calls are no-ops.

use crate::workers::WorkerHandle;

pub fn record_job_success(device: WorkerHandle, latency_ms: u64) {
    metrics::counter!("imagegate_jobs_total", "outcome" => "success").increment(1);
    metrics::histogram!("imagegate_job_latency_ms", "device" => device.index().to_string())
        .record(latency_ms as f64);
}

/// `kind` is the stable error kind string.
pub fn record_job_failure(kind: &'static str) {
    metrics::counter!("imagegate_jobs_total", "outcome" => kind).increment(1);
}

pub fn record_in_flight(count: usize) {
    metrics::gauge!("imagegate_in_flight").set(count as f64);
}

pub fn record_workers_available(count: usize) {
    metrics::gauge!("imagegate_workers_available").set(count as f64);
}

/// Time a job spent waiting for a device.
pub fn record_lease_wait(wait_ms: u64) {
    metrics::histogram!("imagegate_lease_wait_ms").record(wait_ms as f64);
}

pub fn record_parameter_fallback(field: &'static str) {
    metrics::counter!("imagegate_parameter_fallbacks_total", "field" => field).increment(1);
}
