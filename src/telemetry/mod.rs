// Copyright 2024-2026 ImageGate Contributors
// Licensed under the Apache License, Version 2.0

//! Telemetry module for ImageGate.
//!
//! Structured logging through `tracing`, per-job spans, and counters and
//! gauges through the `metrics` facade. No exporter is installed here; the
//! embedding process chooses one.

mod logging;
mod metrics;
mod spans;

pub use logging::{init_logging, LogConfig, LogError, LogFormat};
pub use self::metrics::{
    record_in_flight, record_job_failure, record_job_success, record_lease_wait,
    record_parameter_fallback, record_workers_available,
};
pub use spans::{prompt_fingerprint, JobSpan, SpanExt};
