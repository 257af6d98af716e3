// Copyright 2024-2026 ImageGate Contributors
// Licensed under the Apache License, Version 2.0

//! Runs one job on one leased device.
//!
//! `run` is synchronous and meant for a blocking thread. It takes the lease
//! by value, so the device returns to the pool when `run` exits on any path:
//! success, any `JobError`, or a panic unwinding out of the pipeline.

use std::sync::Arc;
use std::time::Instant;

use super::error::JobError;
use super::job::{ImagePayload, Job, JobOutput};
use crate::delivery::ResultSink;
use crate::engine::{resolve_seed, EncodedImage, GenerationParams, SizePlanner};
use crate::telemetry::{self, JobSpan, SpanExt};
use crate::workers::{WorkerHandle, WorkerLease, WorkerRegistry};

pub struct JobExecutor {
    registry: Arc<WorkerRegistry>,
    planner: SizePlanner,
    sink: Arc<dyn ResultSink>,
}

impl JobExecutor {
    pub fn new(registry: Arc<WorkerRegistry>, planner: SizePlanner, sink: Arc<dyn ResultSink>) -> Self {
        Self { registry, planner, sink }
    }

    /// Execute `job` on the leased device.
    pub fn run(&self, job: &Job, lease: WorkerLease) -> Result<JobOutput, JobError> {
        let device = lease.handle();
        let span = JobSpan::new(&job.id.to_string(), device, &job.prompt);
        let _enter = span.enter();
        let start = Instant::now();

        let result = self.execute(job, device);
        let latency_ms = start.elapsed().as_millis() as u64;

        span.record_result(&result);
        span.record("latency_ms", latency_ms);
        match &result {
            Ok(_) => {
                telemetry::record_job_success(device, latency_ms);
                tracing::info!(latency_ms, "job completed");
            }
            Err(e) => {
                span.record("error.kind", e.kind().as_str());
                telemetry::record_job_failure(e.kind().as_str());
                tracing::warn!(error = %e, latency_ms, "job failed");
            }
        }

        tracing::debug!(held_ms = lease.held_for().as_millis() as u64, "releasing device");
        drop(lease);
        result
    }

    /// Resolve the concrete generation parameters for `job`.
    ///
    /// Deterministic whenever the job carries a seed.
    pub fn derive_params(&self, job: &Job) -> GenerationParams {
        GenerationParams {
            prompt: job.prompt.clone(),
            size: self.planner.plan(&job.ratio, job.megapixels),
            steps: job.steps,
            guidance: job.guidance,
            seed: resolve_seed(job.seed),
        }
    }

    fn execute(&self, job: &Job, device: WorkerHandle) -> Result<JobOutput, JobError> {
        let context = self
            .registry
            .resolve(device)
            .ok_or_else(|| JobError::Execution(format!("no execution context for {device}")))?;

        let params = self.derive_params(job);
        let span = tracing::Span::current();
        span.record("seed", params.seed);
        span.record("width", params.size.width);
        span.record("height", params.size.height);

        let image = context.generate(&params)?;
        let payload = self.post_process(job, image)?;

        Ok(JobOutput {
            job_id: job.id,
            device,
            seed: params.seed,
            size: params.size,
            payload,
        })
    }

    fn post_process(&self, job: &Job, image: EncodedImage) -> Result<ImagePayload, JobError> {
        match &job.target {
            Some(target) => {
                self.sink.deliver(target, &image)?;
                Ok(ImagePayload::Delivered { image_url: target.public_url().to_string() })
            }
            None => Ok(ImagePayload::Inline { media_type: image.media_type, bytes: image.bytes }),
        }
    }
}
