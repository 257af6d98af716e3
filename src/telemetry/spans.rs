// Copyright 2024-2026 ImageGate Contributors
// Licensed under the Apache License, Version 2.0

//! Span utilities for job tracing.

use sha2::{Digest, Sha256};
use tracing::{info_span, Span};

use crate::workers::WorkerHandle;

/// Extension trait for recording outcomes into spans.
pub trait SpanExt {
    fn record_result<T, E>(&self, result: &Result<T, E>)
    where
        E: std::fmt::Display;
}

impl SpanExt for Span {
    fn record_result<T, E>(&self, result: &Result<T, E>)
    where
        E: std::fmt::Display,
    {
        match result {
            Ok(_) => {
                self.record("status", "ok");
            }
            Err(e) => {
                self.record("status", "error");
                self.record("error.message", e.to_string().as_str());
            }
        }
    }
}

/// Factory for per-job spans.
pub struct JobSpan;

impl JobSpan {
    /// Span covering one job's execution on a leased device.
    ///
    /// `seed`, `width`, `height`, `status`, `error.kind`, `error.message`
    /// and `latency_ms` are recorded as execution progresses.
    pub fn new(job_id: &str, device: WorkerHandle, prompt: &str) -> Span {
        info_span!(
            "job",
            job_id = %job_id,
            device = device.index(),
            prompt_fp = %prompt_fingerprint(prompt),
            seed = tracing::field::Empty,
            width = tracing::field::Empty,
            height = tracing::field::Empty,
            status = tracing::field::Empty,
            error.kind = tracing::field::Empty,
            error.message = tracing::field::Empty,
            latency_ms = tracing::field::Empty,
        )
    }
}

/// Short, stable fingerprint of a prompt. Prompts are never logged verbatim.
pub fn prompt_fingerprint(prompt: &str) -> String {
    let digest = Sha256::digest(prompt.as_bytes());
    hex::encode(&digest[..6])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_short_and_stable() {
        let a = prompt_fingerprint("a cat in a hat");
        assert_eq!(a.len(), 12);
        assert_eq!(a, prompt_fingerprint("a cat in a hat"));
        assert_ne!(a, prompt_fingerprint("a hat in a cat"));
    }
}
