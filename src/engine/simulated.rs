// Copyright 2024-2026 ImageGate Contributors
// Licensed under the Apache License, Version 2.0

//! Simulated pipeline for local runs, benchmarks and tests.
//!
//! Output bytes are a PNG signature followed by a SHA-256 digest of the
//! generation parameters, so equal params always give equal bytes.

use std::time::Duration;

use sha2::{Digest, Sha256};

use super::pipeline::{EncodedImage, GenerationParams, ImagePipeline, PipelineError};
use crate::workers::WorkerHandle;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

/// Injected failure for exercising error paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
    #[default]
    None,
    /// Every generation fails after the simulated latency.
    Generation,
    /// Every generation fails while encoding.
    Encoding,
}

#[derive(Debug, Clone)]
pub struct SimulatedPipeline {
    device: WorkerHandle,
    model_id: String,
    latency: Duration,
    failure: FailureMode,
}

impl SimulatedPipeline {
    pub fn new(device: WorkerHandle, latency: Duration) -> Self {
        Self {
            device,
            model_id: "simulated-turbo".to_string(),
            latency,
            failure: FailureMode::None,
        }
    }

    pub fn with_failure(mut self, failure: FailureMode) -> Self {
        self.failure = failure;
        self
    }

    fn render(&self, params: &GenerationParams) -> Vec<u8> {
        let mut hasher = Sha256::new();
        hasher.update(self.model_id.as_bytes());
        hasher.update(params.prompt.as_bytes());
        hasher.update(params.size.width.to_le_bytes());
        hasher.update(params.size.height.to_le_bytes());
        hasher.update(params.steps.to_le_bytes());
        hasher.update(params.guidance.to_bits().to_le_bytes());
        hasher.update(params.seed.to_le_bytes());

        let mut bytes = PNG_SIGNATURE.to_vec();
        bytes.extend_from_slice(&hasher.finalize());
        bytes
    }
}

impl ImagePipeline for SimulatedPipeline {
    fn device(&self) -> WorkerHandle {
        self.device
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn generate(&self, params: &GenerationParams) -> Result<EncodedImage, PipelineError> {
        if !self.latency.is_zero() {
            std::thread::sleep(self.latency);
        }
        match self.failure {
            FailureMode::None => Ok(EncodedImage::png(self.render(params))),
            FailureMode::Generation => Err(PipelineError::Generation(format!(
                "simulated failure on {}",
                self.device
            ))),
            FailureMode::Encoding => Err(PipelineError::Encoding("simulated encoder fault".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ImageSize;

    fn params(seed: u64) -> GenerationParams {
        GenerationParams {
            prompt: "a lighthouse at dusk".into(),
            size: ImageSize { width: 992, height: 992 },
            steps: 4,
            guidance: 0.0,
            seed,
        }
    }

    #[test]
    fn output_is_deterministic_per_params() {
        let pipeline = SimulatedPipeline::new(WorkerHandle::new(0), Duration::ZERO);
        let a = pipeline.generate(&params(7)).unwrap();
        let b = pipeline.generate(&params(7)).unwrap();
        let c = pipeline.generate(&params(8)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a.bytes, c.bytes);
        assert_eq!(&a.bytes[..8], &PNG_SIGNATURE);
        assert_eq!(a.media_type, "image/png");
    }

    #[test]
    fn output_does_not_depend_on_device() {
        let d0 = SimulatedPipeline::new(WorkerHandle::new(0), Duration::ZERO);
        let d1 = SimulatedPipeline::new(WorkerHandle::new(1), Duration::ZERO);
        assert_eq!(d0.generate(&params(1)).unwrap(), d1.generate(&params(1)).unwrap());
    }

    #[test]
    fn injected_failures_surface() {
        let pipeline = SimulatedPipeline::new(WorkerHandle::new(2), Duration::ZERO)
            .with_failure(FailureMode::Generation);
        assert!(matches!(pipeline.generate(&params(1)), Err(PipelineError::Generation(_))));

        let pipeline = pipeline.with_failure(FailureMode::Encoding);
        assert!(matches!(pipeline.generate(&params(1)), Err(PipelineError::Encoding(_))));
    }
}
