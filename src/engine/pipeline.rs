// Copyright 2024-2026 ImageGate Contributors
// Licensed under the Apache License, Version 2.0

//! The long-running unit of work bound to one device.

use serde::Serialize;
use thiserror::Error;

use super::sizing::ImageSize;
use crate::workers::WorkerHandle;

pub const PNG_MEDIA_TYPE: &str = "image/png";

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("device {device} unavailable: {reason}")]
    DeviceUnavailable { device: WorkerHandle, reason: String },

    #[error("generation failed: {0}")]
    Generation(String),

    #[error("encoding failed: {0}")]
    Encoding(String),
}

/// Fully derived parameters for one generation call.
///
/// Two calls with equal params on the same model must be interchangeable;
/// the seed is always concrete here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationParams {
    pub prompt: String,
    pub size: ImageSize,
    pub steps: u32,
    pub guidance: f32,
    pub seed: u64,
}

/// Encoded output of a generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub media_type: String,
}

impl EncodedImage {
    pub fn png(bytes: Vec<u8>) -> Self {
        Self { bytes, media_type: PNG_MEDIA_TYPE.to_string() }
    }
}

/// A loaded model resident on one device.
///
/// `generate` blocks for the whole generation and is only ever called by the
/// job holding that device's lease, so implementations need no internal
/// locking for per-device state.
pub trait ImagePipeline: Send + Sync {
    /// Device this pipeline is resident on.
    fn device(&self) -> WorkerHandle;

    fn model_id(&self) -> &str;

    /// Run generation and return the encoded image.
    fn generate(&self, params: &GenerationParams) -> Result<EncodedImage, PipelineError>;
}
