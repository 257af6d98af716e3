// Copyright 2024-2026 ImageGate Contributors
// Licensed under the Apache License, Version 2.0

//! Job error types.
//!
//! Every failure reaching a caller is one of these variants with its
//! original message preserved. Parameter problems never appear here: size
//! derivation substitutes safe defaults instead of failing.

use serde::Serialize;
use thiserror::Error;

use crate::delivery::DeliveryError;
use crate::engine::PipelineError;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("workers are still loading")]
    NotReady,

    #[error("gateway is shutting down")]
    ShuttingDown,

    #[error("image generation failed: {0}")]
    Execution(String),

    #[error("storage problem: failed to deliver image: {0}")]
    Delivery(String),
}

/// Stable, transport-neutral classification of a [`JobError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotReady,
    ShuttingDown,
    Execution,
    Delivery,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotReady => "not_ready",
            Self::ShuttingDown => "shutting_down",
            Self::Execution => "execution",
            Self::Delivery => "delivery",
        }
    }
}

/// Structured error body handed to the transport layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub status_code: u16,
    pub kind: ErrorKind,
    pub error: String,
    pub message: String,
}

impl JobError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotReady => ErrorKind::NotReady,
            Self::ShuttingDown => ErrorKind::ShuttingDown,
            Self::Execution(_) => ErrorKind::Execution,
            Self::Delivery(_) => ErrorKind::Delivery,
        }
    }

    /// Unavailable (503) before admission, internal error (500) after.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotReady | Self::ShuttingDown => 503,
            Self::Execution(_) | Self::Delivery(_) => 500,
        }
    }

    pub fn to_body(&self) -> ErrorBody {
        let message = match self {
            Self::NotReady => "Model is still loading",
            Self::ShuttingDown => "Gateway is draining and not accepting new work",
            Self::Execution(_) => "Failed to generate image",
            Self::Delivery(_) => "Storage problem: failed to upload image",
        };
        ErrorBody {
            status_code: self.status_code(),
            kind: self.kind(),
            error: self.to_string(),
            message: message.to_string(),
        }
    }
}

impl From<PipelineError> for JobError {
    fn from(e: PipelineError) -> Self {
        Self::Execution(e.to_string())
    }
}

impl From<DeliveryError> for JobError {
    fn from(e: DeliveryError) -> Self {
        Self::Delivery(e.to_string())
    }
}
