// Copyright 2024-2026 ImageGate Contributors
// Licensed under the Apache License, Version 2.0

//! Result delivery to caller-supplied targets.
//!
//! A job may name a delivery target (typically a pre-signed upload URL).
//! The sink is called on the worker's blocking thread while the lease is
//! still held. A failed delivery is reported as such; the image is never
//! returned inline instead.

mod file;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::EncodedImage;

pub use file::FileSink;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("unsupported delivery target scheme: {0}")]
    UnsupportedScheme(String),

    #[error("delivery target rejected: {0}")]
    Rejected(String),

    #[error("I/O failure while delivering: {0}")]
    Io(#[from] std::io::Error),
}

/// Where a finished image should be sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeliveryTarget {
    url: String,
}

impl DeliveryTarget {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Full target, including any signing query string.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Target with the query string removed, safe to hand back to clients.
    pub fn public_url(&self) -> &str {
        self.url.split('?').next().unwrap_or_default()
    }

    /// Lowercase scheme, if the target has one.
    pub fn scheme(&self) -> Option<String> {
        self.url
            .split_once("://")
            .map(|(scheme, _)| scheme.to_ascii_lowercase())
    }
}

impl fmt::Display for DeliveryTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.public_url())
    }
}

/// Uploads finished images.
pub trait ResultSink: Send + Sync {
    fn deliver(&self, target: &DeliveryTarget, image: &EncodedImage) -> Result<(), DeliveryError>;
}

/// Sink used when no delivery transport is configured: every delivery fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectAllSink;

impl ResultSink for RejectAllSink {
    fn deliver(&self, target: &DeliveryTarget, _image: &EncodedImage) -> Result<(), DeliveryError> {
        Err(DeliveryError::Rejected(format!("no delivery transport configured for {target}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_url_strips_signature() {
        let target = DeliveryTarget::new(
            "https://bucket.s3.amazonaws.com/out/abc.png?AWSAccessKeyId=X&Signature=Y",
        );
        assert_eq!(target.public_url(), "https://bucket.s3.amazonaws.com/out/abc.png");
        assert_eq!(target.to_string(), target.public_url());
        assert_eq!(target.scheme().as_deref(), Some("https"));
    }

    #[test]
    fn target_without_query_is_unchanged() {
        let target = DeliveryTarget::new("file:///tmp/out.png");
        assert_eq!(target.public_url(), "file:///tmp/out.png");
        assert_eq!(target.scheme().as_deref(), Some("file"));
    }

    #[test]
    fn reject_all_sink_always_fails() {
        let sink = RejectAllSink;
        let result = sink.deliver(
            &DeliveryTarget::new("https://example.invalid/a.png?sig=1"),
            &EncodedImage::png(vec![1, 2, 3]),
        );
        match result {
            Err(DeliveryError::Rejected(msg)) => assert!(!msg.contains("sig=1")),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
