// Copyright 2024-2026 ImageGate Contributors
// Licensed under the Apache License, Version 2.0

//! `file://` delivery into a fixed output directory.

use std::path::{Component, Path, PathBuf};

use super::{DeliveryError, DeliveryTarget, ResultSink};
use crate::engine::EncodedImage;

/// Writes images to `file://` targets that resolve inside `root`.
#[derive(Debug, Clone)]
pub struct FileSink {
    root: PathBuf,
}

impl FileSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, target: &DeliveryTarget) -> Result<PathBuf, DeliveryError> {
        match target.scheme().as_deref() {
            Some("file") => {}
            Some(other) => return Err(DeliveryError::UnsupportedScheme(other.to_string())),
            None => return Err(DeliveryError::UnsupportedScheme(String::new())),
        }

        let raw = target
            .public_url()
            .split_once("://")
            .map(|(_, path)| path)
            .unwrap_or_default();
        let path = Path::new(raw);

        if path.components().any(|c| matches!(c, Component::ParentDir)) {
            return Err(DeliveryError::Rejected(format!("path escapes output root: {raw}")));
        }
        if !path.starts_with(&self.root) {
            return Err(DeliveryError::Rejected(format!(
                "path outside output root {}: {raw}",
                self.root.display()
            )));
        }
        Ok(path.to_path_buf())
    }
}

impl ResultSink for FileSink {
    fn deliver(&self, target: &DeliveryTarget, image: &EncodedImage) -> Result<(), DeliveryError> {
        let path = self.resolve(target)?;
        std::fs::write(&path, &image.bytes)?;
        tracing::debug!(path = %path.display(), bytes = image.bytes.len(), "image written");
        Ok(())
    }
}
