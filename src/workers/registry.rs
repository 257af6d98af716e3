// Copyright 2024-2026 ImageGate Contributors
// Licensed under the Apache License, Version 2.0

//! Fixed mapping from device to loaded pipeline.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use super::handle::WorkerHandle;
use crate::engine::{ImagePipeline, PipelineError};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("no worker loaded successfully ({attempted} device(s) attempted)")]
    NoWorkers { attempted: usize },
}

/// Read-only registry of loaded execution contexts, built once at startup.
pub struct WorkerRegistry {
    contexts: BTreeMap<WorkerHandle, Arc<dyn ImagePipeline>>,
}

impl WorkerRegistry {
    /// Build a registry from already-loaded pipelines.
    ///
    /// A later entry for the same device replaces an earlier one.
    pub fn new(
        contexts: impl IntoIterator<Item = (WorkerHandle, Arc<dyn ImagePipeline>)>,
    ) -> Result<Self, RegistryError> {
        let contexts: BTreeMap<_, _> = contexts.into_iter().collect();
        if contexts.is_empty() {
            return Err(RegistryError::NoWorkers { attempted: 0 });
        }
        Ok(Self { contexts })
    }

    /// Load one pipeline per device, skipping devices whose loader fails.
    ///
    /// Fails only when no device loaded at all.
    pub fn load<F>(devices: &[WorkerHandle], mut loader: F) -> Result<Self, RegistryError>
    where
        F: FnMut(WorkerHandle) -> Result<Arc<dyn ImagePipeline>, PipelineError>,
    {
        let mut contexts = BTreeMap::new();
        for &device in devices {
            if contexts.contains_key(&device) {
                tracing::warn!(%device, "device listed twice, skipping duplicate");
                continue;
            }
            match loader(device) {
                Ok(pipeline) => {
                    tracing::info!(%device, model_id = pipeline.model_id(), "worker loaded");
                    contexts.insert(device, pipeline);
                }
                Err(e) => {
                    tracing::error!(%device, error = %e, "worker failed to load");
                }
            }
        }

        if contexts.is_empty() {
            return Err(RegistryError::NoWorkers { attempted: devices.len() });
        }
        Ok(Self { contexts })
    }

    /// Execution context bound to `handle`.
    pub fn resolve(&self, handle: WorkerHandle) -> Option<&Arc<dyn ImagePipeline>> {
        self.contexts.get(&handle)
    }

    /// Loaded devices in ascending index order.
    pub fn handles(&self) -> impl Iterator<Item = WorkerHandle> + '_ {
        self.contexts.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}

impl fmt::Debug for WorkerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerRegistry")
            .field("devices", &self.contexts.keys().collect::<Vec<_>>())
            .finish()
    }
}
