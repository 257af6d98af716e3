// Copyright 2024-2026 ImageGate Contributors
// Licensed under the Apache License, Version 2.0

//! ImageGate
//!
//! Dispatch gateway for image generation on a fixed set of exclusive
//! accelerator devices. Each device runs at most one job at a time; jobs
//! beyond the device count wait for a device to free up.
//!
//! # Components
//!
//! - [`workers::ResourcePool`]: free devices, leased with scoped release
//! - [`workers::WorkerRegistry`]: device to loaded pipeline, fixed at startup
//! - [`scheduler::JobExecutor`]: runs one job on one leased device
//! - [`scheduler::Dispatcher`]: admission, in-flight tracking, dispatch
//! - [`health::StatusReporter`]: loading / ready / busy snapshots
//!
//! HTTP routing, authentication and real model loading live outside this
//! crate and plug in through [`engine::ImagePipeline`] and
//! [`delivery::ResultSink`].

pub mod cli;
pub mod config;
pub mod delivery;
pub mod engine;
pub mod health;
pub mod scheduler;
pub mod shutdown;
pub mod telemetry;
pub mod workers;

use std::sync::Arc;
use std::time::Duration;

use delivery::{RejectAllSink, ResultSink};
use engine::{SizePlanner, DEFAULT_ALIGNMENT};
use health::StatusReporter;
use scheduler::{Dispatcher, InstallError};
use shutdown::ShutdownResult;
use workers::WorkerRegistry;

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Output side alignment in pixels.
    pub alignment: u32,
    pub shutdown_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            alignment: DEFAULT_ALIGNMENT,
            shutdown_timeout: Duration::from_secs(30),
        }
    }
}

/// The gateway instance: one dispatcher and its status view.
pub struct Gateway {
    pub dispatcher: Dispatcher,
    pub status: StatusReporter,
    pub config: GatewayConfig,
}

impl Gateway {
    /// Create a gateway with no workers; it reports `loading` until
    /// [`Gateway::install_workers`] succeeds.
    pub fn new(config: GatewayConfig, sink: Arc<dyn ResultSink>) -> Self {
        let dispatcher = Dispatcher::new(SizePlanner::new(config.alignment), sink);
        let status = StatusReporter::new(Arc::clone(dispatcher.state()));
        Self { dispatcher, status, config }
    }

    /// Gateway whose delivery targets always fail.
    pub fn without_delivery(config: GatewayConfig) -> Self {
        Self::new(config, Arc::new(RejectAllSink))
    }

    pub fn install_workers(&self, registry: WorkerRegistry) -> Result<(), InstallError> {
        self.dispatcher.install(registry)
    }

    /// Drain in-flight jobs using the configured timeout.
    pub async fn shutdown(&self) -> ShutdownResult {
        self.dispatcher.shutdown(self.config.shutdown_timeout).await
    }
}
