// Copyright 2024-2026 ImageGate Contributors
// Licensed under the Apache License, Version 2.0

//! Graceful shutdown coordination.
//!
//! Once shutdown begins the dispatcher stops admitting jobs; jobs already
//! admitted run to completion while the coordinator waits for the in-flight
//! count to reach zero.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use serde::Serialize;

use crate::scheduler::{InFlightCounter, InFlightGuard};

/// Shutdown state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ShutdownState {
    Running,
    Draining,
    Stopped,
}

/// Result of a shutdown operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "lowercase")]
pub enum ShutdownResult {
    Complete,
    Timeout { remaining: usize },
}

/// Gates admission and drains in-flight jobs on shutdown.
pub struct ShutdownCoordinator {
    state: RwLock<ShutdownState>,
    in_flight: Arc<InFlightCounter>,
}

impl ShutdownCoordinator {
    pub fn new(in_flight: Arc<InFlightCounter>) -> Self {
        Self {
            state: RwLock::new(ShutdownState::Running),
            in_flight,
        }
    }

    pub fn state(&self) -> ShutdownState {
        *self.state.read()
    }

    /// Check if accepting new jobs.
    pub fn is_accepting(&self) -> bool {
        self.state() == ShutdownState::Running
    }

    /// Count a new job in flight, or refuse it once shutdown has begun.
    ///
    /// The state is re-checked after counting, so a job is never admitted
    /// behind a drain that has already observed zero in flight.
    pub fn admit(&self) -> Option<InFlightGuard> {
        if !self.is_accepting() {
            return None;
        }
        let guard = self.in_flight.admit();
        if self.is_accepting() {
            Some(guard)
        } else {
            drop(guard);
            None
        }
    }

    /// Stop admitting, wait for in-flight jobs to drain, then stop.
    pub async fn initiate(&self, timeout: Duration) -> ShutdownResult {
        *self.state.write() = ShutdownState::Draining;
        tracing::info!(in_flight = self.in_flight.current(), "draining in-flight jobs");

        let result = match self.in_flight.wait_idle(timeout).await {
            Ok(()) => ShutdownResult::Complete,
            Err(remaining) => ShutdownResult::Timeout { remaining },
        };

        *self.state.write() = ShutdownState::Stopped;
        result
    }
}
