// Copyright 2024-2026 ImageGate Contributors
// Licensed under the Apache License, Version 2.0

//! Load status reporting.
//!
//! Classifies the gateway as loading, ready or busy from the in-flight count
//! and the number of loaded devices. Reads are lock-free snapshots and may
//! be momentarily stale while jobs are being admitted or finishing.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::scheduler::DispatcherState;
use crate::shutdown::ShutdownState;

/// Overall service state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceState {
    /// No workers loaded yet.
    Loading,
    /// At least one device can take a job without queueing.
    Ready,
    /// Every device is taken; new jobs will queue.
    Busy,
}

impl ServiceState {
    pub fn classify(total_workers: usize, in_flight: usize) -> Self {
        if total_workers == 0 {
            Self::Loading
        } else if in_flight >= total_workers {
            Self::Busy
        } else {
            Self::Ready
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Busy => "busy",
        }
    }
}

/// Point-in-time status report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    pub state: ServiceState,
    /// Jobs admitted and not yet finished, queued or running.
    pub in_flight: usize,
    pub total_workers: usize,
    pub available_workers: usize,
    pub accepting: bool,
}

/// Read-only view over the dispatcher state.
#[derive(Clone)]
pub struct StatusReporter {
    state: Arc<DispatcherState>,
}

impl StatusReporter {
    pub fn new(state: Arc<DispatcherState>) -> Self {
        Self { state }
    }

    pub fn status(&self) -> StatusSnapshot {
        let total_workers = self.state.total_workers();
        let in_flight = self.state.in_flight();
        StatusSnapshot {
            state: ServiceState::classify(total_workers, in_flight),
            in_flight,
            total_workers,
            available_workers: self.state.available_workers(),
            accepting: self.state.shutdown_state() == ShutdownState::Running,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_boundaries() {
        assert_eq!(ServiceState::classify(0, 0), ServiceState::Loading);
        assert_eq!(ServiceState::classify(0, 3), ServiceState::Loading);
        assert_eq!(ServiceState::classify(3, 0), ServiceState::Ready);
        assert_eq!(ServiceState::classify(3, 2), ServiceState::Ready);
        assert_eq!(ServiceState::classify(3, 3), ServiceState::Busy);
        assert_eq!(ServiceState::classify(3, 5), ServiceState::Busy);
    }

    #[test]
    fn state_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ServiceState::Busy).unwrap(), "\"busy\"");
        assert_eq!(ServiceState::Loading.as_str(), "loading");
    }
}
