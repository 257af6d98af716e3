// Copyright 2024-2026 ImageGate Contributors
// Licensed under the Apache License, Version 2.0

//! Admission and dispatch of jobs onto leased devices.
//!
//! Concurrency is bounded by the resource pool alone: every admitted job
//! waits in `ResourcePool::acquire`, so at most one job per device runs at a
//! time and the rest queue there. There is no separate queue depth limit.

use std::any::Any;
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::task::JoinError;

use super::error::JobError;
use super::executor::JobExecutor;
use super::in_flight::InFlightCounter;
use super::job::{Job, JobOutput};
use crate::delivery::ResultSink;
use crate::engine::SizePlanner;
use crate::shutdown::{ShutdownCoordinator, ShutdownResult, ShutdownState};
use crate::telemetry;
use crate::workers::{ResourcePool, WorkerRegistry};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InstallError {
    #[error("workers are already installed")]
    AlreadyInstalled,
}

struct Workers {
    pool: ResourcePool,
    executor: Arc<JobExecutor>,
}

/// Process-wide dispatch state, shared by the dispatcher and status reporter.
pub struct DispatcherState {
    workers: OnceLock<Workers>,
    in_flight: Arc<InFlightCounter>,
    shutdown: ShutdownCoordinator,
    planner: SizePlanner,
    sink: Arc<dyn ResultSink>,
}

impl DispatcherState {
    /// Loaded device count; zero until workers are installed.
    pub fn total_workers(&self) -> usize {
        self.workers.get().map_or(0, |w| w.pool.capacity())
    }

    pub fn available_workers(&self) -> usize {
        self.workers.get().map_or(0, |w| w.pool.available())
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.current()
    }

    pub fn is_installed(&self) -> bool {
        self.workers.get().is_some()
    }

    pub fn shutdown_state(&self) -> ShutdownState {
        self.shutdown.state()
    }
}

/// Entry point for job submission. Cheap to clone.
#[derive(Clone)]
pub struct Dispatcher {
    state: Arc<DispatcherState>,
}

impl Dispatcher {
    pub fn new(planner: SizePlanner, sink: Arc<dyn ResultSink>) -> Self {
        let in_flight = Arc::new(InFlightCounter::new());
        Self {
            state: Arc::new(DispatcherState {
                workers: OnceLock::new(),
                shutdown: ShutdownCoordinator::new(Arc::clone(&in_flight)),
                in_flight,
                planner,
                sink,
            }),
        }
    }

    pub fn state(&self) -> &Arc<DispatcherState> {
        &self.state
    }

    /// Install the loaded workers. Allowed once; jobs are refused before it.
    pub fn install(&self, registry: WorkerRegistry) -> Result<(), InstallError> {
        let pool = ResourcePool::new(registry.handles());
        let executor = JobExecutor::new(
            Arc::new(registry),
            self.state.planner,
            Arc::clone(&self.state.sink),
        );
        let capacity = pool.capacity();
        self.state
            .workers
            .set(Workers { pool, executor: Arc::new(executor) })
            .map_err(|_| InstallError::AlreadyInstalled)?;

        telemetry::record_workers_available(capacity);
        tracing::info!(workers = capacity, "workers installed, accepting jobs");
        Ok(())
    }

    /// Run `job` on the next free device and return its result.
    ///
    /// Once admitted the job runs to completion even if the returned future
    /// is dropped; the in-flight count covers it until it finishes.
    pub async fn submit(&self, job: Job) -> Result<JobOutput, JobError> {
        let Some(workers) = self.state.workers.get() else {
            return Err(JobError::NotReady);
        };
        let Some(guard) = self.state.shutdown.admit() else {
            return Err(JobError::ShuttingDown);
        };

        let pool = workers.pool.clone();
        let executor = Arc::clone(&workers.executor);
        let job_id = job.id;
        tracing::debug!(%job_id, in_flight = self.state.in_flight.current(), "job admitted");

        let task = tokio::spawn(async move {
            let _guard = guard;
            let queued_at = Instant::now();
            let lease = pool
                .acquire()
                .await
                .map_err(|e| JobError::Execution(e.to_string()))?;
            telemetry::record_lease_wait(queued_at.elapsed().as_millis() as u64);

            match tokio::task::spawn_blocking(move || executor.run(&job, lease)).await {
                Ok(result) => result,
                Err(e) => {
                    let message = join_failure(e);
                    tracing::error!(%job_id, error = %message, "job aborted");
                    telemetry::record_job_failure(super::error::ErrorKind::Execution.as_str());
                    Err(JobError::Execution(message))
                }
            }
        });

        match task.await {
            Ok(result) => result,
            Err(e) => Err(JobError::Execution(join_failure(e))),
        }
    }

    /// Stop admitting jobs and wait up to `timeout` for in-flight ones.
    pub async fn shutdown(&self, timeout: Duration) -> ShutdownResult {
        self.state.shutdown.initiate(timeout).await
    }
}

fn join_failure(e: JoinError) -> String {
    if e.is_panic() {
        format!("worker panicked: {}", panic_message(e.into_panic()))
    } else {
        format!("job task cancelled: {e}")
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
