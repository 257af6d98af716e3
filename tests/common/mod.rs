// Copyright 2024-2026 ImageGate Contributors
// Licensed under the Apache License, Version 2.0

//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use imagegate::delivery::ResultSink;
use imagegate::engine::{EncodedImage, GenerationParams, ImagePipeline, PipelineError};
use imagegate::workers::{WorkerHandle, WorkerRegistry};
use imagegate::{Gateway, GatewayConfig};

/// Blocks pipeline calls until opened.
#[derive(Default)]
pub struct Gate {
    open: Mutex<bool>,
    cv: Condvar,
}

impl Gate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn opened() -> Arc<Self> {
        let gate = Self::new();
        gate.open();
        gate
    }

    pub fn open(&self) {
        *self.open.lock().unwrap() = true;
        self.cv.notify_all();
    }

    fn wait(&self) {
        let mut open = self.open.lock().unwrap();
        while !*open {
            open = self.cv.wait(open).unwrap();
        }
    }
}

/// Observes device usage across all probe pipelines.
#[derive(Default)]
pub struct Probe {
    inner: Mutex<ProbeState>,
}

#[derive(Default)]
struct ProbeState {
    active: BTreeSet<WorkerHandle>,
    started: usize,
    finished: usize,
    max_concurrent: usize,
    /// Times a device started a job while already running one.
    overlaps: usize,
}

impl Probe {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn enter(&self, device: WorkerHandle) {
        let mut s = self.inner.lock().unwrap();
        if !s.active.insert(device) {
            s.overlaps += 1;
        }
        s.started += 1;
        s.max_concurrent = s.max_concurrent.max(s.active.len());
    }

    fn exit(&self, device: WorkerHandle) {
        let mut s = self.inner.lock().unwrap();
        s.active.remove(&device);
        s.finished += 1;
    }

    pub fn started(&self) -> usize {
        self.inner.lock().unwrap().started
    }

    pub fn finished(&self) -> usize {
        self.inner.lock().unwrap().finished
    }

    pub fn running(&self) -> usize {
        self.inner.lock().unwrap().active.len()
    }

    pub fn max_concurrent(&self) -> usize {
        self.inner.lock().unwrap().max_concurrent
    }

    pub fn overlaps(&self) -> usize {
        self.inner.lock().unwrap().overlaps
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    Succeed,
    Fail,
    Panic,
}

/// Pipeline that waits on a gate and reports to a probe.
pub struct ProbePipeline {
    device: WorkerHandle,
    gate: Arc<Gate>,
    probe: Arc<Probe>,
    behavior: Behavior,
}

impl ProbePipeline {
    pub fn new(device: WorkerHandle, gate: Arc<Gate>, probe: Arc<Probe>, behavior: Behavior) -> Self {
        Self { device, gate, probe, behavior }
    }
}

struct ExitOnDrop<'a>(&'a Probe, WorkerHandle);

impl Drop for ExitOnDrop<'_> {
    fn drop(&mut self) {
        self.0.exit(self.1);
    }
}

impl ImagePipeline for ProbePipeline {
    fn device(&self) -> WorkerHandle {
        self.device
    }

    fn model_id(&self) -> &str {
        "probe"
    }

    fn generate(&self, params: &GenerationParams) -> Result<EncodedImage, PipelineError> {
        self.probe.enter(self.device);
        let _exit = ExitOnDrop(&self.probe, self.device);
        self.gate.wait();
        match self.behavior {
            Behavior::Succeed => {
                let mut bytes = params.seed.to_le_bytes().to_vec();
                bytes.extend_from_slice(params.prompt.as_bytes());
                Ok(EncodedImage::png(bytes))
            }
            Behavior::Fail => Err(PipelineError::Generation("probe failure".to_string())),
            Behavior::Panic => panic!("probe panic on {}", self.device),
        }
    }
}

pub fn handles(n: u32) -> Vec<WorkerHandle> {
    (0..n).map(WorkerHandle::new).collect()
}

pub fn probe_registry(n: u32, gate: &Arc<Gate>, probe: &Arc<Probe>, behavior: Behavior) -> WorkerRegistry {
    WorkerRegistry::new(handles(n).into_iter().map(|device| {
        let pipeline: Arc<dyn ImagePipeline> = Arc::new(ProbePipeline::new(
            device,
            Arc::clone(gate),
            Arc::clone(probe),
            behavior,
        ));
        (device, pipeline)
    }))
    .unwrap()
}

/// Gateway with `n` probe workers installed.
pub fn probe_gateway(
    n: u32,
    gate: &Arc<Gate>,
    probe: &Arc<Probe>,
    behavior: Behavior,
    sink: Arc<dyn ResultSink>,
) -> Gateway {
    let gateway = Gateway::new(GatewayConfig::default(), sink);
    gateway
        .install_workers(probe_registry(n, gate, probe, behavior))
        .unwrap();
    gateway
}

/// Poll `cond` until it holds or `timeout` passes.
pub async fn eventually(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    cond()
}
