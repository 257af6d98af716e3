// Copyright 2024-2026 ImageGate Contributors
// Licensed under the Apache License, Version 2.0

//! `simulate` subcommand: run a burst of jobs through the gateway on
//! simulated devices.
//!
//! One simulated pipeline is loaded per configured device. When
//! `IMAGEGATE_OUTPUT_DIR` is set every job is delivered as a file under it,
//! otherwise results are returned inline.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use serde::Serialize;

use super::{flag_value, has_flag};
use crate::config::EnvConfig;
use crate::delivery::{DeliveryTarget, FileSink, RejectAllSink, ResultSink};
use crate::engine::{ImagePipeline, SimulatedPipeline, DEFAULT_MEGAPIXELS};
use crate::health::StatusSnapshot;
use crate::scheduler::{ErrorBody, ImagePayload, Job, JobOutput, DEFAULT_RATIO};
use crate::shutdown::ShutdownResult;
use crate::workers::WorkerRegistry;
use crate::Gateway;

const DEFAULT_JOBS: usize = 4;
const DEFAULT_PROMPT: &str = "a lighthouse on a cliff at dusk";

#[derive(Debug, Clone, PartialEq)]
pub struct SimulateOptions {
    pub jobs: usize,
    pub prompt: String,
    pub ratio: String,
    pub pixel: f64,
    /// Fixed seed for every job; `None` draws one per job.
    pub seed: Option<u64>,
    pub json: bool,
}

impl Default for SimulateOptions {
    fn default() -> Self {
        Self {
            jobs: DEFAULT_JOBS,
            prompt: DEFAULT_PROMPT.to_string(),
            ratio: DEFAULT_RATIO.to_string(),
            pixel: DEFAULT_MEGAPIXELS,
            seed: None,
            json: false,
        }
    }
}

impl SimulateOptions {
    pub fn from_args(args: &[String]) -> Result<Self, String> {
        let mut opts = Self::default();
        if let Some(raw) = flag_value(args, "--jobs") {
            opts.jobs = raw
                .parse()
                .map_err(|_| format!("--jobs expects a non-negative integer, got {raw:?}"))?;
        }
        if let Some(prompt) = flag_value(args, "--prompt") {
            opts.prompt = prompt.to_string();
        }
        if let Some(ratio) = flag_value(args, "--ratio") {
            opts.ratio = ratio.to_string();
        }
        if let Some(raw) = flag_value(args, "--pixel") {
            opts.pixel = raw
                .parse()
                .map_err(|_| format!("--pixel expects a number, got {raw:?}"))?;
        }
        if let Some(raw) = flag_value(args, "--seed") {
            opts.seed = Some(
                raw.parse()
                    .map_err(|_| format!("--seed expects a non-negative integer, got {raw:?}"))?,
            );
        }
        opts.json = has_flag(args, "--json");
        Ok(opts)
    }

    fn job(&self) -> Job {
        let job = Job::new(self.prompt.clone())
            .with_ratio(self.ratio.clone())
            .with_megapixels(self.pixel);
        match self.seed {
            Some(seed) => job.with_seed(seed),
            None => job,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum JobReport {
    Ok(JobOutput),
    Failed { job_id: String, error: ErrorBody },
}

#[derive(Debug, Serialize)]
struct SimulationReport {
    before: StatusSnapshot,
    after: StatusSnapshot,
    elapsed_ms: u64,
    succeeded: usize,
    failed: usize,
    shutdown: ShutdownResult,
    jobs: Vec<JobReport>,
}

/// Run the simulation. Returns 0 only if every job succeeded.
pub async fn run(opts: &SimulateOptions, config: &EnvConfig) -> i32 {
    let sink: Arc<dyn ResultSink> = match &config.output_dir {
        Some(dir) => {
            if let Err(e) = std::fs::create_dir_all(dir) {
                eprintln!("Error: cannot create output dir {}: {e}", dir.display());
                return 1;
            }
            Arc::new(FileSink::new(dir.clone()))
        }
        None => Arc::new(RejectAllSink),
    };

    let gateway = Gateway::new(config.gateway.clone(), sink);
    let latency = config.sim_latency;
    let registry = match WorkerRegistry::load(&config.devices, |device| {
        Ok(Arc::new(SimulatedPipeline::new(device, latency)) as Arc<dyn ImagePipeline>)
    }) {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("Error: {e}");
            return 1;
        }
    };
    if let Err(e) = gateway.install_workers(registry) {
        eprintln!("Error: {e}");
        return 1;
    }

    let before = gateway.status.status();
    let started = Instant::now();
    let submissions = (0..opts.jobs).map(|_| {
        let mut job = opts.job();
        if let Some(dir) = &config.output_dir {
            let path = dir.join(format!("{}.png", job.id));
            job = job.with_target(DeliveryTarget::new(format!("file://{}", path.display())));
        }
        let job_id = job.id;
        let dispatcher = gateway.dispatcher.clone();
        async move { (job_id, dispatcher.submit(job).await) }
    });
    let results = join_all(submissions).await;
    let elapsed = started.elapsed();
    let after = gateway.status.status();
    let shutdown = gateway.shutdown().await;

    let mut jobs = Vec::with_capacity(results.len());
    let mut failed = 0;
    for (job_id, result) in results {
        match result {
            Ok(output) => jobs.push(JobReport::Ok(output)),
            Err(e) => {
                failed += 1;
                jobs.push(JobReport::Failed { job_id: job_id.to_string(), error: e.to_body() });
            }
        }
    }
    let report = SimulationReport {
        before,
        after,
        elapsed_ms: elapsed.as_millis() as u64,
        succeeded: jobs.len() - failed,
        failed,
        shutdown,
        jobs,
    };

    if opts.json {
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("Error: {e}");
                return 1;
            }
        }
    } else {
        print_report(&report, elapsed);
    }

    if failed == 0 {
        0
    } else {
        1
    }
}

fn print_report(report: &SimulationReport, elapsed: Duration) {
    println!(
        "Workers: {} ({} before run, {} after)",
        report.before.total_workers,
        report.before.state.as_str(),
        report.after.state.as_str()
    );
    for job in &report.jobs {
        match job {
            JobReport::Ok(output) => {
                let delivered = match &output.payload {
                    ImagePayload::Delivered { image_url } => image_url.clone(),
                    ImagePayload::Inline { bytes, .. } => {
                        format!("inline, {} bytes", bytes.len())
                    }
                };
                println!(
                    "  {} on {}: {}x{} seed={} -> {}",
                    output.job_id,
                    output.device,
                    output.size.width,
                    output.size.height,
                    output.seed,
                    delivered
                );
            }
            JobReport::Failed { job_id, error } => {
                println!("  {job_id} FAILED ({}): {}", error.kind.as_str(), error.message);
            }
        }
    }
    println!(
        "{} succeeded, {} failed in {:.2}s",
        report.succeeded,
        report.failed,
        elapsed.as_secs_f64()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workers::WorkerHandle;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn options_parse_from_flags() {
        let opts = SimulateOptions::from_args(&args(&[
            "simulate", "--jobs", "9", "--ratio", "16:9", "--seed", "7", "--json",
        ]))
        .unwrap();
        assert_eq!(opts.jobs, 9);
        assert_eq!(opts.ratio, "16:9");
        assert_eq!(opts.seed, Some(7));
        assert!(opts.json);
        assert_eq!(opts.pixel, DEFAULT_MEGAPIXELS);
    }

    #[test]
    fn negative_seed_is_rejected() {
        assert!(SimulateOptions::from_args(&args(&["simulate", "--seed", "-1"])).is_err());
        assert!(SimulateOptions::from_args(&args(&["simulate", "--jobs", "many"])).is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn inline_simulation_succeeds() {
        let mut config = {
            let _lock = crate::config::ENV_LOCK.lock().unwrap();
            crate::config::clear_env_vars();
            crate::config::load()
        };
        config.devices = vec![WorkerHandle::new(0), WorkerHandle::new(1)];
        config.sim_latency = Duration::from_millis(5);
        let opts = SimulateOptions { jobs: 5, json: true, ..Default::default() };
        assert_eq!(run(&opts, &config).await, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn file_delivery_simulation_writes_images() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = {
            let _lock = crate::config::ENV_LOCK.lock().unwrap();
            crate::config::clear_env_vars();
            crate::config::load()
        };
        config.sim_latency = Duration::from_millis(1);
        config.output_dir = Some(dir.path().to_path_buf());
        let opts = SimulateOptions { jobs: 3, json: true, ..Default::default() };
        assert_eq!(run(&opts, &config).await, 0);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 3);
    }
}
