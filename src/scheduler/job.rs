// Copyright 2024-2026 ImageGate Contributors
// Licensed under the Apache License, Version 2.0

//! Jobs, the request shape they are built from, and their results.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::delivery::DeliveryTarget;
use crate::engine::{ImageSize, DEFAULT_MEGAPIXELS};
use crate::workers::WorkerHandle;

pub const DEFAULT_RATIO: &str = "1:1";
pub const DEFAULT_STEPS: u32 = 4;
pub const DEFAULT_GUIDANCE: f32 = 0.0;

/// Correlation id assigned to every job on creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One image generation request, immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub id: JobId,
    pub prompt: String,
    /// Aspect ratio as `"W:H"`.
    pub ratio: String,
    /// Target output size in megapixels.
    pub megapixels: f64,
    pub steps: u32,
    pub guidance: f32,
    /// `None` draws a seed at execution time.
    pub seed: Option<u64>,
    pub target: Option<DeliveryTarget>,
}

impl Job {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            id: JobId::new(),
            prompt: prompt.into(),
            ratio: DEFAULT_RATIO.to_string(),
            megapixels: DEFAULT_MEGAPIXELS,
            steps: DEFAULT_STEPS,
            guidance: DEFAULT_GUIDANCE,
            seed: None,
            target: None,
        }
    }

    pub fn with_ratio(mut self, ratio: impl Into<String>) -> Self {
        self.ratio = ratio.into();
        self
    }

    pub fn with_megapixels(mut self, megapixels: f64) -> Self {
        self.megapixels = megapixels;
        self
    }

    pub fn with_steps(mut self, steps: u32) -> Self {
        self.steps = steps;
        self
    }

    pub fn with_guidance(mut self, guidance: f32) -> Self {
        self.guidance = guidance;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_target(mut self, target: DeliveryTarget) -> Self {
        self.target = Some(target);
        self
    }
}

fn default_ratio() -> String {
    DEFAULT_RATIO.to_string()
}

fn default_pixel() -> f64 {
    DEFAULT_MEGAPIXELS
}

fn default_steps() -> u32 {
    DEFAULT_STEPS
}

fn default_seed() -> i64 {
    -1
}

/// Wire shape of a generation request, with the service's defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
    #[serde(default = "default_ratio")]
    pub ratio: String,
    /// Megapixels; `1.0` is roughly 1024x1024.
    #[serde(default = "default_pixel")]
    pub pixel: f64,
    #[serde(default = "default_steps")]
    pub num_inference_steps: u32,
    #[serde(default)]
    pub guidance_scale: f32,
    /// Negative means "pick a random seed".
    #[serde(default = "default_seed")]
    pub seed: i64,
    #[serde(default)]
    pub upload_url: Option<String>,
}

impl GenerateRequest {
    pub fn into_job(self) -> Job {
        Job {
            id: JobId::new(),
            prompt: self.prompt,
            ratio: self.ratio,
            megapixels: self.pixel,
            steps: self.num_inference_steps,
            guidance: self.guidance_scale,
            seed: u64::try_from(self.seed).ok(),
            target: self
                .upload_url
                .filter(|url| !url.is_empty())
                .map(DeliveryTarget::new),
        }
    }
}

/// Where the finished image ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ImagePayload {
    /// Delivered to the job's target; the URL has its query string removed.
    Delivered { image_url: String },
    /// No target was given; the encoded image is returned to the caller.
    Inline {
        media_type: String,
        #[serde(rename = "image_hex", with = "hex::serde")]
        bytes: Vec<u8>,
    },
}

/// Successful job result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobOutput {
    pub job_id: JobId,
    pub device: WorkerHandle,
    /// Seed actually used; resubmitting it reproduces the same parameters.
    pub seed: u64,
    pub size: ImageSize,
    #[serde(flatten)]
    pub payload: ImagePayload,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_defaults_match_service_defaults() {
        let req: GenerateRequest = serde_json::from_str(r#"{"prompt":"a red fox"}"#).unwrap();
        assert_eq!(req.ratio, "1:1");
        assert_eq!(req.pixel, 1.0);
        assert_eq!(req.num_inference_steps, 4);
        assert_eq!(req.guidance_scale, 0.0);
        assert_eq!(req.seed, -1);
        assert!(req.upload_url.is_none());

        let job = req.into_job();
        assert_eq!(job.seed, None);
        assert!(job.target.is_none());
        assert_eq!(job.steps, DEFAULT_STEPS);
    }

    #[test]
    fn explicit_seed_and_target_carry_over() {
        let req: GenerateRequest = serde_json::from_str(
            r#"{"prompt":"x","ratio":"16:9","pixel":2.0,"seed":1234,
                "upload_url":"https://b.example/k.png?sig=abc"}"#,
        )
        .unwrap();
        let job = req.into_job();
        assert_eq!(job.seed, Some(1234));
        assert_eq!(job.ratio, "16:9");
        assert_eq!(job.megapixels, 2.0);
        assert_eq!(job.target.unwrap().public_url(), "https://b.example/k.png");
    }

    #[test]
    fn empty_upload_url_means_inline() {
        let req: GenerateRequest =
            serde_json::from_str(r#"{"prompt":"x","upload_url":""}"#).unwrap();
        assert!(req.into_job().target.is_none());
    }

    #[test]
    fn missing_prompt_is_rejected() {
        assert!(serde_json::from_str::<GenerateRequest>(r#"{"ratio":"1:1"}"#).is_err());
    }

    #[test]
    fn job_ids_are_unique() {
        assert_ne!(Job::new("a").id, Job::new("a").id);
    }

    #[test]
    fn output_serializes_flat() {
        let output = JobOutput {
            job_id: JobId::new(),
            device: WorkerHandle::new(1),
            seed: 99,
            size: ImageSize { width: 992, height: 992 },
            payload: ImagePayload::Delivered { image_url: "https://b/k.png".into() },
        };
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["image_url"], "https://b/k.png");
        assert_eq!(json["seed"], 99);
        assert_eq!(json["device"], 1);

        let inline = JobOutput {
            payload: ImagePayload::Inline { media_type: "image/png".into(), bytes: vec![0xab, 0x01] },
            ..output
        };
        let json = serde_json::to_value(&inline).unwrap();
        assert_eq!(json["image_hex"], "ab01");
        assert_eq!(json["media_type"], "image/png");
    }
}
