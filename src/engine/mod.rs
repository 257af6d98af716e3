// Copyright 2024-2026 ImageGate Contributors
// Licensed under the Apache License, Version 2.0

//! Image generation engine boundary.
//!
//! Defines the `ImagePipeline` trait every loaded device implements, the
//! deterministic size derivation and seed plumbing that feed it, and a
//! simulated pipeline for local runs and tests.

mod pipeline;
mod seed;
mod simulated;
pub mod sizing;

pub use pipeline::{EncodedImage, GenerationParams, ImagePipeline, PipelineError, PNG_MEDIA_TYPE};
pub use seed::{random_seed, resolve_seed, SEED_SPACE};
pub use simulated::{FailureMode, SimulatedPipeline};
pub use sizing::{ImageSize, ParameterError, SizePlanner, DEFAULT_ALIGNMENT, DEFAULT_MEGAPIXELS};
