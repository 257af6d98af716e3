// Copyright 2024-2026 ImageGate Contributors
// Licensed under the Apache License, Version 2.0

//! Output size derivation from an aspect ratio and a megapixel target.
//!
//! Given `ratio = "W:H"` and a target of `P` megapixels the planner solves
//! `h = sqrt(P * 1e6 / aspect)`, `w = h * aspect`, then rounds each side to
//! the nearest multiple of the model's patch alignment (ties to even). Every
//! side is at least one alignment unit and at most [`MAX_SIDE`].
//!
//! Malformed input never fails a job. [`SizePlanner::plan`] substitutes 1:1
//! for a bad ratio and [`DEFAULT_MEGAPIXELS`] for a bad pixel target, logs
//! the substitution, and carries on. [`SizePlanner::try_plan`] is the strict
//! variant for callers that want to reject input instead.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::telemetry;

/// Side alignment required by the default model's patch size.
pub const DEFAULT_ALIGNMENT: u32 = 32;
pub const DEFAULT_MEGAPIXELS: f64 = 1.0;
/// Upper bound for either side, in pixels.
pub const MAX_SIDE: u32 = 16_384;

const PIXELS_PER_MEGAPIXEL: f64 = 1_000_000.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParameterError {
    #[error("malformed aspect ratio {0:?}, expected \"W:H\"")]
    MalformedRatio(String),

    #[error("aspect ratio {0:?} must be positive and finite")]
    InvalidRatio(String),

    #[error("megapixel target {0} must be positive and finite")]
    InvalidPixelTarget(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub fn pixels(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// Parse `"W:H"` into `W / H`.
pub fn parse_ratio(ratio: &str) -> Result<f64, ParameterError> {
    let malformed = || ParameterError::MalformedRatio(ratio.to_string());
    let (w, h) = ratio.split_once(':').ok_or_else(malformed)?;
    let w: f64 = w.trim().parse().map_err(|_| malformed())?;
    let h: f64 = h.trim().parse().map_err(|_| malformed())?;

    let aspect = w / h;
    if !aspect.is_finite() || aspect <= 0.0 {
        return Err(ParameterError::InvalidRatio(ratio.to_string()));
    }
    Ok(aspect)
}

fn check_megapixels(megapixels: f64) -> Result<f64, ParameterError> {
    if megapixels.is_finite() && megapixels > 0.0 {
        Ok(megapixels)
    } else {
        Err(ParameterError::InvalidPixelTarget(megapixels))
    }
}

/// Derives aligned output sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizePlanner {
    alignment: u32,
}

impl Default for SizePlanner {
    fn default() -> Self {
        Self::new(DEFAULT_ALIGNMENT)
    }
}

impl SizePlanner {
    pub fn new(alignment: u32) -> Self {
        Self { alignment: alignment.clamp(1, MAX_SIDE) }
    }

    pub fn alignment(&self) -> u32 {
        self.alignment
    }

    /// Derive a size, substituting safe defaults for malformed input.
    pub fn plan(&self, ratio: &str, megapixels: f64) -> ImageSize {
        let aspect = parse_ratio(ratio).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to 1:1 aspect ratio");
            telemetry::record_parameter_fallback("ratio");
            1.0
        });
        let megapixels = check_megapixels(megapixels).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default megapixel target");
            telemetry::record_parameter_fallback("pixel");
            DEFAULT_MEGAPIXELS
        });
        self.size_for(aspect, megapixels)
    }

    /// Derive a size, rejecting malformed input.
    pub fn try_plan(&self, ratio: &str, megapixels: f64) -> Result<ImageSize, ParameterError> {
        let aspect = parse_ratio(ratio)?;
        let megapixels = check_megapixels(megapixels)?;
        Ok(self.size_for(aspect, megapixels))
    }

    fn size_for(&self, aspect: f64, megapixels: f64) -> ImageSize {
        let total = megapixels * PIXELS_PER_MEGAPIXEL;
        let height = (total / aspect).sqrt();
        let width = height * aspect;
        ImageSize { width: self.align(width), height: self.align(height) }
    }

    fn align(&self, side: f64) -> u32 {
        let unit = f64::from(self.alignment);
        let max_units = f64::from(MAX_SIDE / self.alignment);
        let units = (side / unit).round_ties_even().clamp(1.0, max_units.max(1.0));
        units as u32 * self.alignment
    }
}
