// Copyright 2024-2026 ImageGate Contributors
// Licensed under the Apache License, Version 2.0

//! Job scheduling for ImageGate.
//!
//! Admits jobs, tracks how many are in flight, and runs each one on a
//! leased device through the `JobExecutor`.

mod dispatcher;
mod error;
mod executor;
mod in_flight;
mod job;

pub use dispatcher::{Dispatcher, DispatcherState, InstallError};
pub use error::{ErrorBody, ErrorKind, JobError};
pub use executor::JobExecutor;
pub use in_flight::{InFlightCounter, InFlightGuard};
pub use job::{
    GenerateRequest, ImagePayload, Job, JobId, JobOutput, DEFAULT_GUIDANCE, DEFAULT_RATIO,
    DEFAULT_STEPS,
};
