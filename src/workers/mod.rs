// Copyright 2024-2026 ImageGate Contributors
// Licensed under the Apache License, Version 2.0

//! Exclusive device workers.
//!
//! A worker is one accelerator device holding one loaded pipeline. The
//! [`ResourcePool`] hands out [`WorkerLease`]s so that no device ever runs
//! two jobs at once, and the [`WorkerRegistry`] maps each device to its
//! loaded execution context.

mod handle;
mod pool;
mod registry;

pub use handle::WorkerHandle;
pub use pool::{PoolError, ResourcePool, WorkerLease};
pub use registry::{RegistryError, WorkerRegistry};
