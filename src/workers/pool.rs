// Copyright 2024-2026 ImageGate Contributors
// Licensed under the Apache License, Version 2.0

//! Blocking pool of free worker handles.
//!
//! The pool pairs a free list with a counting semaphore whose permit count
//! always equals the free list length once a release completes. Waiters are
//! woken in the order they called [`ResourcePool::acquire`] because tokio's
//! semaphore is fair; callers must not treat that ordering as a contract.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::Semaphore;

use super::handle::WorkerHandle;
use crate::telemetry;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PoolError {
    #[error("worker pool is closed")]
    Closed,
    #[error("worker pool granted a permit with no free handle")]
    Drained,
}

struct PoolInner {
    free: Mutex<Vec<WorkerHandle>>,
    permits: Semaphore,
    capacity: usize,
}

impl PoolInner {
    fn release(&self, handle: WorkerHandle) {
        let available = {
            let mut free = self.free.lock();
            free.push(handle);
            free.len()
        };
        // Push before publishing the permit so a woken waiter finds a handle.
        self.permits.add_permits(1);
        telemetry::record_workers_available(available);
    }

    fn take(&self) -> Result<WorkerHandle, PoolError> {
        let handle = self.free.lock().pop();
        match handle {
            Some(handle) => Ok(handle),
            None => {
                self.permits.add_permits(1);
                Err(PoolError::Drained)
            }
        }
    }
}

/// Shared pool of currently free devices.
#[derive(Clone)]
pub struct ResourcePool {
    inner: Arc<PoolInner>,
}

impl ResourcePool {
    /// Build a pool holding every given handle. Duplicates are collapsed.
    pub fn new(handles: impl IntoIterator<Item = WorkerHandle>) -> Self {
        let mut free: Vec<WorkerHandle> = handles.into_iter().collect();
        free.sort_unstable();
        free.dedup();
        // Stack order: lowest device index is handed out first.
        free.reverse();
        let capacity = free.len();

        Self {
            inner: Arc::new(PoolInner {
                free: Mutex::new(free),
                permits: Semaphore::new(capacity),
                capacity,
            }),
        }
    }

    /// Wait for a free device and lease it.
    pub async fn acquire(&self) -> Result<WorkerLease, PoolError> {
        let permit = self
            .inner
            .permits
            .acquire()
            .await
            .map_err(|_| PoolError::Closed)?;
        permit.forget();
        self.lease()
    }

    /// Lease a free device without waiting.
    pub fn try_acquire(&self) -> Option<WorkerLease> {
        let permit = self.inner.permits.try_acquire().ok()?;
        permit.forget();
        self.lease().ok()
    }

    fn lease(&self) -> Result<WorkerLease, PoolError> {
        let handle = self.inner.take()?;
        telemetry::record_workers_available(self.available());
        Ok(WorkerLease {
            handle,
            pool: Arc::clone(&self.inner),
            acquired_at: Instant::now(),
        })
    }

    /// Number of devices currently free.
    pub fn available(&self) -> usize {
        self.inner.permits.available_permits()
    }

    /// Total number of devices managed by the pool.
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }
}

impl fmt::Debug for ResourcePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourcePool")
            .field("capacity", &self.capacity())
            .field("available", &self.available())
            .finish()
    }
}

/// Exclusive hold on one device. The device returns to the pool when the
/// lease is dropped, on every exit path including unwinding.
pub struct WorkerLease {
    handle: WorkerHandle,
    pool: Arc<PoolInner>,
    acquired_at: Instant,
}

impl WorkerLease {
    pub fn handle(&self) -> WorkerHandle {
        self.handle
    }

    /// How long this lease has been held.
    pub fn held_for(&self) -> Duration {
        self.acquired_at.elapsed()
    }
}

impl fmt::Debug for WorkerLease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerLease")
            .field("handle", &self.handle)
            .field("held_for", &self.held_for())
            .finish()
    }
}

impl Drop for WorkerLease {
    fn drop(&mut self) {
        self.pool.release(self.handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handles(n: u32) -> Vec<WorkerHandle> {
        (0..n).map(WorkerHandle::new).collect()
    }

    #[test]
    fn lowest_index_is_leased_first() {
        let pool = ResourcePool::new(handles(3));
        let lease = pool.try_acquire().unwrap();
        assert_eq!(lease.handle(), WorkerHandle::new(0));
    }

    #[test]
    fn duplicate_handles_are_collapsed() {
        let pool = ResourcePool::new(vec![WorkerHandle::new(1), WorkerHandle::new(1)]);
        assert_eq!(pool.capacity(), 1);
        assert_eq!(pool.available(), 1);
    }

    #[test]
    fn try_acquire_exhausts_then_recovers() {
        let pool = ResourcePool::new(handles(2));
        let a = pool.try_acquire().unwrap();
        let b = pool.try_acquire().unwrap();
        assert_ne!(a.handle(), b.handle());
        assert!(pool.try_acquire().is_none());
        assert_eq!(pool.available(), 0);

        drop(a);
        assert_eq!(pool.available(), 1);
        let c = pool.try_acquire().unwrap();
        assert_ne!(c.handle(), b.handle());
    }

    #[test]
    fn empty_pool_never_leases() {
        let pool = ResourcePool::new(Vec::new());
        assert_eq!(pool.capacity(), 0);
        assert!(pool.try_acquire().is_none());
    }

    #[tokio::test]
    async fn acquire_returns_immediately_when_free() {
        let pool = ResourcePool::new(handles(1));
        let lease = tokio::time::timeout(Duration::from_millis(100), pool.acquire())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(lease.handle(), WorkerHandle::new(0));
    }
}
