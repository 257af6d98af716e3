// Copyright 2024-2026 ImageGate Contributors
// Licensed under the Apache License, Version 2.0

//! Admitted-job counter with RAII release.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;

use crate::telemetry;

/// Counts jobs admitted but not yet finished, queued and running alike.
#[derive(Debug, Default)]
pub struct InFlightCounter {
    count: AtomicUsize,
    notify: Notify,
}

impl InFlightCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one admitted job until the returned guard is dropped.
    pub fn admit(self: &Arc<Self>) -> InFlightGuard {
        let now = self.count.fetch_add(1, Ordering::SeqCst) + 1;
        telemetry::record_in_flight(now);
        InFlightGuard { counter: Arc::clone(self) }
    }

    pub fn current(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Wait until no job is in flight. Returns the remaining count on timeout.
    ///
    /// Any number of tasks may wait at once; every one is woken when the
    /// count reaches zero.
    pub async fn wait_idle(&self, timeout: Duration) -> Result<(), usize> {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            // Register before checking so a release in between is not lost.
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let count = self.current();
            if count == 0 {
                return Ok(());
            }

            let remaining_time = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining_time.is_zero() {
                return Err(count);
            }

            tokio::select! {
                _ = &mut notified => continue,
                _ = tokio::time::sleep(remaining_time) => {
                    return match self.current() {
                        0 => Ok(()),
                        left => Err(left),
                    };
                }
            }
        }
    }

    fn release(&self) {
        let now = self.count.fetch_sub(1, Ordering::SeqCst) - 1;
        telemetry::record_in_flight(now);
        self.notify.notify_waiters();
    }
}

/// Decrements the in-flight count exactly once, on drop.
#[derive(Debug)]
pub struct InFlightGuard {
    counter: Arc<InFlightCounter>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.counter.release();
    }
}
