// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tracked background linking jobs.

use std::future::Future;

use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// A set of fire-and-forget jobs that can still be awaited as a group.
#[derive(Default)]
pub(crate) struct LinkJobs {
    set: Mutex<JoinSet<()>>,
}

impl LinkJobs {
    /// Spawns `job` on the current runtime. Finished jobs are reaped first.
    pub(crate) async fn spawn<F>(&self, job: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut set = self.set.lock().await;
        while let Some(done) = set.try_join_next() {
            log_join(done);
        }
        set.spawn(job);
    }

    /// Waits for every job spawned so far. Returns how many finished.
    pub(crate) async fn flush(&self) -> usize {
        let mut pending = std::mem::take(&mut *self.set.lock().await);
        let mut finished = 0;
        while let Some(done) = pending.join_next().await {
            log_join(done);
            finished += 1;
        }
        debug!(finished, "link jobs flushed");
        finished
    }

    pub(crate) async fn pending(&self) -> usize {
        self.set.lock().await.len()
    }
}

fn log_join(result: Result<(), tokio::task::JoinError>) {
    if let Err(e) = result {
        warn!(error = %e, "link job panicked or was cancelled");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[tokio::test]
    async fn flush_waits_for_every_job() {
        let jobs = LinkJobs::default();
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..5 {
            let counter = Arc::clone(&counter);
            jobs.spawn(async move {
                tokio::task::yield_now().await;
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .await;
        }
        jobs.flush().await;
        assert_eq!(counter.load(Ordering::SeqCst), 5);
        assert_eq!(jobs.pending().await, 0);
    }
}
