// * Round-robin dispatch over independently-bootstrapped workers. Each worker
// * rides its own proxy, so spreading lookups across the pool spreads the
// * request rate across egress IPs.

use crate::engine::worker::Worker;
use crate::network::cancel::CancelHandle;
use crate::network::errors::AccessError;
use futures::future::join_all;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info, warn};

pub struct WorkerPool {
    workers: Vec<Worker>,
    cursor: AtomicUsize,
}

impl WorkerPool {
    // * Bootstraps one worker per proxy, all handshakes in flight at once.
    // * A proxy whose handshake fails is logged and skipped; construction only
    // * errors when nothing survives.
    pub async fn bootstrap(
        proxies: &[String],
        user_agents: &[String],
        cancel: &CancelHandle,
    ) -> Result<Self, AccessError> {
        let attempts = proxies.iter().map(|proxy| {
            let user_agents = user_agents.to_vec();
            async move {
                (
                    proxy.as_str(),
                    Worker::bootstrap(proxy, user_agents, cancel).await,
                )
            }
        });

        let mut workers = Vec::new();
        for (proxy, outcome) in join_all(attempts).await {
            match outcome {
                Ok(worker) => {
                    info!(proxy, "worker ready");
                    workers.push(worker);
                }
                Err(error) => warn!(proxy, %error, "bootstrap failed, skipping proxy"),
            }
        }

        if workers.is_empty() && cancel.is_cancelled() {
            return Err(AccessError::Cancelled);
        }
        Self::from_workers(workers)
    }

    pub fn from_workers(workers: Vec<Worker>) -> Result<Self, AccessError> {
        if workers.is_empty() {
            return Err(AccessError::NoWorkers);
        }
        Ok(Self {
            workers,
            cursor: AtomicUsize::new(0),
        })
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    // * The cursor advances on every dispatch regardless of outcome, so the
    // * k-th lookup always lands on worker k % len.
    fn next_index(&self) -> usize {
        self.cursor.fetch_add(1, Ordering::Relaxed) % self.workers.len()
    }

    pub async fn get_phone(
        &self,
        listing_id: &str,
        cancel: &CancelHandle,
    ) -> Result<Option<String>, AccessError> {
        let index = self.next_index();
        debug!(worker = index, listing = listing_id, "dispatching lookup");
        self.workers[index].get_phone(listing_id, cancel).await
    }
}
