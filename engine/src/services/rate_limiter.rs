//! Rate-limited task queues for the two external resources
//!
//! `CooldownQueue` serializes generation calls and spaces them out by a fixed
//! cooldown plus random jitter. `WindowedQueue` admits availability calls up to
//! a concurrency limit and a cap on starts per rolling window. Both admit tasks
//! in submission order through tokio's fair primitives and never retry: a
//! task's error is returned to its caller unchanged.

use rand::Rng;
use std::collections::VecDeque;
use std::future::Future;
use std::time::Duration;
use tokio::sync::{Mutex, Semaphore};
use tokio::time::{sleep_until, Instant};

/// Concurrency-1 queue with a minimum gap between calls
pub struct CooldownQueue {
    last_finished: Mutex<Option<Instant>>,
    cooldown: Duration,
    jitter: Duration,
}

impl CooldownQueue {
    pub fn new(cooldown: Duration, jitter: Duration) -> Self {
        Self {
            last_finished: Mutex::new(None),
            cooldown,
            jitter,
        }
    }

    fn random_jitter(&self) -> Duration {
        let max_ms = self.jitter.as_millis() as u64;
        if max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..=max_ms))
    }

    /// Run `task` once the cooldown since the previous task has elapsed
    pub async fn submit<F, Fut, T>(&self, task: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        // the guard is held for the whole task, which is what makes this concurrency 1
        let mut last_finished = self.last_finished.lock().await;

        if let Some(finished) = *last_finished {
            let target = finished + self.cooldown + self.random_jitter();
            if target > Instant::now() {
                sleep_until(target).await;
            }
        }

        let output = task().await;
        *last_finished = Some(Instant::now());
        output
    }
}

/// Bounded-concurrency queue with a sliding-window start cap
pub struct WindowedQueue {
    permits: Semaphore,
    starts: Mutex<VecDeque<Instant>>,
    max_per_window: usize,
    window: Duration,
}

impl WindowedQueue {
    pub fn new(concurrency: usize, max_per_window: usize, window: Duration) -> Self {
        Self {
            permits: Semaphore::new(concurrency.max(1)),
            starts: Mutex::new(VecDeque::new()),
            max_per_window: max_per_window.max(1),
            window,
        }
    }

    /// Wait until the window has room, then record a start
    async fn reserve_start(&self) {
        let mut starts = self.starts.lock().await;
        loop {
            let now = Instant::now();
            while let Some(oldest) = starts.front() {
                if now.duration_since(*oldest) >= self.window {
                    starts.pop_front();
                } else {
                    break;
                }
            }

            if starts.len() < self.max_per_window {
                starts.push_back(now);
                return;
            }

            // lock stays held so later submitters cannot overtake this one
            if let Some(oldest) = starts.front() {
                sleep_until(*oldest + self.window).await;
            }
        }
    }

    /// Run `task` once a concurrency slot and window capacity are free
    pub async fn submit<F, Fut, T>(&self, task: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        // the semaphore is never closed, so acquisition only waits
        let _permit = self.permits.acquire().await.ok();
        self.reserve_start().await;
        task().await
    }
}

/// Split domains into order-preserving chunks of at most `size`
pub fn chunk_domains(domains: &[String], size: usize) -> Vec<Vec<String>> {
    domains.chunks(size.max(1)).map(|chunk| chunk.to_vec()).collect()
}
