//! Job registry and lifecycle
//!
//! Jobs move `queued -> running -> done | failed`. The registry is the only
//! writer of job documents: once a job is terminal every further update is
//! ignored, and progress never moves backwards. Terminal jobs are removed by
//! a periodic sweep after the retention window.

use chrono::{DateTime, Utc};
use shared::{process_debug, process_info, JobError, JobId, JobPhase, JobStatus, ProcessId, SearchJob, SearchRequest, SearchResults};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

pub const PROGRESS_FLOOR: u8 = 5;
pub const PROGRESS_CEILING: u8 = 95;

/// Progress for `completed` finished loops plus `fraction` of the current one
pub fn progress_for(completed: u32, fraction: f64, total: u32) -> u8 {
    let total = total.max(1) as f64;
    let fraction = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
    let done = ((completed as f64 + fraction) / total).clamp(0.0, 1.0);
    let span = (PROGRESS_CEILING - PROGRESS_FLOOR) as f64;
    (PROGRESS_FLOOR as f64 + span * done).floor() as u8
}

/// Partial update applied to a running job
#[derive(Debug, Clone, Default)]
pub struct JobPatch {
    pub phase: Option<JobPhase>,
    pub progress: Option<u8>,
    pub current_loop: Option<u32>,
    pub results: Option<SearchResults>,
}

pub struct JobRegistry {
    jobs: RwLock<HashMap<JobId, SearchJob>>,
    retention: Duration,
}

impl JobRegistry {
    pub fn new(retention: Duration) -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
            retention,
        }
    }

    /// Register a queued job for a validated request
    pub async fn create(&self, request: &SearchRequest) -> SearchJob {
        let job = SearchJob::new(request);
        self.jobs.write().await.insert(job.id, job.clone());
        process_debug!(ProcessId::current(), "🆕 Job {} queued ({} loops)", job.id, job.total_loops);
        job
    }

    pub async fn get(&self, id: JobId) -> Option<SearchJob> {
        self.jobs.read().await.get(&id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    /// Apply `update` to a live job; terminal or unknown jobs are left alone
    async fn update<F>(&self, id: JobId, update: F) -> bool
    where
        F: FnOnce(&mut SearchJob),
    {
        let mut jobs = self.jobs.write().await;
        match jobs.get_mut(&id) {
            Some(job) if !job.status.is_terminal() => {
                update(job);
                job.updated_at = Utc::now();
                true
            }
            _ => false,
        }
    }

    /// Merge a partial update, keeping progress and loop counters monotonic
    pub async fn patch(&self, id: JobId, patch: JobPatch) -> bool {
        self.update(id, |job| {
            if let Some(phase) = patch.phase {
                job.phase = Some(phase);
            }
            if let Some(progress) = patch.progress {
                job.progress = job.progress.max(progress.min(100));
            }
            if let Some(current_loop) = patch.current_loop {
                job.current_loop = job.current_loop.max(current_loop);
            }
            if let Some(results) = patch.results {
                job.results = Some(results);
            }
        })
        .await
    }

    pub async fn mark_running(&self, id: JobId) -> bool {
        let applied = self
            .update(id, |job| {
                job.status = JobStatus::Running;
                job.phase = Some(JobPhase::Looping);
                job.progress = job.progress.max(PROGRESS_FLOOR);
            })
            .await;
        if applied {
            process_info!(ProcessId::current(), "▶️ Job {} running", id);
        }
        applied
    }

    pub async fn mark_complete(&self, id: JobId, results: SearchResults) -> bool {
        let applied = self
            .update(id, |job| {
                let now = Utc::now();
                job.status = JobStatus::Done;
                job.phase = Some(JobPhase::Finalize);
                job.progress = 100;
                job.current_loop = job.total_loops;
                job.results = Some(results);
                job.finished_at = Some(now);
            })
            .await;
        if applied {
            process_info!(ProcessId::current(), "✅ Job {} done", id);
        }
        applied
    }

    pub async fn mark_failed(&self, id: JobId, error: JobError) -> bool {
        let code = error.code.clone();
        let applied = self
            .update(id, |job| {
                job.status = JobStatus::Failed;
                job.error = Some(error);
                job.finished_at = Some(Utc::now());
            })
            .await;
        if applied {
            process_info!(ProcessId::current(), "❌ Job {} failed with {}", id, code);
        }
        applied
    }

    /// Drop terminal jobs finished before `now - retention`
    pub async fn sweep(&self, now: DateTime<Utc>) -> usize {
        let retention = chrono::Duration::from_std(self.retention).unwrap_or_else(|_| chrono::Duration::hours(1));
        let cutoff = now - retention;

        let mut jobs = self.jobs.write().await;
        let before = jobs.len();
        jobs.retain(|_, job| match (job.status.is_terminal(), job.finished_at) {
            (true, Some(finished)) => finished > cutoff,
            _ => true,
        });
        let removed = before - jobs.len();
        if removed > 0 {
            process_debug!(ProcessId::current(), "🧹 Swept {} expired job(s)", removed);
        }
        removed
    }

    /// Background task sweeping expired jobs every `interval`
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let registry = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // the first tick fires immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                registry.sweep(Utc::now()).await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> SearchRequest {
        SearchRequest::new("nova", 50.0)
    }

    #[test]
    fn test_progress_band() {
        assert_eq!(progress_for(0, 0.0, 4), 5);
        assert_eq!(progress_for(2, 0.0, 4), 50);
        assert_eq!(progress_for(4, 0.0, 4), 95);
        assert_eq!(progress_for(9, 0.5, 4), 95);
        assert_eq!(progress_for(0, f64::NAN, 0), 5);
        assert!(progress_for(1, 0.5, 4) > progress_for(1, 0.25, 4));
    }

    #[tokio::test]
    async fn test_lifecycle() {
        let registry = JobRegistry::new(Duration::from_secs(60));
        let job = registry.create(&request()).await;
        assert_eq!(job.status, JobStatus::Queued);
        assert_eq!(job.total_loops, 3);

        assert!(registry.mark_running(job.id).await);
        let running = registry.get(job.id).await.unwrap();
        assert_eq!(running.status, JobStatus::Running);
        assert_eq!(running.phase, Some(JobPhase::Looping));
        assert_eq!(running.progress, PROGRESS_FLOOR);

        assert!(registry.mark_complete(job.id, SearchResults::empty(request())).await);
        let done = registry.get(job.id).await.unwrap();
        assert_eq!(done.status, JobStatus::Done);
        assert_eq!(done.progress, 100);
        assert!(done.finished_at.is_some());
        assert!(done.results.is_some());
    }

    #[tokio::test]
    async fn test_progress_never_regresses() {
        let registry = JobRegistry::new(Duration::from_secs(60));
        let job = registry.create(&request()).await;
        registry.mark_running(job.id).await;

        registry
            .patch(job.id, JobPatch { progress: Some(40), current_loop: Some(2), ..Default::default() })
            .await;
        registry
            .patch(job.id, JobPatch { progress: Some(20), current_loop: Some(1), ..Default::default() })
            .await;

        let job = registry.get(job.id).await.unwrap();
        assert_eq!(job.progress, 40);
        assert_eq!(job.current_loop, 2);
    }

    #[tokio::test]
    async fn test_terminal_jobs_ignore_updates() {
        let registry = JobRegistry::new(Duration::from_secs(60));
        let job = registry.create(&request()).await;
        registry.mark_running(job.id).await;
        registry
            .mark_failed(job.id, JobError { code: "GENERATION_ERROR".into(), message: "down".into() })
            .await;

        assert!(!registry.patch(job.id, JobPatch { progress: Some(90), ..Default::default() }).await);
        assert!(!registry.mark_complete(job.id, SearchResults::empty(request())).await);
        assert!(!registry.mark_running(job.id).await);

        let job = registry.get(job.id).await.unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.error.unwrap().code, "GENERATION_ERROR");
    }

    #[tokio::test]
    async fn test_unknown_job_is_ignored() {
        let registry = JobRegistry::new(Duration::from_secs(60));
        assert!(!registry.mark_running(uuid::Uuid::new_v4()).await);
        assert!(registry.get(uuid::Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn test_sweep_removes_only_expired_terminal_jobs() {
        let registry = JobRegistry::new(Duration::from_secs(60));
        let finished = registry.create(&request()).await;
        let active = registry.create(&request()).await;
        registry.mark_running(active.id).await;
        registry.mark_complete(finished.id, SearchResults::empty(request())).await;

        assert_eq!(registry.sweep(Utc::now()).await, 0);
        let later = Utc::now() + chrono::Duration::seconds(120);
        assert_eq!(registry.sweep(later).await, 1);
        assert!(registry.get(finished.id).await.is_none());
        assert!(registry.get(active.id).await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_task_runs_on_interval() {
        let registry = Arc::new(JobRegistry::new(Duration::ZERO));
        let job = registry.create(&request()).await;
        registry.mark_complete(job.id, SearchResults::empty(request())).await;

        let handle = registry.spawn_sweeper(Duration::from_secs(30));
        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(registry.len().await, 0);
        handle.abort();
    }
}
