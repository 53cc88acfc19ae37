//! Search engine: job runner and loop controller
//!
//! A submitted request becomes a job that runs `loop_count` discovery loops in
//! sequence. Each loop asks the optimizer for a plan, then issues generation
//! batches through the cooldown queue and availability checks through the
//! windowed queue until the quota is met or a stop condition fires. Results are
//! scored, folded into the job's aggregate and credited back to the optimizer
//! before the next loop is planned.
//!
//! Every error or panic inside a job ends as a `failed` job; nothing escapes
//! the background task.

use crate::config::{EngineConfig, MAX_BATCH_NAMES};
use crate::core::aggregator::compare_results;
use crate::core::{apply_query, loop_reward, normalize_batch, score, BanditOptimizer, DomainAggregator, LoopPlan};
use crate::error::{EngineError, EngineResult};
use crate::jobs::{progress_for, JobPatch, JobRegistry};
use crate::services::{chunk_domains, CooldownQueue, WindowedQueue};
use crate::traits::{AvailabilityProvider, GenerationRequest, ModelStore, NameGenerator};
use chrono::Utc;
use futures_util::future::join_all;
use shared::{
    process_debug, process_error, process_info, process_warn, round2, DomainCandidate, JobError, JobId, JobPhase, LeaderboardQuery,
    LoopSummary, ProcessId, RankedDomainResult, RawAvailabilityResult, SearchJob, SearchRequest, SearchResults, SortMode,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::task::JoinError;

/// Why a loop stopped issuing batches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopCondition {
    QuotaMet,
    ConsideredCap,
    BatchCap,
    Stalled,
}

/// Names requested for a batch when `remaining` qualifying names are still needed
pub fn batch_size(remaining: u32, configured_max: u32) -> u32 {
    let remaining = remaining.clamp(1, MAX_BATCH_NAMES);
    (remaining * 3)
        .max(remaining)
        .max(configured_max.min(80))
        .clamp(remaining, MAX_BATCH_NAMES)
}

/// Everything one loop produced, before it is credited and aggregated
#[derive(Debug, Clone)]
pub struct LoopOutcome {
    pub checked: Vec<RankedDomainResult>,
    pub stop: StopCondition,
    pub considered: u32,
    pub batches: u32,
    pub invalid: u32,
}

impl LoopOutcome {
    fn qualifying(&self) -> usize {
        self.checked.iter().filter(|r| r.is_actionable()).count()
    }
}

fn panic_message(error: JoinError) -> String {
    if !error.is_panic() {
        return "job task was cancelled".to_string();
    }
    let payload = error.into_panic();
    if let Some(text) = payload.downcast_ref::<&str>() {
        text.to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "job task panicked".to_string()
    }
}

/// Owns the job registry, the shared queues and the external collaborators
#[derive(Clone)]
pub struct SearchEngine {
    config: Arc<EngineConfig>,
    registry: Arc<JobRegistry>,
    generator: Arc<dyn NameGenerator>,
    availability: Arc<dyn AvailabilityProvider>,
    store: Arc<dyn ModelStore>,
    generation_queue: Arc<CooldownQueue>,
    availability_queue: Arc<WindowedQueue>,
}

impl SearchEngine {
    pub fn new(
        config: EngineConfig,
        generator: Arc<dyn NameGenerator>,
        availability: Arc<dyn AvailabilityProvider>,
        store: Arc<dyn ModelStore>,
    ) -> Self {
        let registry = Arc::new(JobRegistry::new(config.job_retention));
        let generation_queue = Arc::new(CooldownQueue::new(config.generation_cooldown, config.generation_jitter));
        let availability_queue = Arc::new(WindowedQueue::new(
            config.availability_concurrency,
            config.availability_max_per_window,
            config.availability_window,
        ));
        Self {
            config: Arc::new(config),
            registry,
            generator,
            availability,
            store,
            generation_queue,
            availability_queue,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<JobRegistry> {
        &self.registry
    }

    /// Validate a request and start it as a background job
    pub async fn submit(&self, request: SearchRequest) -> EngineResult<JobId> {
        let request = request.normalized();
        request.validate()?;

        let id = self.registry.create(&request).await.id;
        let engine = self.clone();
        tokio::spawn(async move { engine.run_job(id, request).await });
        Ok(id)
    }

    /// Validate a request and run it to a terminal state
    pub async fn run_to_completion(&self, request: SearchRequest) -> EngineResult<SearchJob> {
        let request = request.normalized();
        request.validate()?;

        let job = self.registry.create(&request).await;
        self.run_job(job.id, request).await;
        self.registry.get(job.id).await.ok_or_else(|| EngineError::JobNotFound {
            job_id: job.id.to_string(),
        })
    }

    /// Current job state with its leaderboard re-queried
    pub async fn job(&self, id: JobId, query: &LeaderboardQuery) -> Option<SearchJob> {
        let mut job = self.registry.get(id).await?;
        if let Some(results) = job.results.as_mut() {
            let domains = std::mem::take(&mut results.domains);
            results.domains = apply_query(domains, query);
        }
        Some(job)
    }

    /// Drive one job to `done` or `failed`
    ///
    /// The work runs in its own task so a panic is observed as a `JoinError`
    /// here instead of tearing down the caller.
    async fn run_job(&self, id: JobId, request: SearchRequest) {
        self.registry.mark_running(id).await;

        let engine = self.clone();
        let worker = tokio::spawn(async move { engine.execute(id, request).await });

        match worker.await {
            Ok(Ok(results)) => {
                self.registry.mark_complete(id, results).await;
            }
            Ok(Err(error)) => {
                shared::logging::log_error(ProcessId::current(), &format!("Job {id}"), &error);
                self.registry.mark_failed(id, JobError::from(&error)).await;
            }
            Err(join_error) => {
                let error = EngineError::internal(panic_message(join_error));
                shared::logging::log_error(ProcessId::current(), &format!("Job {id}"), &error);
                self.registry.mark_failed(id, JobError::from(&error)).await;
            }
        }
    }

    async fn execute(&self, id: JobId, request: SearchRequest) -> EngineResult<SearchResults> {
        let model = self.store.load().await;
        let seed = self.config.seed.unwrap_or_else(rand::random);
        let mut optimizer = BanditOptimizer::new(model, &request, seed);
        let mut aggregator = DomainAggregator::new();
        let mut results = SearchResults::empty(request.clone());
        let total = request.loop_count;

        shared::logging::log_progress(
            ProcessId::current(),
            &format!("Job {id} started"),
            &format!(
                "searching '{}' over {} loop(s), quota {}, budget {:.2}",
                request.keywords, total, request.max_names, request.yearly_budget
            ),
        );

        for loop_index in 1..=total {
            let plan = optimizer.plan_loop(loop_index);
            self.registry
                .patch(
                    id,
                    JobPatch {
                        phase: Some(JobPhase::Looping),
                        current_loop: Some(loop_index),
                        progress: Some(progress_for(loop_index - 1, 0.0, total)),
                        ..Default::default()
                    },
                )
                .await;

            let outcome = self.run_loop(id, &plan, &request, &aggregator, &results).await?;

            let reward = loop_reward(&outcome.checked);
            optimizer.record_reward(&plan, reward);
            let summary = summarize(&plan, &request, &outcome, reward, &self.config);
            aggregator.merge_loop(loop_index, outcome.checked);

            process_info!(
                ProcessId::current(),
                "🔁 Job {} loop {}/{}: {} qualifying of {} considered, reward {:.3}{}",
                id,
                loop_index,
                total,
                summary.within_budget,
                summary.considered,
                reward,
                summary
                    .skip_reason
                    .as_deref()
                    .map(|r| format!(" ({r})"))
                    .unwrap_or_default()
            );

            results.total_considered += summary.considered;
            results.total_invalid += summary.invalid;
            results.loops.push(summary);
            results.best_loop = optimizer.best_loop();
            results.domains = aggregator.leaderboard(&LeaderboardQuery::default());
            results.generated_at = Utc::now();

            self.registry
                .patch(
                    id,
                    JobPatch {
                        progress: Some(progress_for(loop_index, 0.0, total)),
                        results: Some(results.clone()),
                        ..Default::default()
                    },
                )
                .await;
        }

        self.registry
            .patch(
                id,
                JobPatch {
                    phase: Some(JobPhase::Finalize),
                    ..Default::default()
                },
            )
            .await;

        let state = optimizer.snapshot();
        if let Err(error) = self.store.save(&state).await {
            process_warn!(ProcessId::current(), "⚠️ Optimizer model not saved: {}", error);
        }

        Ok(results)
    }

    /// Run batches for one loop until the quota or a stop condition
    async fn run_loop(
        &self,
        id: JobId,
        plan: &LoopPlan,
        request: &SearchRequest,
        aggregator: &DomainAggregator,
        published: &SearchResults,
    ) -> EngineResult<LoopOutcome> {
        let quota = request.max_names as usize;
        let cap = self.config.considered_cap;
        let max_length = request.max_length as usize;

        let mut seen_names: HashSet<String> = HashSet::new();
        let mut seen_domains: HashSet<String> = HashSet::new();
        let mut checked: Vec<RankedDomainResult> = Vec::new();
        let mut qualifying = 0usize;
        let mut considered = 0usize;
        let mut batches = 0u32;
        let mut stalled = 0u32;
        let mut invalid = 0u32;

        let stop = loop {
            if qualifying >= quota {
                break StopCondition::QuotaMet;
            }
            if considered >= cap {
                break StopCondition::ConsideredCap;
            }
            if batches >= self.config.max_batches_per_loop {
                break StopCondition::BatchCap;
            }
            if stalled >= self.config.stall_limit {
                break StopCondition::Stalled;
            }

            let remaining = (quota - qualifying) as u32;
            let generation = GenerationRequest {
                params: plan.params.clone(),
                blacklist: request.blacklist.clone(),
                max_length: request.max_length,
                tld: request.tld.clone(),
                count: batch_size(remaining, self.config.max_generation_batch),
            };
            let names = self
                .generation_queue
                .submit(|| self.generator.generate(&generation))
                .await?;
            batches += 1;

            let mut fresh = Vec::new();
            for name in names {
                if considered >= cap {
                    break;
                }
                let key = name.display_name.trim().to_lowercase();
                if !key.is_empty() && seen_names.insert(key) {
                    considered += 1;
                    fresh.push(name);
                }
            }

            let batch = normalize_batch(&fresh, &request.tld, max_length);
            invalid += batch.invalid.len() as u32;
            for rejected in &batch.invalid {
                process_debug!(
                    ProcessId::current(),
                    "🚫 Job {} loop {} rejected '{}': {}",
                    id,
                    plan.loop_index,
                    rejected.source_name,
                    rejected.reason
                );
            }
            let candidates: Vec<DomainCandidate> = batch
                .candidates
                .into_iter()
                .filter(|c| seen_domains.insert(c.domain.clone()))
                .collect();

            let mut answers = self.check_availability(&candidates).await?;
            let mut new_qualifying = 0usize;
            for candidate in &candidates {
                let raw = answers.remove(&candidate.domain).unwrap_or_else(|| {
                    RawAvailabilityResult::unavailable(candidate.domain.clone(), "no answer from availability provider")
                });
                let ranked = score(&raw, candidate, request);
                if ranked.is_actionable() {
                    new_qualifying += 1;
                }
                checked.push(ranked);
            }

            qualifying += new_qualifying;
            stalled = if new_qualifying == 0 { stalled + 1 } else { 0 };

            process_debug!(
                ProcessId::current(),
                "📦 Job {} loop {} batch {}: {} fresh, {} checked, {} new qualifying ({}/{})",
                id,
                plan.loop_index,
                batches,
                fresh.len(),
                candidates.len(),
                new_qualifying,
                qualifying.min(quota),
                quota
            );

            self.publish_batch(id, plan, request, aggregator, published, &checked, qualifying, batches)
                .await;
        };

        Ok(LoopOutcome {
            checked,
            stop,
            considered: considered as u32,
            batches,
            invalid,
        })
    }

    /// Check candidates chunk by chunk through the availability queue
    ///
    /// Chunks run concurrently. A failed chunk marks its domains unavailable,
    /// except for credential failures, which end the job.
    async fn check_availability(
        &self,
        candidates: &[DomainCandidate],
    ) -> EngineResult<HashMap<String, RawAvailabilityResult>> {
        let domains: Vec<String> = candidates.iter().map(|c| c.domain.clone()).collect();
        let chunks = chunk_domains(&domains, self.config.availability_chunk_size);

        let checks = chunks.into_iter().map(|chunk| async move {
            let outcome = self
                .availability_queue
                .submit(|| self.availability.check_bulk(&chunk))
                .await;
            (chunk, outcome)
        });

        let mut answers = HashMap::with_capacity(domains.len());
        for (chunk, outcome) in join_all(checks).await {
            match outcome {
                Ok(found) => answers.extend(found.into_iter().map(|(k, v)| (k.to_lowercase(), v))),
                Err(error @ EngineError::AvailabilityAuth { .. }) => {
                    process_error!(ProcessId::current(), "🔑 Availability credentials rejected: {}", error);
                    return Err(error);
                }
                Err(error) => {
                    process_warn!(
                        ProcessId::current(),
                        "⚠️ Availability chunk of {} failed ({}): {}",
                        chunk.len(),
                        error.code(),
                        error
                    );
                    let reason = format!("availability check failed: {error}");
                    for domain in chunk {
                        answers.insert(domain.clone(), RawAvailabilityResult::unavailable(domain, reason.clone()));
                    }
                }
            }
        }
        Ok(answers)
    }

    /// Publish a mid-loop snapshot including this loop's results so far
    #[allow(clippy::too_many_arguments)]
    async fn publish_batch(
        &self,
        id: JobId,
        plan: &LoopPlan,
        request: &SearchRequest,
        aggregator: &DomainAggregator,
        published: &SearchResults,
        checked: &[RankedDomainResult],
        qualifying: usize,
        batches: u32,
    ) {
        let mut preview = aggregator.clone();
        preview.merge_loop(plan.loop_index, checked.to_vec());

        let mut snapshot = published.clone();
        snapshot.domains = preview.leaderboard(&LeaderboardQuery::default());
        snapshot.generated_at = Utc::now();

        let quota_fraction = qualifying as f64 / request.max_names.max(1) as f64;
        let batch_fraction = batches as f64 / self.config.max_batches_per_loop.max(1) as f64;
        let fraction = quota_fraction.max(batch_fraction).min(1.0);

        self.registry
            .patch(
                id,
                JobPatch {
                    progress: Some(progress_for(plan.loop_index - 1, fraction, request.loop_count)),
                    results: Some(snapshot),
                    ..Default::default()
                },
            )
            .await;
    }
}

fn skip_reason(stop: StopCondition, config: &EngineConfig) -> Option<String> {
    match stop {
        StopCondition::QuotaMet => None,
        StopCondition::ConsideredCap => Some(format!(
            "considered-name cap of {} reached before quota",
            config.considered_cap
        )),
        StopCondition::BatchCap => Some(format!(
            "batch cap of {} reached before quota",
            config.max_batches_per_loop
        )),
        StopCondition::Stalled => Some(format!(
            "stalled after {} batches without a new qualifying name",
            config.stall_limit
        )),
    }
}

fn summarize(
    plan: &LoopPlan,
    request: &SearchRequest,
    outcome: &LoopOutcome,
    reward: f64,
    config: &EngineConfig,
) -> LoopSummary {
    let checked = &outcome.checked;
    let available = checked.iter().filter(|r| r.available).count() as u32;
    let qualifying = outcome.qualifying() as u32;
    let average_score = if checked.is_empty() {
        0.0
    } else {
        round2(checked.iter().map(|r| r.overall_score).sum::<f64>() / checked.len() as f64)
    };
    let top = checked
        .iter()
        .filter(|r| r.is_actionable())
        .min_by(|a, b| compare_results(a, b, SortMode::Overall));

    LoopSummary {
        loop_index: plan.loop_index,
        params: plan.params.clone(),
        required_quota: request.max_names,
        quota_met: outcome.stop == StopCondition::QuotaMet,
        limit_hit: outcome.stop == StopCondition::ConsideredCap,
        considered: outcome.considered,
        batches: outcome.batches,
        discovered: checked.len() as u32,
        available,
        within_budget: qualifying,
        invalid: outcome.invalid,
        average_score,
        top_domain: top.map(|r| r.domain.clone()),
        top_score: top.map(|r| r.overall_score),
        reward: round2(reward),
        skip_reason: skip_reason(outcome.stop, config),
    }
}
