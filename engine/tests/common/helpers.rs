//! Test helpers and builder patterns for engine tests
//!
//! This module provides a builder that wires mock collaborators into a
//! `SearchEngine` with permissive defaults, plus polling and assertion helpers.
use engine::traits::{MockAvailabilityProvider, MockModelStore, MockNameGenerator};
use engine::{EngineConfig, SearchEngine};
use shared::{JobId, JobStatus, LeaderboardQuery, LoopSummary, OptimizerModelState, SearchJob};
use std::sync::Arc;
use std::time::Duration;

use super::fixtures::TestFixtures;

/// Builder pattern for creating test engines with sensible defaults
pub struct EngineBuilder {
    config: EngineConfig,
    generator: MockNameGenerator,
    availability: MockAvailabilityProvider,
    store: MockModelStore,
}

impl EngineBuilder {
    /// Create a new builder whose model store always starts fresh
    pub fn new() -> Self {
        let mut store = MockModelStore::new();

        // Set up default successful behaviors to prevent panics
        store
            .expect_load()
            .returning(OptimizerModelState::default)
            .times(0..);

        store
            .expect_save()
            .returning(|_| Ok(()))
            .times(0..);

        Self {
            config: TestFixtures::config(),
            generator: MockNameGenerator::new(),
            availability: MockAvailabilityProvider::new(),
            store,
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_generator(mut self, generator: MockNameGenerator) -> Self {
        self.generator = generator;
        self
    }

    pub fn with_availability(mut self, availability: MockAvailabilityProvider) -> Self {
        self.availability = availability;
        self
    }

    pub fn with_store(mut self, store: MockModelStore) -> Self {
        self.store = store;
        self
    }

    pub fn build(self) -> SearchEngine {
        SearchEngine::new(
            self.config,
            Arc::new(self.generator),
            Arc::new(self.availability),
            Arc::new(self.store),
        )
    }
}

/// Common test helper functions
pub struct TestHelpers;

impl TestHelpers {
    /// Generator that answers every batch with the same labels
    pub fn fixed_generator(labels: &'static [&'static str]) -> MockNameGenerator {
        let mut generator = MockNameGenerator::new();
        generator
            .expect_generate()
            .returning(move |_| Ok(TestFixtures::names(labels)))
            .times(1..);
        generator
    }

    /// Availability provider classifying each domain independently
    pub fn classifying_availability<F>(classify: F) -> MockAvailabilityProvider
    where
        F: Fn(&str) -> shared::RawAvailabilityResult + Send + Sync + 'static,
    {
        let mut availability = MockAvailabilityProvider::new();
        availability
            .expect_check_bulk()
            .returning(move |domains| Ok(TestFixtures::answer_all(domains, &classify)))
            .times(0..);
        availability
    }

    /// Poll until the job reaches `done` or `failed`
    pub async fn wait_for_terminal(engine: &SearchEngine, id: JobId) -> SearchJob {
        let poll = async {
            loop {
                if let Some(job) = engine.job(id, &LeaderboardQuery::default()).await {
                    if job.status.is_terminal() {
                        return job;
                    }
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        };
        tokio::time::timeout(Duration::from_secs(10), poll)
            .await
            .expect("job did not finish in time")
    }

    pub fn loops(job: &SearchJob) -> &[LoopSummary] {
        &job.results.as_ref().expect("job has results").loops
    }

    pub fn domains(job: &SearchJob) -> Vec<String> {
        job.results
            .as_ref()
            .map(|r| r.domains.iter().map(|d| d.domain.clone()).collect())
            .unwrap_or_default()
    }

    /// Assert a failed job carries the expected error code
    pub fn assert_failed_with(job: &SearchJob, code: &str) {
        assert_eq!(job.status, JobStatus::Failed, "job should have failed: {job:?}");
        let error = job.error.as_ref().expect("failed job carries an error");
        assert_eq!(error.code, code, "unexpected error: {}", error.message);
        assert!(job.finished_at.is_some());
    }
}
