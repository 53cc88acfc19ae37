//! Job lifecycle records and the result snapshots they publish

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::domain::RankedDomainResult;
use super::request::{MutationIntensity, NameStyle, Randomness, SearchRequest};

pub type JobId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    Done,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Failed)
    }
}

/// Reporting-only annotation of what a running job is doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobPhase {
    Looping,
    Finalize,
}

/// Terminal error carried by a failed job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobError {
    pub code: String,
    pub message: String,
}

/// Generation parameters chosen for one loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub style: NameStyle,
    pub randomness: Randomness,
    pub mutation: MutationIntensity,
    pub keywords: String,
    pub description: String,
}

/// Outcome of one discovery loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopSummary {
    pub loop_index: u32,
    pub params: GenerationParams,
    pub required_quota: u32,
    pub quota_met: bool,
    pub limit_hit: bool,
    pub considered: u32,
    pub batches: u32,
    pub discovered: u32,
    pub available: u32,
    pub within_budget: u32,
    pub invalid: u32,
    pub average_score: f64,
    pub top_domain: Option<String>,
    pub top_score: Option<f64>,
    pub reward: f64,
    pub skip_reason: Option<String>,
}

/// Aggregated, ranked snapshot of a job's discoveries so far
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    pub request: SearchRequest,
    pub domains: Vec<RankedDomainResult>,
    pub loops: Vec<LoopSummary>,
    pub best_loop: Option<u32>,
    pub total_considered: u32,
    pub total_invalid: u32,
    pub generated_at: DateTime<Utc>,
}

impl SearchResults {
    pub fn empty(request: SearchRequest) -> Self {
        Self {
            request,
            domains: Vec::new(),
            loops: Vec::new(),
            best_loop: None,
            total_considered: 0,
            total_invalid: 0,
            generated_at: Utc::now(),
        }
    }
}

/// Pollable state of one discovery job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchJob {
    pub id: JobId,
    pub status: JobStatus,
    pub phase: Option<JobPhase>,
    pub progress: u8,
    pub current_loop: u32,
    pub total_loops: u32,
    pub results: Option<SearchResults>,
    pub error: Option<JobError>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl SearchJob {
    pub fn new(request: &SearchRequest) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            status: JobStatus::Queued,
            phase: None,
            progress: 0,
            current_loop: 0,
            total_loops: request.loop_count,
            results: None,
            error: None,
            created_at: now,
            updated_at: now,
            finished_at: None,
        }
    }
}
