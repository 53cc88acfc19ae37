//! Epsilon-greedy parameter tuning across discovery loops
//!
//! Three categorical dimensions (style, randomness, mutation intensity) are
//! each treated as an independent bandit. Keyword and description tokens are
//! tracked the same way and used to evolve the query text between loops:
//! tokens that produced good loops are reinserted, weak ones are dropped.
//!
//! All randomness comes from a seeded `StdRng`, so two optimizers built from
//! the same seed and model plan identical loops.

use super::tokens::tokenize;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use shared::{
    ArmStats, GenerationParams, MutationIntensity, NameStyle, OptimizerModelState, Randomness,
    RankedDomainResult, SearchRequest,
};
use std::collections::BTreeMap;
use std::fmt::Display;

pub const STYLE_EPSILON: f64 = 0.24;
pub const RANDOMNESS_EPSILON: f64 = 0.24;
pub const MUTATION_EPSILON: f64 = 0.28;

pub const POSITIVE_TOKEN_THRESHOLD: f64 = 0.58;
pub const WEAK_TOKEN_THRESHOLD: f64 = 0.40;
const POSITIVE_POOL_PROBABILITY: f64 = 0.8;

pub const MAX_PLAN_TOKENS: usize = 8;
pub const MAX_REWARDED_TOKENS: usize = 12;
pub const MAX_TOKEN_CHARS: usize = 24;
pub const TOKEN_TABLE_CAP: usize = 300;
pub const REWARD_TOP_N: usize = 5;

/// Parameters and derived request for one loop
#[derive(Debug, Clone, PartialEq)]
pub struct LoopPlan {
    pub loop_index: u32,
    pub params: GenerationParams,
    /// Copy of the base request with the planned parameters applied
    pub request: SearchRequest,
}

/// Mean overall score of the top qualifying results, scaled to [0, 1]
pub fn loop_reward(results: &[RankedDomainResult]) -> f64 {
    let mut scores: Vec<f64> = results
        .iter()
        .filter(|r| r.is_actionable())
        .map(|r| r.overall_score)
        .collect();
    if scores.is_empty() {
        return 0.0;
    }

    scores.sort_by(|a, b| b.total_cmp(a));
    scores.truncate(REWARD_TOP_N);
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    (mean / 100.0).clamp(0.0, 1.0)
}

fn clamp_reward(raw: f64) -> f64 {
    if raw.is_nan() {
        0.0
    } else {
        raw.clamp(0.0, 1.0)
    }
}

fn arm_average(table: &BTreeMap<String, ArmStats>, key: &str) -> f64 {
    table.get(key).map(ArmStats::average).unwrap_or_else(|| ArmStats::default().average())
}

/// Per-job bandit state over a loaded model
pub struct BanditOptimizer {
    model: OptimizerModelState,
    rng: StdRng,
    base_request: SearchRequest,
    base_keywords: Vec<String>,
    base_description: Vec<String>,
    keyword_tokens: Vec<String>,
    description_tokens: Vec<String>,
    best_loop: Option<(u32, f64)>,
}

impl BanditOptimizer {
    pub fn new(model: OptimizerModelState, request: &SearchRequest, seed: u64) -> Self {
        let base_keywords = tokenize(&request.keywords);
        let base_description = tokenize(&request.description);
        Self {
            model,
            rng: StdRng::seed_from_u64(seed),
            base_request: request.clone(),
            keyword_tokens: base_keywords.clone(),
            description_tokens: base_description.clone(),
            base_keywords,
            base_description,
            best_loop: None,
        }
    }

    pub fn model(&self) -> &OptimizerModelState {
        &self.model
    }

    /// Loop index with the highest recorded reward, later loops winning ties
    pub fn best_loop(&self) -> Option<u32> {
        self.best_loop.map(|(index, _)| index)
    }

    /// Choose parameters and evolve the query text for the next loop
    pub fn plan_loop(&mut self, loop_index: u32) -> LoopPlan {
        let style = self.choose_arm(&NameStyle::ALL, |m| &m.style, STYLE_EPSILON);
        let randomness = self.choose_arm(&Randomness::ALL, |m| &m.randomness, RANDOMNESS_EPSILON);
        let mutation = self.choose_arm(&MutationIntensity::ALL, |m| &m.mutation, MUTATION_EPSILON);

        let keywords = std::mem::take(&mut self.keyword_tokens);
        self.keyword_tokens = self.mutate_tokens(keywords, TokenPool::Keywords, mutation);
        let description = std::mem::take(&mut self.description_tokens);
        self.description_tokens = self.mutate_tokens(description, TokenPool::Description, mutation);

        let keywords = join_or_fallback(&self.keyword_tokens, &self.base_request.keywords);
        let description = join_or_fallback(&self.description_tokens, &self.base_request.description);

        let mut request = self.base_request.clone();
        request.style = style;
        request.randomness = randomness;
        request.keywords = keywords.clone();
        request.description = description.clone();

        LoopPlan {
            loop_index,
            params: GenerationParams {
                style,
                randomness,
                mutation,
                keywords,
                description,
            },
            request,
        }
    }

    /// Credit a loop's reward to its arms and query tokens
    pub fn record_reward(&mut self, plan: &LoopPlan, raw_reward: f64) {
        let reward = clamp_reward(raw_reward);
        let params = &plan.params;

        self.model.style.entry(params.style.to_string()).or_default().record(reward);
        self.model
            .randomness
            .entry(params.randomness.to_string())
            .or_default()
            .record(reward);
        self.model
            .mutation
            .entry(params.mutation.to_string())
            .or_default()
            .record(reward);

        let text = format!("{} {}", params.keywords, params.description);
        let mut credited: Vec<String> = Vec::new();
        for token in tokenize(&text).into_iter().take(MAX_REWARDED_TOKENS) {
            let token: String = token.chars().take(MAX_TOKEN_CHARS).collect();
            if !credited.contains(&token) {
                credited.push(token);
            }
        }
        for token in credited {
            self.model.tokens.entry(token).or_default().record(reward);
        }

        let better = self.best_loop.map_or(true, |(_, best)| reward >= best);
        if better {
            self.best_loop = Some((plan.loop_index, reward));
        }
    }

    /// Final model for persistence: trimmed token table, bumped run counter
    pub fn snapshot(&mut self) -> OptimizerModelState {
        if self.model.tokens.len() > TOKEN_TABLE_CAP {
            let mut ranked: Vec<(String, ArmStats)> = std::mem::take(&mut self.model.tokens).into_iter().collect();
            ranked.sort_by(|a, b| b.1.average().total_cmp(&a.1.average()).then_with(|| a.0.cmp(&b.0)));
            ranked.truncate(TOKEN_TABLE_CAP);
            self.model.tokens = ranked.into_iter().collect();
        }
        self.model.runs += 1;
        self.model.updated_at = Some(Utc::now());
        self.model.clone()
    }

    fn choose_arm<T, F>(&mut self, arms: &[T], table: F, epsilon: f64) -> T
    where
        T: Copy + Display,
        F: Fn(&OptimizerModelState) -> &BTreeMap<String, ArmStats>,
    {
        if self.rng.gen::<f64>() < epsilon {
            return arms[self.rng.gen_range(0..arms.len())];
        }

        let mut best = arms[0];
        let mut best_average = f64::NEG_INFINITY;
        let mut ties = 0u32;
        for arm in arms {
            let average = arm_average(table(&self.model), &arm.to_string());
            if average > best_average + f64::EPSILON {
                best = *arm;
                best_average = average;
                ties = 1;
            } else if (average - best_average).abs() <= f64::EPSILON {
                // reservoir coin flip keeps every tied arm equally likely
                ties += 1;
                if self.rng.gen_range(0..ties) == 0 {
                    best = *arm;
                }
            }
        }
        best
    }

    fn mutate_tokens(
        &mut self,
        mut tokens: Vec<String>,
        pool: TokenPool,
        intensity: MutationIntensity,
    ) -> Vec<String> {
        let mut positive: Vec<(&String, f64)> = self
            .model
            .tokens
            .iter()
            .map(|(token, stats)| (token, stats.average()))
            .filter(|(_, average)| *average >= POSITIVE_TOKEN_THRESHOLD)
            .collect();
        positive.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        let positive: Vec<String> = positive.into_iter().map(|(token, _)| token.clone()).collect();

        let base = match pool {
            TokenPool::Keywords => &self.base_keywords,
            TokenPool::Description => &self.base_description,
        };

        for _ in 0..intensity.operations() {
            if tokens.len() > 2 {
                let weak: Vec<usize> = tokens
                    .iter()
                    .enumerate()
                    .filter(|(_, token)| {
                        self.model
                            .tokens
                            .get(token.as_str())
                            .map_or(false, |stats| stats.average() <= WEAK_TOKEN_THRESHOLD)
                    })
                    .map(|(index, _)| index)
                    .collect();
                let index = match weak.choose(&mut self.rng) {
                    Some(index) => *index,
                    None => self.rng.gen_range(0..tokens.len()),
                };
                tokens.remove(index);
            }

            let source = if !positive.is_empty() && self.rng.gen_bool(POSITIVE_POOL_PROBABILITY) {
                &positive
            } else {
                base
            };
            let fresh: Vec<&String> = source.iter().filter(|t| !tokens.contains(t)).collect();
            if let Some(token) = fresh.choose(&mut self.rng) {
                tokens.push((*token).clone());
            }
        }

        if intensity == MutationIntensity::High {
            tokens.shuffle(&mut self.rng);
        }
        tokens.truncate(MAX_PLAN_TOKENS);
        tokens
    }
}

#[derive(Debug, Clone, Copy)]
enum TokenPool {
    Keywords,
    Description,
}

fn join_or_fallback(tokens: &[String], fallback: &str) -> String {
    let joined = tokens.join(" ");
    if joined.chars().count() < 2 {
        fallback.to_string()
    } else {
        joined
    }
}
