//! Cross-loop aggregation of ranked results
//!
//! Keeps the best result seen for every domain across all loops of a job,
//! along with when and how often it was discovered. Only actionable results
//! (available and within budget) are ever admitted.

use shared::{LeaderboardQuery, RankedDomainResult, SortMode};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Outcome of folding one loop into the aggregate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub inserted: usize,
    pub updated: usize,
    pub rejected: usize,
}

/// Best-known result per lowercase domain
#[derive(Debug, Clone, Default)]
pub struct DomainAggregator {
    entries: HashMap<String, RankedDomainResult>,
}

fn price_key(result: &RankedDomainResult) -> f64 {
    result.price.unwrap_or(f64::INFINITY)
}

/// True when `challenger` should replace `current`
fn beats(challenger: &RankedDomainResult, current: &RankedDomainResult) -> bool {
    challenger
        .overall_score
        .total_cmp(&current.overall_score)
        .then_with(|| price_key(current).total_cmp(&price_key(challenger)))
        .then_with(|| current.domain.cmp(&challenger.domain))
        == Ordering::Greater
}

impl DomainAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, domain: &str) -> Option<&RankedDomainResult> {
        self.entries.get(&domain.to_lowercase())
    }

    /// Fold one loop's scored results into the aggregate
    pub fn merge_loop(&mut self, loop_index: u32, results: Vec<RankedDomainResult>) -> MergeStats {
        let mut stats = MergeStats::default();

        for mut result in results {
            if !result.is_actionable() {
                stats.rejected += 1;
                continue;
            }

            let key = result.domain.to_lowercase();
            match self.entries.get_mut(&key) {
                None => {
                    result.first_seen_loop = loop_index;
                    result.last_seen_loop = loop_index;
                    result.times_discovered = 1;
                    self.entries.insert(key, result);
                    stats.inserted += 1;
                }
                Some(existing) => {
                    let first_seen = existing.first_seen_loop;
                    let times = existing.times_discovered + 1;
                    if beats(&result, existing) {
                        *existing = result;
                    }
                    existing.first_seen_loop = first_seen;
                    existing.last_seen_loop = loop_index;
                    existing.times_discovered = times;
                    stats.updated += 1;
                }
            }
        }

        stats
    }

    /// Filtered and sorted view of the aggregate
    pub fn leaderboard(&self, query: &LeaderboardQuery) -> Vec<RankedDomainResult> {
        apply_query(self.entries.values().cloned(), query)
    }
}

/// Filter, sort and limit any set of ranked results
///
/// Results without a known price never pass a `max_price` filter.
pub fn apply_query<I>(results: I, query: &LeaderboardQuery) -> Vec<RankedDomainResult>
where
    I: IntoIterator<Item = RankedDomainResult>,
{
    let mut results: Vec<RankedDomainResult> = results
        .into_iter()
        .filter(|r| query.min_score.map_or(true, |min| r.overall_score >= min))
        .filter(|r| {
            query
                .max_price
                .map_or(true, |max| r.price.map_or(false, |p| p <= max))
        })
        .collect();

    sort_results(&mut results, query.sort);
    if let Some(limit) = query.limit {
        results.truncate(limit);
    }
    results
}

fn by_overall_then_domain(a: &RankedDomainResult, b: &RankedDomainResult) -> Ordering {
    b.overall_score
        .total_cmp(&a.overall_score)
        .then_with(|| a.domain.cmp(&b.domain))
}

/// Ordering for one sort mode, ending in overall desc then domain asc
pub fn compare_results(a: &RankedDomainResult, b: &RankedDomainResult, mode: SortMode) -> Ordering {
    let primary = match mode {
        SortMode::Overall => Ordering::Equal,
        SortMode::Marketability => b.marketability_score.total_cmp(&a.marketability_score),
        SortMode::FinancialValue => b.financial_value_score.total_cmp(&a.financial_value_score),
        SortMode::Alphabetical => a.domain.cmp(&b.domain),
        SortMode::Syllables => a.syllables.cmp(&b.syllables),
        SortMode::Length => a.label_length.cmp(&b.label_length),
    };
    primary.then_with(|| by_overall_then_domain(a, b))
}

pub fn sort_results(results: &mut [RankedDomainResult], mode: SortMode) {
    results.sort_by(|a, b| compare_results(a, b, mode));
}
