//! Scoring model for checked domain candidates
//!
//! Every result gets two component families: marketability (how good the name
//! is) and financial value (how obtainable it is within the budget). The overall
//! score blends them with a price-first weighting. Each component also yields a
//! signed impact so the strongest reasons behind a score can be surfaced.
//!
//! Scoring is a pure function of its inputs.

use super::tokens::tokenize;
use shared::{round2, DomainCandidate, RankedDomainResult, RawAvailabilityResult, SearchRequest, ValueDriver};

pub const FINANCIAL_WEIGHT: f64 = 0.62;
pub const MARKETABILITY_WEIGHT: f64 = 0.38;

const IDEAL_LENGTH: f64 = 9.0;
const IDEAL_VOWEL_RATIO: f64 = 0.42;
const OVER_BUDGET_FACTOR: f64 = 0.60;
const UNAVAILABLE_FACTOR: f64 = 0.35;
const MAX_DRIVERS: usize = 4;

/// One weighted sub-score before it is folded into its family
#[derive(Debug, Clone)]
struct Component {
    name: &'static str,
    weight: f64,
    score: f64,
    detail: String,
}

impl Component {
    fn new(name: &'static str, weight: f64, score: f64, detail: String) -> Self {
        Self {
            name,
            weight,
            score: score.clamp(0.0, 100.0),
            detail,
        }
    }

    fn weighted(&self) -> f64 {
        self.score * self.weight
    }

    fn impact(&self) -> f64 {
        (self.score - 50.0) * self.weight
    }
}

/// Trust multiplier applied to marketability for the target TLD
pub fn tld_trust(tld: &str) -> f64 {
    match tld.trim_start_matches('.').to_lowercase().as_str() {
        "com" => 1.0,
        "net" | "org" | "io" | "ai" => 0.95,
        "co" => 0.93,
        "app" | "dev" => 0.92,
        "xyz" | "info" | "biz" => 0.90,
        _ => 0.85,
    }
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y')
}

fn word_syllables(word: &str) -> u32 {
    let mut groups = 0u32;
    let mut in_vowel = false;
    for c in word.chars() {
        let vowel = is_vowel(c);
        if vowel && !in_vowel {
            groups += 1;
        }
        in_vowel = vowel;
    }
    if groups > 1 && word.ends_with('e') && !word.ends_with("le") {
        groups -= 1;
    }
    groups.max(1)
}

/// Vowel-group syllable estimate over the alphabetic words of a label
pub fn estimate_syllables(label: &str) -> u32 {
    label
        .to_lowercase()
        .split(|c: char| !c.is_ascii_alphabetic())
        .filter(|word| !word.is_empty())
        .map(word_syllables)
        .sum()
}

fn syllable_score(syllables: u32) -> f64 {
    match syllables {
        2 | 3 => 100.0,
        1 | 4 => 70.0,
        5 => 40.0,
        _ => 15.0,
    }
}

fn pronounceability(label: &str) -> (f64, String) {
    let letters: Vec<char> = label.chars().filter(|c| c.is_ascii_alphabetic()).collect();
    if letters.is_empty() {
        return (0.0, "no letters to pronounce".to_string());
    }

    let vowels = letters.iter().filter(|c| is_vowel(**c)).count();
    let ratio = vowels as f64 / letters.len() as f64;

    let mut excess = 0usize;
    let mut run = 0usize;
    for c in &letters {
        if is_vowel(*c) {
            run = 0;
        } else {
            run += 1;
            if run > 2 {
                excess += 1;
            }
        }
    }

    let score = 100.0 - 180.0 * (ratio - IDEAL_VOWEL_RATIO).abs() - 15.0 * excess as f64;
    let detail = if excess > 0 {
        format!("vowel ratio {ratio:.2}, {excess} clustered consonant(s)")
    } else {
        format!("vowel ratio {ratio:.2}")
    };
    (score, detail)
}

fn keyword_overlap(compact: &str, keywords: &str) -> (f64, String) {
    let tokens = tokenize(keywords);
    if tokens.is_empty() {
        return (50.0, "no keywords to match".to_string());
    }

    let mut matched = 0usize;
    let total: f64 = tokens
        .iter()
        .map(|token| {
            if compact.contains(token.as_str()) {
                matched += 1;
                1.0
            } else if token.chars().count() >= 4 {
                let stem: String = token.chars().take(4).collect();
                if compact.contains(&stem) {
                    0.5
                } else {
                    0.0
                }
            } else {
                0.0
            }
        })
        .sum();

    let score = 100.0 * total / tokens.len() as f64;
    (score, format!("{matched} of {} keyword(s) matched", tokens.len()))
}

fn distinctiveness(compact: &str) -> (f64, String) {
    let chars: Vec<char> = compact.chars().collect();
    if chars.is_empty() {
        return (0.0, "empty label".to_string());
    }

    let mut unique = chars.clone();
    unique.sort_unstable();
    unique.dedup();

    let tripled = chars.windows(3).any(|w| w[0] == w[1] && w[1] == w[2]);
    let mut score = 40.0 + 60.0 * unique.len() as f64 / chars.len() as f64;
    if tripled {
        score -= 20.0;
    }

    let detail = if tripled {
        format!("{} distinct characters, tripled letter", unique.len())
    } else {
        format!("{} distinct characters", unique.len())
    };
    (score, detail)
}

fn marketability_components(candidate: &DomainCandidate, request: &SearchRequest) -> Vec<Component> {
    let label = candidate.label.as_str();
    let compact: String = label.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    let length = label.chars().count();
    let syllables = estimate_syllables(label);
    let hyphens = label.matches('-').count();
    let has_digit = label.chars().any(|c| c.is_ascii_digit());

    let (pron_score, pron_detail) = pronounceability(label);
    let (kw_score, kw_detail) = keyword_overlap(&compact, &request.keywords);
    let (dist_score, dist_detail) = distinctiveness(&compact);

    vec![
        Component::new(
            "length",
            0.20,
            100.0 - 12.0 * (length as f64 - IDEAL_LENGTH).abs(),
            format!("{length} characters"),
        ),
        Component::new(
            "syllables",
            0.15,
            syllable_score(syllables),
            format!("{syllables} syllable(s)"),
        ),
        Component::new("pronounceability", 0.20, pron_score, pron_detail),
        Component::new("keyword_overlap", 0.15, kw_score, kw_detail),
        Component::new("distinctiveness", 0.10, dist_score, dist_detail),
        Component::new(
            "hyphens",
            0.10,
            match hyphens {
                0 => 100.0,
                1 => 40.0,
                _ => 0.0,
            },
            format!("{hyphens} hyphen(s)"),
        ),
        Component::new(
            "digits",
            0.10,
            if has_digit { 30.0 } else { 100.0 },
            if has_digit { "contains digits" } else { "letters only" }.to_string(),
        ),
    ]
}

fn financial_components(
    raw: &RawAvailabilityResult,
    premium: bool,
    budget: f64,
) -> Vec<Component> {
    let price = raw.price();

    let (afford_score, afford_detail) = match price {
        Some(p) => (
            100.0 * (1.0 - p / budget),
            format!("{p:.2} against a {budget:.2} budget"),
        ),
        None => (50.0, "price unknown".to_string()),
    };

    vec![
        Component::new(
            "availability",
            0.30,
            if raw.available { 100.0 } else { 0.0 },
            if raw.available {
                "available to register".to_string()
            } else {
                raw.reason.clone().unwrap_or_else(|| "not available".to_string())
            },
        ),
        Component::new(
            "definitive",
            0.15,
            if raw.definitive { 100.0 } else { 40.0 },
            if raw.definitive { "confirmed by registry" } else { "best-effort answer" }.to_string(),
        ),
        Component::new("affordability", 0.40, afford_score, afford_detail),
        Component::new(
            "premium",
            0.15,
            if premium { 0.0 } else { 100.0 },
            if premium { "premium listing" } else { "standard listing" }.to_string(),
        ),
    ]
}

fn to_driver(component: &Component) -> ValueDriver {
    ValueDriver {
        component: component.name.to_string(),
        impact: round2(component.impact()),
        detail: component.detail.clone(),
    }
}

/// Strongest positive and negative impacts, stable on ties
fn select_drivers(components: &[Component]) -> (Vec<ValueDriver>, Vec<ValueDriver>) {
    let mut positive: Vec<&Component> = components.iter().filter(|c| c.impact() > 0.0).collect();
    positive.sort_by(|a, b| b.impact().total_cmp(&a.impact()));

    let mut negative: Vec<&Component> = components.iter().filter(|c| c.impact() < 0.0).collect();
    negative.sort_by(|a, b| a.impact().total_cmp(&b.impact()));

    (
        positive.into_iter().take(MAX_DRIVERS).map(to_driver).collect(),
        negative.into_iter().take(MAX_DRIVERS).map(to_driver).collect(),
    )
}

/// Score one checked candidate against the originating request
///
/// Loop provenance fields are left at zero; the aggregator owns them.
pub fn score(
    raw: &RawAvailabilityResult,
    candidate: &DomainCandidate,
    request: &SearchRequest,
) -> RankedDomainResult {
    let price = raw.price();
    let over_budget = price.map_or(false, |p| p > request.yearly_budget);

    let marketing = marketability_components(candidate, request);
    let financial = financial_components(raw, candidate.premium, request.yearly_budget);

    let marketability = (marketing.iter().map(Component::weighted).sum::<f64>()
        * tld_trust(&candidate.tld))
    .clamp(0.0, 100.0);

    let mut financial_value = financial.iter().map(Component::weighted).sum::<f64>();
    if !raw.available {
        financial_value *= UNAVAILABLE_FACTOR;
    } else if over_budget {
        financial_value *= OVER_BUDGET_FACTOR;
    }
    let financial_value = financial_value.clamp(0.0, 100.0);

    let overall =
        (FINANCIAL_WEIGHT * financial_value + MARKETABILITY_WEIGHT * marketability).clamp(0.0, 100.0);

    let all: Vec<Component> = marketing.into_iter().chain(financial).collect();
    let (value_drivers, value_detractors) = select_drivers(&all);

    RankedDomainResult {
        domain: candidate.domain.clone(),
        source_name: candidate.source_name.clone(),
        premium: candidate.premium,
        available: raw.available,
        definitive: raw.definitive,
        price_micros: raw.price_micros,
        currency: raw.currency.clone(),
        period: raw.period,
        reason: raw.reason.clone(),
        price: price.map(round2),
        over_budget,
        marketability_score: round2(marketability),
        financial_value_score: round2(financial_value),
        overall_score: round2(overall),
        syllables: estimate_syllables(&candidate.label),
        label_length: candidate.label.chars().count() as u32,
        value_drivers,
        value_detractors,
        first_seen_loop: 0,
        last_seen_loop: 0,
        times_discovered: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::normalizer::normalize_name;
    use shared::GeneratedName;

    fn candidate(name: &str, tld: &str) -> DomainCandidate {
        normalize_name(&GeneratedName::new(name), tld, 25).unwrap()
    }

    fn request(keywords: &str, budget: f64) -> SearchRequest {
        SearchRequest::new(keywords, budget)
    }

    #[test]
    fn test_syllable_estimates() {
        assert_eq!(estimate_syllables("nova"), 2);
        assert_eq!(estimate_syllables("brightwave"), 2);
        assert_eq!(estimate_syllables("xyz"), 1);
        assert_eq!(estimate_syllables("table"), 2);
        assert_eq!(estimate_syllables("solar-bean"), 3);
    }

    #[test]
    fn test_tld_trust_table() {
        assert_eq!(tld_trust("com"), 1.0);
        assert_eq!(tld_trust(".IO"), 0.95);
        assert_eq!(tld_trust("co"), 0.93);
        assert_eq!(tld_trust("dev"), 0.92);
        assert_eq!(tld_trust("xyz"), 0.90);
        assert_eq!(tld_trust("pizza"), 0.85);
    }

    #[test]
    fn test_scores_are_bounded() {
        let names = ["a", "zzzzzzzzzzzzzzzzzzzzzzzzz", "a-b-c-1-2-3", "aeiouaeiou", "nova"];
        let raws = [
            RawAvailabilityResult::available("x", 0),
            RawAvailabilityResult::available("x", 5_000_000_000),
            RawAvailabilityResult::unavailable("x", "taken"),
        ];
        for name in names {
            for raw in &raws {
                for premium in [false, true] {
                    let mut c = candidate(name, "zz");
                    c.premium = premium;
                    let r = score(raw, &c, &request("nova zzz", 10.0));
                    for s in [r.marketability_score, r.financial_value_score, r.overall_score] {
                        assert!((0.0..=100.0).contains(&s), "{name}: {s}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_affordability_is_monotonic() {
        let c = candidate("nova", "com");
        let req = request("nova", 50.0);
        let mut previous = f64::MIN;
        // Scores are rounded to two decimals, so strict steps need wide price gaps
        for price in [45.0, 30.0, 20.0, 9.0, 1.0] {
            let raw = RawAvailabilityResult::available("nova.com", (price * 1_000_000.0) as u64);
            let r = score(&raw, &c, &req);
            assert!(!r.over_budget);
            assert!(r.overall_score > previous, "price {price}");
            previous = r.overall_score;
        }
    }

    #[test]
    fn test_affordability_never_decreases_at_cent_steps() {
        let c = candidate("nova", "com");
        let req = request("nova", 50.0);
        let mut previous = f64::MIN;
        for cents in (1_000..=2_000u64).rev() {
            let raw = RawAvailabilityResult::available("nova.com", cents * 10_000);
            let r = score(&raw, &c, &req);
            assert!(r.overall_score >= previous, "price {cents} cents");
            previous = r.overall_score;
        }
    }

    #[test]
    fn test_budget_and_availability_discounts() {
        let c = candidate("alpha", "com");
        let req = request("alpha", 50.0);

        let cheap = score(&RawAvailabilityResult::available("alpha.com", 20_000_000), &c, &req);
        let dear = score(&RawAvailabilityResult::available("alpha.com", 80_000_000), &c, &req);
        let taken = score(&RawAvailabilityResult::unavailable("alpha.com", "registered"), &c, &req);

        assert!(!cheap.over_budget);
        assert!(dear.over_budget);
        assert!(!taken.over_budget);
        assert!(cheap.overall_score > dear.overall_score);
        assert!(dear.financial_value_score > taken.financial_value_score);
        assert_eq!(cheap.price, Some(20.0));
        assert_eq!(taken.price, None);
    }

    #[test]
    fn test_drivers_are_capped_and_signed() {
        let c = candidate("x-7-q", "zz");
        let raw = RawAvailabilityResult::unavailable("x-7-q.zz", "registered");
        let r = score(&raw, &c, &request("orbit", 10.0));

        assert!(r.value_drivers.len() <= 4);
        assert!(r.value_detractors.len() <= 4);
        assert!(r.value_drivers.iter().all(|d| d.impact > 0.0));
        assert!(r.value_detractors.iter().all(|d| d.impact < 0.0));
        // most damaging first
        let impacts: Vec<f64> = r.value_detractors.iter().map(|d| d.impact).collect();
        assert!(impacts.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(r.value_detractors[0].component, "availability");
    }

    #[test]
    fn test_keyword_overlap_rewards_matches() {
        let req = request("solar coffee", 50.0);
        let raw = RawAvailabilityResult::available("x", 10_000_000);
        let matched = score(&raw, &candidate("solarbrew", "com"), &req);
        let unmatched = score(&raw, &candidate("quillbrew", "com"), &req);
        assert!(matched.marketability_score > unmatched.marketability_score);
    }

    #[test]
    fn test_com_outranks_unknown_tld() {
        let req = request("nova", 50.0);
        let raw = RawAvailabilityResult::available("x", 10_000_000);
        let com = score(&raw, &candidate("nova", "com"), &req);
        let other = score(&raw, &candidate("nova", "pizza"), &req);
        assert!(com.marketability_score > other.marketability_score);
    }
}
