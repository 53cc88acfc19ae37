//! Candidate normalization
//!
//! Turns raw generator output into canonical `label.tld` candidates. Names that
//! cannot be turned into a usable DNS label are returned as explicit invalid
//! records instead of being dropped silently.

use regex::Regex;
use shared::{DomainCandidate, GeneratedName, InvalidCandidate, InvalidReason};
use std::collections::HashSet;
use std::sync::OnceLock;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Longest label DNS allows
pub const DNS_LABEL_LIMIT: usize = 63;

fn separator_runs() -> &'static Regex {
    static SEPARATORS: OnceLock<Regex> = OnceLock::new();
    SEPARATORS.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("static separator pattern"))
}

/// Fold a display name into a bare DNS label, empty when nothing usable remains
pub fn fold_label(display_name: &str) -> String {
    let ascii: String = display_name
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .replace('&', " and ")
        .to_lowercase();

    separator_runs()
        .replace_all(&ascii, "-")
        .trim_matches('-')
        .to_string()
}

/// Normalize one generated name against the target TLD and label cap
pub fn normalize_name(
    name: &GeneratedName,
    tld: &str,
    max_len: usize,
) -> Result<DomainCandidate, InvalidCandidate> {
    let invalid = |reason| InvalidCandidate {
        source_name: name.display_name.clone(),
        reason,
    };

    let label = fold_label(&name.display_name);
    let length = label.chars().count();

    if label.is_empty() {
        return Err(invalid(InvalidReason::Unnormalizable));
    }
    if length > DNS_LABEL_LIMIT {
        return Err(invalid(InvalidReason::ExceedsDnsLimit { length }));
    }
    if length > max_len {
        return Err(invalid(InvalidReason::TooLong { length, max: max_len }));
    }

    let tld = tld.trim().trim_start_matches('.').to_lowercase();
    Ok(DomainCandidate {
        domain: format!("{label}.{tld}"),
        label,
        tld,
        source_name: name.display_name.clone(),
        premium: name.premium,
    })
}

/// Valid candidates and rejected names from one generation batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedBatch {
    pub candidates: Vec<DomainCandidate>,
    pub invalid: Vec<InvalidCandidate>,
}

/// Normalize a batch, keeping the first occurrence of each domain
pub fn normalize_batch(names: &[GeneratedName], tld: &str, max_len: usize) -> NormalizedBatch {
    let mut seen = HashSet::new();
    let mut batch = NormalizedBatch::default();

    for name in names {
        match normalize_name(name, tld, max_len) {
            Ok(candidate) => {
                if seen.insert(candidate.domain.clone()) {
                    batch.candidates.push(candidate);
                }
            }
            Err(invalid) => batch.invalid.push(invalid),
        }
    }

    batch
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_label_strips_diacritics_and_punctuation() {
        assert_eq!(fold_label("Café Lumière"), "cafe-lumiere");
        assert_eq!(fold_label("  --Solar__Bean!! "), "solar-bean");
        assert_eq!(fold_label("Salt & Pepper"), "salt-and-pepper");
        assert_eq!(fold_label("Ünïcödé"), "unicode");
    }

    #[test]
    fn test_empty_name_is_unnormalizable() {
        let result = normalize_name(&GeneratedName::new("!!! ???"), "com", 15);
        assert_eq!(result.unwrap_err().reason, InvalidReason::Unnormalizable);
    }

    #[test]
    fn test_length_limits() {
        let long = "a".repeat(70);
        let result = normalize_name(&GeneratedName::new(long), "com", 25);
        assert_eq!(
            result.unwrap_err().reason,
            InvalidReason::ExceedsDnsLimit { length: 70 }
        );

        let result = normalize_name(&GeneratedName::new("Brightwater Labs"), "com", 10);
        assert_eq!(
            result.unwrap_err().reason,
            InvalidReason::TooLong { length: 16, max: 10 }
        );
    }

    #[test]
    fn test_candidate_fields() {
        let candidate = normalize_name(&GeneratedName::premium("Nova Bloom"), ".IO", 15).unwrap();
        assert_eq!(candidate.domain, "nova-bloom.io");
        assert_eq!(candidate.label, "nova-bloom");
        assert_eq!(candidate.tld, "io");
        assert_eq!(candidate.source_name, "Nova Bloom");
        assert!(candidate.premium);
    }

    #[test]
    fn test_batch_dedups_by_domain() {
        let names = vec![
            GeneratedName::new("Nova"),
            GeneratedName::new("NOVA"),
            GeneratedName::new("nová"),
            GeneratedName::new("***"),
            GeneratedName::new("Orbit"),
        ];
        let batch = normalize_batch(&names, "com", 15);
        let domains: Vec<_> = batch.candidates.iter().map(|c| c.domain.as_str()).collect();
        assert_eq!(domains, vec!["nova.com", "orbit.com"]);
        assert_eq!(batch.candidates[0].source_name, "Nova");
        assert_eq!(batch.invalid.len(), 1);
    }
}
