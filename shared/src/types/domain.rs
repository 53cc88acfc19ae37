//! Domain candidates, availability answers and ranked results

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A raw name as returned by the name generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedName {
    pub display_name: String,
    #[serde(default)]
    pub premium: bool,
}

impl GeneratedName {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            premium: false,
        }
    }

    pub fn premium(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            premium: true,
        }
    }
}

/// A normalized `label.tld` pair ready for an availability check
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DomainCandidate {
    pub domain: String,
    pub label: String,
    pub tld: String,
    pub source_name: String,
    pub premium: bool,
}

/// Why a generated name could not become a candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InvalidReason {
    Unnormalizable,
    ExceedsDnsLimit { length: usize },
    TooLong { length: usize, max: usize },
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidReason::Unnormalizable => write!(f, "no usable characters after normalization"),
            InvalidReason::ExceedsDnsLimit { length } => {
                write!(f, "label is {length} characters, DNS allows 63")
            }
            InvalidReason::TooLong { length, max } => {
                write!(f, "label is {length} characters, cap is {max}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidCandidate {
    pub source_name: String,
    pub reason: InvalidReason,
}

/// One domain's answer from the availability provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawAvailabilityResult {
    pub domain: String,
    pub available: bool,
    pub definitive: bool,
    pub price_micros: Option<u64>,
    pub currency: Option<String>,
    pub period: Option<u32>,
    pub reason: Option<String>,
}

impl RawAvailabilityResult {
    pub fn available(domain: impl Into<String>, price_micros: u64) -> Self {
        Self {
            domain: domain.into(),
            available: true,
            definitive: true,
            price_micros: Some(price_micros),
            currency: Some("USD".to_string()),
            period: Some(1),
            reason: None,
        }
    }

    /// Record for a domain that is taken or could not be checked
    pub fn unavailable(domain: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            available: false,
            definitive: false,
            price_micros: None,
            currency: None,
            period: None,
            reason: Some(reason.into()),
        }
    }

    /// Price in major currency units
    pub fn price(&self) -> Option<f64> {
        self.price_micros.map(|micros| micros as f64 / 1_000_000.0)
    }
}

/// One signed contribution to a candidate's score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueDriver {
    pub component: String,
    pub impact: f64,
    pub detail: String,
}

/// A scored candidate, the unit of the leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedDomainResult {
    pub domain: String,
    pub source_name: String,
    pub premium: bool,
    pub available: bool,
    pub definitive: bool,
    pub price_micros: Option<u64>,
    pub currency: Option<String>,
    pub period: Option<u32>,
    pub reason: Option<String>,
    pub price: Option<f64>,
    pub over_budget: bool,
    pub marketability_score: f64,
    pub financial_value_score: f64,
    pub overall_score: f64,
    pub syllables: u32,
    pub label_length: u32,
    pub value_drivers: Vec<ValueDriver>,
    pub value_detractors: Vec<ValueDriver>,
    pub first_seen_loop: u32,
    pub last_seen_loop: u32,
    pub times_discovered: u32,
}

impl RankedDomainResult {
    /// Available and affordable, the only results worth showing
    pub fn is_actionable(&self) -> bool {
        self.available && !self.over_budget
    }
}

/// Leaderboard ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    #[default]
    Overall,
    Marketability,
    FinancialValue,
    Alphabetical,
    Syllables,
    Length,
}

impl SortMode {
    pub const ALL: [SortMode; 6] = [
        SortMode::Overall,
        SortMode::Marketability,
        SortMode::FinancialValue,
        SortMode::Alphabetical,
        SortMode::Syllables,
        SortMode::Length,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Overall => "overall",
            SortMode::Marketability => "marketability",
            SortMode::FinancialValue => "financial_value",
            SortMode::Alphabetical => "alphabetical",
            SortMode::Syllables => "syllables",
            SortMode::Length => "length",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        SortMode::ALL
            .iter()
            .copied()
            .find(|mode| mode.as_str() == wanted)
            .ok_or_else(|| format!("Unknown sort mode: {s}"))
    }
}

/// Filtering and ordering applied when reading the leaderboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardQuery {
    #[serde(default)]
    pub sort: SortMode,
    pub limit: Option<usize>,
    pub min_score: Option<f64>,
    pub max_price: Option<f64>,
}
