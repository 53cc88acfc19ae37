//! Search request and the categorical generation parameters

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ValidationError;

/// Naming style requested from the generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NameStyle {
    #[default]
    Auto,
    Brandable,
    Evocative,
    ShortPhrase,
    CompoundWords,
    AlternateSpelling,
    NonEnglish,
    RealWords,
}

impl NameStyle {
    pub const ALL: [NameStyle; 8] = [
        NameStyle::Auto,
        NameStyle::Brandable,
        NameStyle::Evocative,
        NameStyle::ShortPhrase,
        NameStyle::CompoundWords,
        NameStyle::AlternateSpelling,
        NameStyle::NonEnglish,
        NameStyle::RealWords,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NameStyle::Auto => "auto",
            NameStyle::Brandable => "brandable",
            NameStyle::Evocative => "evocative",
            NameStyle::ShortPhrase => "short_phrase",
            NameStyle::CompoundWords => "compound_words",
            NameStyle::AlternateSpelling => "alternate_spelling",
            NameStyle::NonEnglish => "non_english",
            NameStyle::RealWords => "real_words",
        }
    }
}

/// How far the generator may wander from the keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Randomness {
    Low,
    #[default]
    Medium,
    High,
}

impl Randomness {
    pub const ALL: [Randomness; 3] = [Randomness::Low, Randomness::Medium, Randomness::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Randomness::Low => "low",
            Randomness::Medium => "medium",
            Randomness::High => "high",
        }
    }
}

/// Strength of the keyword mutation applied between loops
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MutationIntensity {
    Low,
    #[default]
    Medium,
    High,
}

impl MutationIntensity {
    pub const ALL: [MutationIntensity; 3] = [
        MutationIntensity::Low,
        MutationIntensity::Medium,
        MutationIntensity::High,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MutationIntensity::Low => "low",
            MutationIntensity::Medium => "medium",
            MutationIntensity::High => "high",
        }
    }

    /// Number of remove/insert operations applied to a token set
    pub fn operations(&self) -> usize {
        match self {
            MutationIntensity::Low => 1,
            MutationIntensity::Medium => 2,
            MutationIntensity::High => 3,
        }
    }
}

macro_rules! impl_str_enum {
    ($ty:ident, $label:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().to_lowercase().replace(['-', ' '], "_");
                $ty::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == wanted)
                    .ok_or_else(|| format!("Unknown {}: {s}", $label))
            }
        }
    };
}

impl_str_enum!(NameStyle, "style");
impl_str_enum!(Randomness, "randomness");
impl_str_enum!(MutationIntensity, "mutation intensity");

pub const MIN_LABEL_CAP: u8 = 5;
pub const MAX_LABEL_CAP: u8 = 25;
pub const MAX_NAMES_LIMIT: u32 = 250;
pub const MAX_LOOP_COUNT: u32 = 25;

/// Immutable input for one discovery job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub keywords: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub style: NameStyle,
    #[serde(default)]
    pub randomness: Randomness,
    #[serde(default)]
    pub blacklist: String,
    #[serde(default = "default_max_length")]
    pub max_length: u8,
    #[serde(default = "default_tld")]
    pub tld: String,
    #[serde(default = "default_max_names")]
    pub max_names: u32,
    pub yearly_budget: f64,
    #[serde(default = "default_loop_count")]
    pub loop_count: u32,
}

fn default_max_length() -> u8 {
    15
}

fn default_tld() -> String {
    "com".to_string()
}

fn default_max_names() -> u32 {
    25
}

fn default_loop_count() -> u32 {
    3
}

impl SearchRequest {
    /// Request with defaults for everything except keywords and budget
    pub fn new(keywords: impl Into<String>, yearly_budget: f64) -> Self {
        Self {
            keywords: keywords.into(),
            description: String::new(),
            style: NameStyle::default(),
            randomness: Randomness::default(),
            blacklist: String::new(),
            max_length: default_max_length(),
            tld: default_tld(),
            max_names: default_max_names(),
            yearly_budget,
            loop_count: default_loop_count(),
        }
    }

    /// Copy with trimmed text fields and a bare lowercase TLD
    pub fn normalized(&self) -> Self {
        let mut copy = self.clone();
        copy.keywords = self.keywords.trim().to_string();
        copy.description = self.description.trim().to_string();
        copy.blacklist = self.blacklist.trim().to_string();
        copy.tld = self.tld.trim().trim_start_matches('.').to_lowercase();
        copy
    }

    /// Validate every field before a job may be created
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.keywords.trim().chars().count() < 2 {
            return Err(ValidationError::invalid("keywords", "must contain at least 2 characters"));
        }
        if !(MIN_LABEL_CAP..=MAX_LABEL_CAP).contains(&self.max_length) {
            return Err(ValidationError::out_of_range(
                "max_length",
                self.max_length,
                MIN_LABEL_CAP,
                MAX_LABEL_CAP,
            ));
        }
        if !(1..=MAX_NAMES_LIMIT).contains(&self.max_names) {
            return Err(ValidationError::out_of_range("max_names", self.max_names, 1, MAX_NAMES_LIMIT));
        }
        if !(1..=MAX_LOOP_COUNT).contains(&self.loop_count) {
            return Err(ValidationError::out_of_range("loop_count", self.loop_count, 1, MAX_LOOP_COUNT));
        }
        if !self.yearly_budget.is_finite() || self.yearly_budget <= 0.0 {
            return Err(ValidationError::invalid("yearly_budget", "must be a positive amount"));
        }

        let tld = self.tld.trim().trim_start_matches('.');
        let tld_ok = (2..=63).contains(&tld.len())
            && tld.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
            && !tld.starts_with('-')
            && !tld.ends_with('-');
        if !tld_ok {
            return Err(ValidationError::invalid("tld", "must be 2-63 letters, digits or hyphens"));
        }

        Ok(())
    }
}
