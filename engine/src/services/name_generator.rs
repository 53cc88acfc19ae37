//! Name generator implementations
//!
//! `HttpNameGenerator` talks to a generator sidecar that drives the
//! third-party naming site; `RandomNameGenerator` composes names locally and
//! needs no network, which makes it the default for demos and tests.

use crate::error::{EngineError, EngineResult};
use crate::services::retry::RetryPolicy;
use crate::traits::{GenerationRequest, NameGenerator};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use shared::{process_debug, process_warn, GeneratedName, NameStyle, ProcessId, Randomness};
use std::sync::Mutex;
use std::time::Duration;

/// Wire body sent to the generator sidecar
#[derive(Debug, Serialize)]
struct SidecarRequest<'a> {
    keywords: &'a str,
    description: &'a str,
    style: NameStyle,
    randomness: Randomness,
    blacklist: &'a str,
    max_length: u8,
    tld: &'a str,
    count: u32,
}

#[derive(Debug, Deserialize)]
struct SidecarResponse {
    #[serde(default)]
    names: Vec<GeneratedName>,
}

/// Generator backed by an HTTP sidecar
pub struct HttpNameGenerator {
    client: reqwest::Client,
    endpoint: String,
    retry: RetryPolicy,
}

impl HttpNameGenerator {
    pub fn new(endpoint: impl Into<String>) -> EngineResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| EngineError::internal(format!("HTTP client setup failed: {e}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            retry: RetryPolicy::generation(),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn attempt(&self, request: &GenerationRequest) -> Result<Vec<GeneratedName>, String> {
        let body = SidecarRequest {
            keywords: &request.params.keywords,
            description: &request.params.description,
            style: request.params.style,
            randomness: request.params.randomness,
            blacklist: &request.blacklist,
            max_length: request.max_length,
            tld: &request.tld,
            count: request.count,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(format!("sidecar returned {status}: {}", text.trim()));
        }

        let parsed: SidecarResponse = response
            .json()
            .await
            .map_err(|e| format!("unreadable response: {e}"))?;
        let names: Vec<GeneratedName> = parsed
            .names
            .into_iter()
            .filter(|n| !n.display_name.trim().is_empty())
            .collect();

        if names.is_empty() {
            return Err("generator returned no names".to_string());
        }
        Ok(names)
    }
}

#[async_trait]
impl NameGenerator for HttpNameGenerator {
    async fn generate(&self, request: &GenerationRequest) -> EngineResult<Vec<GeneratedName>> {
        let mut last_error = String::new();

        for attempt in 0..self.retry.attempts() {
            match self.attempt(request).await {
                Ok(names) => {
                    process_debug!(ProcessId::current(), "🧠 Generator returned {} names", names.len());
                    return Ok(names);
                }
                Err(message) => {
                    last_error = message;
                    if attempt < self.retry.max_retries {
                        let delay = self.retry.delay_for(attempt, None);
                        process_warn!(
                            ProcessId::current(),
                            "⏳ Generator error (attempt {}), retrying in {}ms: {}",
                            attempt + 1,
                            delay.as_millis(),
                            last_error
                        );
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        Err(EngineError::Generation {
            attempts: self.retry.attempts(),
            message: last_error,
        })
    }
}

const FRAGMENTS: &[&str] = &[
    "zo", "va", "lu", "ri", "ka", "ne", "tor", "mi", "sol", "qua", "vex", "ly", "ora", "io", "fen",
    "dra", "bel", "xi", "tra", "mo",
];
const EVOCATIVE_SUFFIXES: &[&str] = &["ify", "ly", "ster", "able", "wise", "scape", "era", "hive"];
const PHRASE_PREFIXES: &[&str] = &["get", "try", "my", "go", "hey", "the"];
const PHRASE_SUFFIXES: &[&str] = &["hq", "labs", "hub", "now", "co", "works"];
const FOREIGN_SUFFIXES: &[&str] = &["ia", "ora", "ento", "issimo", "heim", "ura"];
const COMMON_WORDS: &[&str] = &[
    "harbor", "summit", "ember", "maple", "orbit", "signal", "beacon", "meadow", "canyon",
    "lantern", "thistle", "copper", "willow", "falcon", "river", "prism",
];

/// Offline generator composing keyword tokens with syllable fragments
pub struct RandomNameGenerator {
    rng: Mutex<StdRng>,
    premium_rate: f64,
}

impl RandomNameGenerator {
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            premium_rate: 0.04,
        }
    }

    fn fragment_rate(randomness: Randomness) -> f64 {
        match randomness {
            Randomness::Low => 0.2,
            Randomness::Medium => 0.5,
            Randomness::High => 0.8,
        }
    }

    fn pick<'a>(rng: &mut StdRng, items: &[&'a str]) -> &'a str {
        items.choose(rng).copied().unwrap_or("name")
    }

    fn respell(word: &str) -> String {
        let mut spelled = word.replace("ck", "k").replace('c', "k").replace('s', "z");
        if spelled.ends_with("er") {
            spelled.truncate(spelled.len() - 2);
            spelled.push('r');
        }
        spelled
    }

    fn compose(rng: &mut StdRng, style: NameStyle, randomness: Randomness, tokens: &[String]) -> String {
        let use_fragment = tokens.is_empty() || rng.gen_bool(Self::fragment_rate(randomness));
        let token = match tokens.choose(rng) {
            Some(token) if !use_fragment => token.clone(),
            _ => format!("{}{}", Self::pick(rng, FRAGMENTS), Self::pick(rng, FRAGMENTS)),
        };

        let style = match style {
            NameStyle::Auto => *NameStyle::ALL[1..].choose(rng).unwrap_or(&NameStyle::Brandable),
            other => other,
        };

        match style {
            NameStyle::Evocative => format!("{token}{}", Self::pick(rng, EVOCATIVE_SUFFIXES)),
            NameStyle::ShortPhrase => {
                if rng.gen_bool(0.5) {
                    format!("{} {token}", Self::pick(rng, PHRASE_PREFIXES))
                } else {
                    format!("{token} {}", Self::pick(rng, PHRASE_SUFFIXES))
                }
            }
            NameStyle::CompoundWords => {
                let other = match tokens.choose(rng) {
                    Some(other) if *other != token && rng.gen_bool(0.5) => other.clone(),
                    _ => Self::pick(rng, COMMON_WORDS).to_string(),
                };
                format!("{token}{other}")
            }
            NameStyle::AlternateSpelling => Self::respell(&token),
            NameStyle::NonEnglish => format!("{token}{}", Self::pick(rng, FOREIGN_SUFFIXES)),
            NameStyle::RealWords => Self::pick(rng, COMMON_WORDS).to_string(),
            NameStyle::Brandable | NameStyle::Auto => {
                let stem: String = token.chars().take(4).collect();
                format!("{stem}{}", Self::pick(rng, FRAGMENTS))
            }
        }
    }
}

impl Default for RandomNameGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NameGenerator for RandomNameGenerator {
    async fn generate(&self, request: &GenerationRequest) -> EngineResult<Vec<GeneratedName>> {
        let tokens = crate::core::tokens::tokenize(&format!(
            "{} {}",
            request.params.keywords, request.params.description
        ));
        let blocked = crate::core::tokens::tokenize(&request.blacklist);

        let mut rng = self
            .rng
            .lock()
            .map_err(|_| EngineError::internal("random generator state poisoned"))?;

        let mut names = Vec::with_capacity(request.count as usize);
        // bounded so a blacklist matching everything cannot spin forever
        for _ in 0..request.count.saturating_mul(3) {
            if names.len() >= request.count as usize {
                break;
            }
            let display = Self::compose(&mut rng, request.params.style, request.params.randomness, &tokens);
            let lowered = display.to_lowercase();
            if blocked.iter().any(|b| lowered.contains(b.as_str())) {
                continue;
            }
            let premium = rng.gen_bool(self.premium_rate);
            names.push(GeneratedName { display_name: display, premium });
        }

        if names.is_empty() {
            return Err(EngineError::Generation {
                attempts: 1,
                message: "every generated name matched the blacklist".to_string(),
            });
        }
        Ok(names)
    }
}
