//! Domain availability provider implementations
//!
//! `HttpAvailabilityProvider` speaks a bulk availability JSON API with
//! `sso-key` authorization. `SimulatedAvailabilityProvider` answers from a
//! stable hash of the domain so offline runs are repeatable.

use crate::error::{EngineError, EngineResult};
use crate::services::rate_limiter::chunk_domains;
use crate::services::retry::RetryPolicy;
use crate::traits::AvailabilityProvider;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use shared::{process_debug, process_warn, ProcessId, RawAvailabilityResult};
use std::collections::HashMap;
use std::time::Duration;

/// Largest domain list the bulk endpoint accepts
pub const PROVIDER_CHUNK_SIZE: usize = 500;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BulkResponse {
    #[serde(default)]
    domains: Vec<DomainAnswer>,
    #[serde(default)]
    errors: Vec<DomainFailure>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DomainAnswer {
    domain: String,
    available: bool,
    #[serde(default)]
    definitive: bool,
    price: Option<u64>,
    currency: Option<String>,
    period: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DomainFailure {
    domain: Option<String>,
    code: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RateLimitBody {
    retry_after_sec: Option<u64>,
}

/// Outcome of one HTTP attempt that the retry loop must act on
enum AttemptError {
    RateLimited(Option<Duration>),
    Fatal(EngineError),
}

/// Bulk availability over HTTP
pub struct HttpAvailabilityProvider {
    client: reqwest::Client,
    base_url: String,
    authorization: String,
    chunk_size: usize,
    retry: RetryPolicy,
}

impl HttpAvailabilityProvider {
    pub fn new(base_url: impl Into<String>, api_key: &str, api_secret: &str) -> EngineResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| EngineError::internal(format!("HTTP client setup failed: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            authorization: format!("sso-key {api_key}:{api_secret}"),
            chunk_size: PROVIDER_CHUNK_SIZE,
            retry: RetryPolicy::availability(),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.clamp(1, PROVIDER_CHUNK_SIZE);
        self
    }

    fn retry_hint(headers: &reqwest::header::HeaderMap, body: &str) -> Option<Duration> {
        let from_header = headers
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let from_body = || {
            serde_json::from_str::<RateLimitBody>(body)
                .ok()
                .and_then(|b| b.retry_after_sec)
        };
        from_header.or_else(from_body).map(Duration::from_secs)
    }

    async fn attempt(&self, chunk: &[String]) -> Result<BulkResponse, AttemptError> {
        let url = format!("{}/v1/domains/available?checkType=FAST", self.base_url);
        let response = self
            .client
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, &self.authorization)
            .json(chunk)
            .send()
            .await
            .map_err(|e| {
                AttemptError::Fatal(EngineError::AvailabilityApi {
                    status: None,
                    message: format!("request failed: {e}"),
                })
            })?;

        let status = response.status();
        if status.is_success() {
            return response.json::<BulkResponse>().await.map_err(|e| {
                AttemptError::Fatal(EngineError::AvailabilityApi {
                    status: Some(status.as_u16()),
                    message: format!("unreadable response: {e}"),
                })
            });
        }

        let headers = response.headers().clone();
        let body = response.text().await.unwrap_or_default();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(AttemptError::Fatal(EngineError::AvailabilityAuth {
                    message: format!("{status}: {}", body.trim()),
                }))
            }
            StatusCode::TOO_MANY_REQUESTS => Err(AttemptError::RateLimited(Self::retry_hint(&headers, &body))),
            _ => Err(AttemptError::Fatal(EngineError::AvailabilityApi {
                status: Some(status.as_u16()),
                message: body.trim().to_string(),
            })),
        }
    }

    async fn check_chunk(&self, chunk: &[String]) -> EngineResult<BulkResponse> {
        let mut last_hint = None;
        for attempt in 0..self.retry.attempts() {
            match self.attempt(chunk).await {
                Ok(response) => return Ok(response),
                Err(AttemptError::Fatal(error)) => return Err(error),
                Err(AttemptError::RateLimited(hint)) => {
                    last_hint = hint;
                    if attempt < self.retry.max_retries {
                        let delay = self.retry.delay_for(attempt, hint);
                        process_warn!(
                            ProcessId::current(),
                            "⏳ Availability rate limited (attempt {}), retrying in {}ms",
                            attempt + 1,
                            delay.as_millis()
                        );
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        Err(EngineError::AvailabilityRateLimited {
            attempts: self.retry.attempts(),
            retry_after: last_hint,
        })
    }
}

#[async_trait]
impl AvailabilityProvider for HttpAvailabilityProvider {
    async fn check_bulk(&self, domains: &[String]) -> EngineResult<HashMap<String, RawAvailabilityResult>> {
        let mut results = HashMap::with_capacity(domains.len());

        for chunk in chunk_domains(domains, self.chunk_size) {
            let response = self.check_chunk(&chunk).await?;

            for answer in response.domains {
                let domain = answer.domain.to_lowercase();
                results.insert(
                    domain.clone(),
                    RawAvailabilityResult {
                        domain,
                        available: answer.available,
                        definitive: answer.definitive,
                        price_micros: answer.price,
                        currency: answer.currency,
                        period: answer.period,
                        reason: None,
                    },
                );
            }

            for failure in response.errors {
                let Some(domain) = failure.domain.map(|d| d.to_lowercase()) else {
                    continue;
                };
                let reason = match (failure.code, failure.message) {
                    (Some(code), Some(message)) => format!("{code}: {message}"),
                    (Some(text), None) | (None, Some(text)) => text,
                    (None, None) => "provider error".to_string(),
                };
                results.insert(domain.clone(), RawAvailabilityResult::unavailable(domain, reason));
            }
        }

        process_debug!(
            ProcessId::current(),
            "🌐 Availability answered {} of {} domains",
            results.len(),
            domains.len()
        );
        Ok(results)
    }
}

/// Stable 64-bit FNV-1a hash
fn fnv1a(text: &str) -> u64 {
    text.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ byte as u64).wrapping_mul(0x0000_0100_0000_01b3)
    })
}

/// Deterministic offline availability and pricing
#[derive(Debug, Clone)]
pub struct SimulatedAvailabilityProvider {
    /// Percentage of domains reported available
    pub available_percent: u64,
    pub min_price_micros: u64,
    pub max_price_micros: u64,
}

impl Default for SimulatedAvailabilityProvider {
    fn default() -> Self {
        Self {
            available_percent: 60,
            min_price_micros: 8_990_000,
            max_price_micros: 59_990_000,
        }
    }
}

impl SimulatedAvailabilityProvider {
    pub fn answer(&self, domain: &str) -> RawAvailabilityResult {
        let domain = domain.to_lowercase();
        let hash = fnv1a(&domain);

        if hash % 100 >= self.available_percent {
            return RawAvailabilityResult {
                definitive: true,
                ..RawAvailabilityResult::unavailable(domain, "registered")
            };
        }

        let span = self.max_price_micros.saturating_sub(self.min_price_micros).max(1);
        let price = self.min_price_micros + (hash >> 8) % span;
        // short labels are priced like aftermarket names
        let label_len = domain.split('.').next().map_or(0, str::len);
        let price = if label_len <= 4 { price * 12 } else { price };

        RawAvailabilityResult {
            definitive: (hash >> 20) % 10 != 0,
            ..RawAvailabilityResult::available(domain, price)
        }
    }
}

#[async_trait]
impl AvailabilityProvider for SimulatedAvailabilityProvider {
    async fn check_bulk(&self, domains: &[String]) -> EngineResult<HashMap<String, RawAvailabilityResult>> {
        Ok(domains
            .iter()
            .map(|domain| {
                let result = self.answer(domain);
                (result.domain.clone(), result)
            })
            .collect())
    }
}
