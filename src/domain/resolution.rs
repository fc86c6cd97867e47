//! Tariff-rate resolution: explicit rate, else live lookup, else reference
//! table, else zero default.
//!
//! The resolver owns an explicit per-process cache of successful lookups,
//! keyed by HTS code. Only successes are cached; a failed lookup is final for
//! that row but re-attempted the next time the same code comes up.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

use super::entities::{RateSource, ReferenceTable, ResolvedRate};

/// Why a live lookup produced no usable rate.
///
/// Every variant is recovered inside [`RateResolver::resolve`]; none of them
/// reach the caller. The point of the enum is to keep "the rate is 0%"
/// (an `Ok`) distinct from "the lookup failed" (an `Err`).
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("lookup service returned status {0}")]
    Status(u16),
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
    #[error("no duty measure in response")]
    NoDutyMeasure,
    #[error("unparseable duty rate {0:?}")]
    UnparseableRate(String),
}

/// The external rate-lookup collaborator, reduced to the one operation the
/// resolver needs. Transport details live behind this seam.
#[async_trait]
pub trait TariffLookup {
    async fn rate_for(&self, code: &str) -> Result<f64, LookupError>;
}

pub struct RateResolver<L> {
    lookup: L,
    reference: ReferenceTable,
    /// Successful live lookups, unbounded for the process lifetime. The key
    /// space is bounded by the distinct codes seen in a batch.
    cache: Mutex<HashMap<String, f64>>,
}

impl<L: TariffLookup> RateResolver<L> {
    pub fn new(lookup: L, reference: ReferenceTable) -> Self {
        Self {
            lookup,
            reference,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve the applicable rate for one row.
    ///
    /// An explicit finite rate short-circuits everything. Otherwise the
    /// precedence is cached/live lookup, then reference table (exact code,
    /// case-insensitive country), then a zero default. Never errors: every
    /// call produces a rate.
    pub async fn resolve(
        &self,
        code: &str,
        country: &str,
        explicit: Option<f64>,
    ) -> ResolvedRate {
        if let Some(rate) = explicit.filter(|value| value.is_finite()) {
            return ResolvedRate {
                rate_percent: rate,
                source: RateSource::Explicit,
            };
        }

        if let Some(rate) = self.cached_rate(code).await {
            return ResolvedRate {
                rate_percent: rate,
                source: RateSource::LiveLookup,
            };
        }

        match self.lookup.rate_for(code).await {
            Ok(rate) => {
                self.cache.lock().await.insert(code.to_string(), rate);
                return ResolvedRate {
                    rate_percent: rate,
                    source: RateSource::LiveLookup,
                };
            }
            Err(error) => {
                debug!(code, %error, "live lookup failed; falling back");
            }
        }

        if let Some(rate) = self.reference.rate_for(code, country) {
            return ResolvedRate {
                rate_percent: rate,
                source: RateSource::ReferenceTable,
            };
        }

        ResolvedRate {
            rate_percent: 0.0,
            source: RateSource::Default,
        }
    }

    async fn cached_rate(&self, code: &str) -> Option<f64> {
        self.cache.lock().await.get(code).copied()
    }
}
