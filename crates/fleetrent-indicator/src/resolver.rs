//! # Indicator Resolver
//!
//! Backward date scan over an [`IndicatorSource`].
//!
//! ```text
//!   target = Mon 2025-01-06, no value published on the weekend
//!
//!   attempt 1   Mon 06   → Ok(None)          step back
//!   attempt 2   Sun 05   → Ok(None)          step back
//!   attempt 3   Sat 04   → Ok(None)          step back
//!   attempt 4   Fri 03   → Ok(Some(quote))   return, quote.date() = 03
//! ```
//!
//! The scan only ever moves backward and stops at the first date with data.
//! Transport, server and payload errors end the scan immediately: they say
//! the source is broken, not that the date lacks data.

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use tracing::{debug, info, warn};

use fleetrent_core::validation::parse_date;
use fleetrent_core::{IndicatorError, IndicatorQuote, IndicatorResult, MAX_LOOKBACK_DAYS};

use crate::cache::QuoteCache;
use crate::config::{ConfigError, IndicatorConfig};
use crate::source::{HttpIndicatorSource, IndicatorSource};

// =============================================================================
// Quote Provider
// =============================================================================

/// Anything that can turn a date into a quote. The lifecycle manager
/// depends on this, not on the HTTP resolver.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    async fn resolve(&self, target: NaiveDate) -> IndicatorResult<IndicatorQuote>;
}

// =============================================================================
// Resolver
// =============================================================================

/// Resolves the indicator value for a date or the nearest earlier date.
#[derive(Debug)]
pub struct IndicatorResolver<S> {
    source: S,
    code: String,
    max_lookback_days: u32,
    cache: Option<QuoteCache>,
}

impl IndicatorResolver<HttpIndicatorSource> {
    /// Builds the HTTP-backed resolver described by the config section.
    pub fn from_config(config: &IndicatorConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let source = HttpIndicatorSource::from_config(config)?;
        let mut resolver = Self::new(source, config.code.clone(), config.max_lookback_days);
        if config.cache_enabled {
            resolver = resolver.with_cache(QuoteCache::new(config.cache_capacity));
        }
        Ok(resolver)
    }
}

impl<S: IndicatorSource> IndicatorResolver<S> {
    pub fn new(source: S, code: impl Into<String>, max_lookback_days: u32) -> Self {
        Self {
            source,
            code: code.into(),
            max_lookback_days,
            cache: None,
        }
    }

    /// Resolver with the default window.
    pub fn with_default_window(source: S, code: impl Into<String>) -> Self {
        Self::new(source, code, MAX_LOOKBACK_DAYS)
    }

    pub fn with_cache(mut self, cache: QuoteCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn max_lookback_days(&self) -> u32 {
        self.max_lookback_days
    }

    /// Parses `input` and resolves it. A malformed date is rejected with
    /// `InvalidDate` before any lookup.
    pub async fn resolve_str(&self, input: &str) -> IndicatorResult<IndicatorQuote> {
        let target = parse_date("date", input).map_err(|e| IndicatorError::InvalidDate {
            input: input.to_string(),
            reason: e.to_string(),
        })?;
        self.resolve(target).await
    }

    /// Scans `target, target - 1, ...` for at most `max_lookback_days` dates.
    pub async fn resolve(&self, target: NaiveDate) -> IndicatorResult<IndicatorQuote> {
        for offset in 0..self.max_lookback_days {
            let Some(candidate) = target.checked_sub_days(Days::new(u64::from(offset))) else {
                break;
            };

            if let Some(quote) = self.cache.as_ref().and_then(|c| c.get(&self.code, candidate)) {
                debug!(%candidate, quote_date = %quote.date(), "Indicator cache hit");
                return Ok(quote);
            }

            debug!(attempt = offset + 1, %candidate, code = %self.code, "Looking up indicator");

            match self.source.fetch(&self.code, candidate).await? {
                Some(quote) => {
                    info!(
                        %target,
                        quote_date = %quote.date(),
                        value = %quote.value(),
                        "Indicator resolved"
                    );
                    if let Some(cache) = &self.cache {
                        cache.insert(&self.code, candidate, quote.clone());
                    }
                    return Ok(quote);
                }
                None => {
                    warn!(%candidate, "No indicator value published, stepping back one day");
                }
            }
        }

        Err(IndicatorError::NotFoundInWindow {
            target,
            lookback_days: self.max_lookback_days,
        })
    }
}

#[async_trait]
impl<S: IndicatorSource> QuoteProvider for IndicatorResolver<S> {
    async fn resolve(&self, target: NaiveDate) -> IndicatorResult<IndicatorQuote> {
        IndicatorResolver::<S>::resolve(self, target).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
