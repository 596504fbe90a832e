//! # Quote Cache
//!
//! Bounded in-memory cache of resolved quotes keyed by `(code, date)`.
//!
//! Only found quotes are stored. A "no data" answer is never cached because
//! the value for today may be published later in the day. Eviction is left
//! to moka once `capacity` entries are held.

use chrono::NaiveDate;
use moka::sync::Cache;

use fleetrent_core::IndicatorQuote;

type CacheKey = (String, NaiveDate);

/// Thread-safe bounded quote cache.
#[derive(Clone)]
pub struct QuoteCache {
    // None when capacity is 0
    inner: Option<Cache<CacheKey, IndicatorQuote>>,
}

impl std::fmt::Debug for QuoteCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuoteCache")
            .field("enabled", &self.inner.is_some())
            .finish()
    }
}

impl QuoteCache {
    pub fn new(capacity: usize) -> Self {
        let inner = (capacity > 0).then(|| {
            Cache::builder()
                .max_capacity(capacity as u64)
                .build()
        });
        Self { inner }
    }

    /// Cached quote requested for `date`, if any.
    pub fn get(&self, code: &str, date: NaiveDate) -> Option<IndicatorQuote> {
        self.inner.as_ref()?.get(&(code.to_string(), date))
    }

    /// Stores the quote found when `date` was requested.
    pub fn insert(&self, code: &str, date: NaiveDate, quote: IndicatorQuote) {
        if let Some(cache) = &self.inner {
            cache.insert((code.to_string(), date), quote);
        }
    }
}
