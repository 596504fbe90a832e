//! # fleetrent-indicator: Economic Indicator Lookup
//!
//! Finds the value of an indicator for a date, or for the nearest earlier
//! date inside a bounded window.
//!
//! ## Resolution Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    IndicatorResolver::resolve(target)                   │
//! │                                                                         │
//! │  offset = 0 ──► candidate = target - offset                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  QuoteCache hit? ── yes ──► return quote                                │
//! │       │ no                                                              │
//! │       ▼                                                                 │
//! │  IndicatorSource::fetch(code, candidate)                                │
//! │       │                                                                 │
//! │       ├── Ok(Some(quote)) ──► cache + return          (stop)            │
//! │       ├── Ok(None)        ──► offset += 1, loop       (weekend/holiday) │
//! │       └── Err(e)          ──► return e                (source is down)  │
//! │                                                                         │
//! │  offset == max_lookback_days ──► NotFoundInWindow                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`config`] - `IndicatorConfig` section and its validation
//! - [`source`] - `IndicatorSource` trait and the HTTP implementation
//! - [`cache`] - Bounded per-date quote cache
//! - [`resolver`] - `IndicatorResolver` and the `QuoteProvider` seam

pub mod cache;
pub mod config;
pub mod resolver;
pub mod source;

pub use cache::QuoteCache;
pub use config::{ConfigError, IndicatorConfig};
pub use resolver::{IndicatorResolver, QuoteProvider};
pub use source::{HttpIndicatorSource, IndicatorSource};
