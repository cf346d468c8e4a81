//! Signal-Deck - Data Layer
//!
//! This library provides the non-presentation core of the signal-deck
//! dashboard:
//! - Data model for the asset and macro feed payloads
//! - REST feed client for the two read endpoints the dashboard polls
//! - Refresh scheduler: countdown-driven polling with visibility resync
//! - Pure signal derivation (trend score, recency labels, market verdict)

pub mod client;
pub mod error;
pub mod scheduler;
pub mod signal;
pub mod types;

// Re-export commonly used types for convenience
pub use client::{FeedClient, FeedConfig, FeedSource};

pub use error::FeedError;

pub use scheduler::{DashboardState, REFRESH_INTERVAL_SECS, RefreshConfig, RefreshScheduler};

pub use signal::{
    MarketVerdict, ScoreBias, Verdict, format_recency, is_recent, market_verdict, score_bias,
    trend_score,
};

pub use types::{
    AssetRecord, CoinsResponse, LastSignal, MacroBias, MacroRecord, MacrosResponse, SignalKind,
    Trend, TrendSet,
};
