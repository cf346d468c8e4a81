//! Core data types for the dashboard feeds
//!
//! These types match the JSON payloads served by the signal-collector
//! backend at `/api/coins` and `/api/macro`.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Directional trend reported for a single timeframe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    #[display("UPTREND")]
    Uptrend,
    #[display("DOWNTREND")]
    Downtrend,
}

impl Trend {
    /// Check if this is an uptrend
    pub fn is_up(&self) -> bool {
        matches!(self, Trend::Uptrend)
    }
}

/// Per-timeframe trend readings for one asset
///
/// A `None` entry means the feed has supplied no data for that timeframe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct TrendSet {
    /// Weekly trend
    #[serde(rename = "1w", default)]
    pub weekly: Option<Trend>,
    /// Three-day trend
    #[serde(rename = "3d", default)]
    pub three_day: Option<Trend>,
    /// Daily trend
    #[serde(rename = "1d", default)]
    pub daily: Option<Trend>,
}

/// Buy/sell side of an entry or exit signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    #[display("BUY")]
    Buy,
    #[display("SELL")]
    Sell,
}

/// Most recent signal fired for an asset
///
/// The feed always sends this envelope; `kind` stays null until the first
/// signal fires.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
pub struct LastSignal {
    /// Signal side, null if no signal has ever fired
    #[serde(rename = "type", default)]
    pub kind: Option<SignalKind>,
    /// Price at signal time (informational, may be absent)
    #[serde(default)]
    pub price: Option<f64>,
    /// Whole minutes since the signal fired
    #[serde(default)]
    pub minutes_ago: Option<u32>,
}

/// One tracked asset as served by `/api/coins`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AssetRecord {
    /// Stable feed identifier, e.g. "HYPEUSDT.P"
    pub symbol: String,
    /// Human-readable label, e.g. "HYPE"
    pub display_name: String,
    /// Multi-timeframe trend readings
    #[serde(default)]
    pub trends: TrendSet,
    /// Most recent buy/sell signal, if the feed reports one
    #[serde(default)]
    pub last_signal: Option<LastSignal>,
    /// Whole minutes since the asset last changed, null if never updated
    #[serde(default)]
    pub last_updated_minutes_ago: Option<u32>,
}

impl AssetRecord {
    /// The fired signal and its age, if any signal has ever fired
    pub fn active_signal(&self) -> Option<(SignalKind, Option<u32>)> {
        let signal = self.last_signal.as_ref()?;
        Some((signal.kind?, signal.minutes_ago))
    }
}

/// Bull/bear reading of a monthly macro indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum MacroBias {
    #[display("BULLISH")]
    Bullish,
    #[display("BEARISH")]
    Bearish,
}

impl MacroBias {
    /// Check if this reading is bullish
    pub fn is_bullish(&self) -> bool {
        matches!(self, MacroBias::Bullish)
    }
}

/// One macro indicator as served by `/api/macro`
///
/// Both indicator fields are binary; the feed never reports an absent
/// reading for them.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MacroRecord {
    /// Stable feed identifier, e.g. "BTC", "USDT.D", "TOTAL"
    pub symbol: String,
    /// Human-readable label, e.g. "USDT Dominance"
    pub display_name: String,
    /// Monthly trend reading
    pub monthly_trend: MacroBias,
    /// Monthly MACD reading
    pub monthly_macd: MacroBias,
    /// Whole minutes since the indicator last changed, null if never
    #[serde(default)]
    pub last_updated_minutes_ago: Option<u32>,
}

/// Envelope returned by `/api/coins`
///
/// Extra envelope fields (`total_coins`, `timestamp`) are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct CoinsResponse {
    pub coins: Vec<AssetRecord>,
}

/// Envelope returned by `/api/macro`
#[derive(Debug, Clone, Deserialize)]
pub struct MacrosResponse {
    pub macros: Vec<MacroRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_record_de() {
        let payload = r#"{
            "coins": [
                {
                    "symbol": "HYPEUSDT.P",
                    "display_name": "HYPE",
                    "trends": {"1w": "downtrend", "3d": "uptrend", "1d": null},
                    "last_signal": {"type": "sell", "price": 42.1, "time": "2025-01-01T00:00:00Z", "minutes_ago": 5},
                    "last_updated": "2025-01-01T00:03:00Z",
                    "last_updated_minutes_ago": 2
                }
            ],
            "total_coins": 1,
            "timestamp": "2025-01-01T00:05:00Z"
        }"#;

        let response: CoinsResponse = serde_json::from_str(payload).unwrap();
        assert_eq!(response.coins.len(), 1);

        let coin = &response.coins[0];
        assert_eq!(coin.symbol, "HYPEUSDT.P");
        assert_eq!(coin.display_name, "HYPE");
        assert_eq!(coin.trends.weekly, Some(Trend::Downtrend));
        assert_eq!(coin.trends.three_day, Some(Trend::Uptrend));
        assert_eq!(coin.trends.daily, None);
        assert_eq!(coin.active_signal(), Some((SignalKind::Sell, Some(5))));
        assert_eq!(coin.last_updated_minutes_ago, Some(2));
    }

    #[test]
    fn test_asset_record_de_never_signalled() {
        let payload = r#"{
            "symbol": "PEPEUSDT.P",
            "display_name": "PEPE",
            "trends": {},
            "last_signal": {"type": null, "price": null, "minutes_ago": null},
            "last_updated_minutes_ago": null
        }"#;

        let coin: AssetRecord = serde_json::from_str(payload).unwrap();
        assert_eq!(coin.trends, TrendSet::default());
        assert!(coin.active_signal().is_none());
        assert_eq!(coin.last_updated_minutes_ago, None);
    }

    #[test]
    fn test_macro_record_de() {
        let payload = r#"{
            "macros": [
                {
                    "symbol": "USDT.D",
                    "display_name": "USDT Dominance",
                    "monthly_trend": "bullish",
                    "monthly_macd": "bearish",
                    "last_updated_minutes_ago": 0
                }
            ]
        }"#;

        let response: MacrosResponse = serde_json::from_str(payload).unwrap();
        let record = &response.macros[0];
        assert_eq!(record.symbol, "USDT.D");
        assert!(record.monthly_trend.is_bullish());
        assert!(!record.monthly_macd.is_bullish());
        assert_eq!(record.last_updated_minutes_ago, Some(0));
    }

    #[test]
    fn test_display_labels() {
        assert_eq!(Trend::Uptrend.to_string(), "UPTREND");
        assert_eq!(SignalKind::Sell.to_string(), "SELL");
        assert_eq!(MacroBias::Bearish.to_string(), "BEARISH");
    }
}
