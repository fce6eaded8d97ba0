// src/domain/analysis.rs
// Pre-trade and post-trade analysis payloads and their persisted blob codec.
//
// Analysis blobs are advisory journaling data: a blob that fails to parse
// must never block a trade operation, so `decode` degrades to the empty
// record instead of returning an error. Unknown keys are ignored and
// missing keys default, which keeps the codec compatible with blobs
// persisted before newer fields existed.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DailyTrend {
    Uptrend,
    Downtrend,
    Sideways,
}

impl fmt::Display for DailyTrend {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DailyTrend::Uptrend => write!(f, "uptrend"),
            DailyTrend::Downtrend => write!(f, "downtrend"),
            DailyTrend::Sideways => write!(f, "sideways"),
        }
    }
}

/// Volume windows as labeled by the journal UI; the serialized forms match
/// blobs already persisted by the surrounding system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolumeTime {
    #[serde(rename = "London session")]
    LondonSession,
    #[serde(rename = "NY session")]
    NySession,
    #[serde(rename = "Asian session")]
    AsianSession,
    #[serde(rename = "London/NY overlap")]
    LondonNyOverlap,
}

/// Trader's documented rationale captured before entry. Set once at trade
/// creation; immutable afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_trend: Option<DailyTrend>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_time: Option<VolumeTime>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clean_range: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_session_volume: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub htf_setup: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ltf_confirmation: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Trader's outcome review captured at close.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Self-assessed execution quality, 1-5.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotions: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lessons_learned: Option<String>,
}

// Both payloads share the same blob codec; deduplicated behind a macro-free
// helper to keep the tolerant-decode contract in one place.
fn decode_blob<T: Default + for<'de> Deserialize<'de>>(raw: Option<&str>) -> T {
    let raw = match raw {
        Some(s) if !s.trim().is_empty() => s,
        _ => return T::default(),
    };

    match serde_json::from_str(raw) {
        Ok(payload) => payload,
        Err(e) => {
            log::debug!("Ignoring malformed analysis blob: {}", e);
            T::default()
        }
    }
}

fn encode_blob<T: Serialize>(payload: &T) -> String {
    // Serializing a plain struct of optional scalars cannot fail.
    serde_json::to_string(payload).unwrap_or_default()
}

impl PreAnalysis {
    /// Parses a persisted blob. Missing or malformed input yields the empty
    /// record; decode failures are never surfaced to callers.
    pub fn decode(raw: Option<&str>) -> Self {
        decode_blob(raw)
    }

    pub fn encode(&self) -> String {
        encode_blob(self)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl PostAnalysis {
    pub fn decode(raw: Option<&str>) -> Self {
        decode_blob(raw)
    }

    pub fn encode(&self) -> String {
        encode_blob(self)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
