//! The normalized data types every decoder produces.
//!
//! `Trend` is one entry of the ranking and `TrendBatch` is a whole response:
//! its timestamp, the ranked trends and the quota counter.  Both wire formats
//! are converted into these types so the staleness filter and the formatter
//! never need to know which format the server answered with.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single trending topic.
///
/// `query` and `url` are always present in XML responses but the JSON
/// representation is not required to carry them, so both are optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    /// Display text, possibly containing character references.
    pub name: String,

    /// Search query associated with the topic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,

    /// Link to view the topic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Any other fields of a JSON trend object, kept as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Trend {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            query: None,
            url: None,
            extra: Map::new(),
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// A record is only usable when it has something to display.
    pub fn is_valid(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

/// One decoded response.
///
/// ## Ordering
///
/// `trends` keeps the order the server sent, which is the ranking: the first
/// entry is the most trending one.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendBatch {
    /// Point in time the server considers this data current.
    pub as_of: DateTime<Utc>,

    /// Ranked trends, never empty.
    pub trends: Vec<Trend>,

    /// Remaining API calls reported for the current credential.
    ///
    /// Decoders leave this unset; it comes from the response headers, not
    /// the body.
    pub remaining_calls: Option<u32>,
}

impl TrendBatch {
    pub fn new(as_of: DateTime<Utc>, trends: Vec<Trend>) -> Self {
        Self {
            as_of,
            trends,
            remaining_calls: None,
        }
    }

    pub fn with_remaining_calls(self, remaining_calls: Option<u32>) -> Self {
        Self {
            remaining_calls,
            ..self
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn blank_name_is_invalid() {
        assert!(Trend::new("#rustlang").is_valid());
        assert!(!Trend::new("").is_valid());
        assert!(!Trend::new("   ").is_valid());
    }

    #[test]
    fn deserializes_without_query_or_url() {
        let trend: Trend = serde_json::from_str(r#"{"name": "Copa"}"#).unwrap();

        assert_eq!(trend.name, "Copa");
        assert!(trend.query.is_none());
        assert!(trend.url.is_none());
        assert!(trend.extra.is_empty());
    }

    #[test]
    fn keeps_unknown_fields() {
        let trend: Trend = serde_json::from_str(
            r#"{"name": "Copa", "url": "http://example.com/copa", "promoted_content": null}"#,
        )
        .unwrap();

        assert_eq!(trend.url.as_deref(), Some("http://example.com/copa"));
        assert_eq!(trend.extra.get("promoted_content"), Some(&Value::Null));

        let json = serde_json::to_value(&trend).unwrap();
        assert!(json.get("promoted_content").is_some());
        assert!(json.get("query").is_none(), "absent fields stay absent");
    }

    #[test]
    fn remaining_calls_is_attached_after_construction() {
        let as_of = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let batch = TrendBatch::new(as_of, vec![Trend::new("a")]);
        assert!(batch.remaining_calls.is_none());

        let batch = batch.with_remaining_calls(Some(42));
        assert_eq!(batch.remaining_calls, Some(42));
        assert_eq!(batch.as_of, as_of);
        assert_eq!(batch.trends.len(), 1);
    }
}
