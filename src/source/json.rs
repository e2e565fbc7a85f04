//! JSON trends decoder.
//!
//! The JSON representation is a one-element array:
//!
//! ```text
//! [{"as_of": "2030-01-01T00:00:00Z", "locations": [...], "trends": [{"name": ..., "url": ...}, ...]}]
//! ```
//!
//! Trend objects are deserialized as-is into [`Trend`]; `query` and `url` are
//! optional and unknown fields are preserved.

use serde_json::Value;

use super::{parse_as_of, DecodeError, Decoder, Trend, TrendBatch};

/// Decodes the JSON representation of a trends response.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDecoder;

impl Decoder for JsonDecoder {
    fn decode(&self, body: &str) -> Result<TrendBatch, DecodeError> {
        let malformed = |source: Option<serde_json::Error>| DecodeError::MalformedPayload {
            content: body.to_string(),
            source,
        };

        let value: Value = serde_json::from_str(body).map_err(|e| malformed(Some(e)))?;
        let result = value
            .as_array()
            .and_then(|items| items.first())
            .ok_or_else(|| malformed(None))?;

        let as_of = result
            .get("as_of")
            .and_then(Value::as_str)
            .ok_or_else(|| DecodeError::MissingTimestamp {
                content: result.to_string(),
            })?;
        let as_of = parse_as_of(as_of)?;

        let entries = result
            .get("trends")
            .and_then(Value::as_array)
            .ok_or_else(|| DecodeError::MissingTrendsList {
                content: result.to_string(),
            })?;
        if entries.is_empty() {
            return Err(DecodeError::EmptyTrendsList {
                content: result.to_string(),
            });
        }

        let mut trends = Vec::with_capacity(entries.len());
        for entry in entries {
            let trend: Trend =
                serde_json::from_value(entry.clone()).map_err(|e| malformed(Some(e)))?;
            if trend.is_valid() {
                trends.push(trend);
            } else {
                tracing::warn!(%entry, "skipping trend without a name");
            }
        }
        if trends.is_empty() {
            return Err(DecodeError::EmptyTrendsList {
                content: result.to_string(),
            });
        }

        tracing::debug!(count = trends.len(), %as_of, "decoded JSON trends");
        Ok(TrendBatch::new(as_of, trends))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn decode_preserves_order_and_count() {
        let body = r##"[{
            "as_of": "2030-01-01T00:00:00Z",
            "locations": [{"name": "Worldwide", "woeid": 1}],
            "trends": [
                {"name": "#first", "url": "http://example.com/1", "query": "%23first"},
                {"name": "Second"},
                {"name": "Third", "promoted_content": null}
            ]
        }]"##;
        let batch = JsonDecoder.decode(body).unwrap();

        assert_eq!(batch.as_of, Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap());
        let names: Vec<_> = batch.trends.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["#first", "Second", "Third"]);

        assert_eq!(batch.trends[0].query.as_deref(), Some("%23first"));
        assert!(batch.trends[1].url.is_none());
        assert!(batch.trends[2].extra.contains_key("promoted_content"));
    }

    #[test]
    fn legacy_timestamp_format_is_accepted() {
        let body = r#"[{"as_of": "2010-08-23 18:43:36", "trends": [{"name": "x"}]}]"#;
        let batch = JsonDecoder.decode(body).unwrap();
        assert_eq!(batch.as_of, Utc.with_ymd_and_hms(2010, 8, 23, 18, 43, 36).unwrap());
    }

    #[test]
    fn invalid_json_is_malformed() {
        let err = JsonDecoder.decode("[{not json").unwrap_err();
        assert!(matches!(err, DecodeError::MalformedPayload { source: Some(_), .. }));
        assert_eq!(err.content(), Some("[{not json"));
    }

    #[test]
    fn empty_or_non_array_top_level_is_malformed() {
        assert!(matches!(
            JsonDecoder.decode("[]"),
            Err(DecodeError::MalformedPayload { source: None, .. })
        ));
        assert!(matches!(
            JsonDecoder.decode(r#"{"as_of": "2030-01-01T00:00:00Z"}"#),
            Err(DecodeError::MalformedPayload { .. })
        ));
    }

    #[test]
    fn missing_timestamp_fails() {
        let body = r#"[{"trends": [{"name": "x"}]}]"#;
        assert!(matches!(
            JsonDecoder.decode(body),
            Err(DecodeError::MissingTimestamp { .. })
        ));
    }

    #[test]
    fn missing_trends_list_fails() {
        let body = r#"[{"as_of": "2030-01-01T00:00:00Z"}]"#;
        assert!(matches!(
            JsonDecoder.decode(body),
            Err(DecodeError::MissingTrendsList { .. })
        ));
    }

    #[test]
    fn empty_trends_list_fails() {
        let body = r#"[{"as_of": "2030-01-01T00:00:00Z", "trends": []}]"#;
        assert!(matches!(
            JsonDecoder.decode(body),
            Err(DecodeError::EmptyTrendsList { .. })
        ));
    }

    #[test]
    fn trend_without_name_is_malformed() {
        let body = r#"[{"as_of": "2030-01-01T00:00:00Z", "trends": [{"url": "u"}]}]"#;
        assert!(matches!(
            JsonDecoder.decode(body),
            Err(DecodeError::MalformedPayload { .. })
        ));
    }

    #[test]
    fn blank_names_are_skipped() {
        let body = r#"[{"as_of": "2030-01-01T00:00:00Z", "trends": [{"name": ""}, {"name": "ok"}]}]"#;
        let batch = JsonDecoder.decode(body).unwrap();
        assert_eq!(batch.trends.len(), 1);
        assert_eq!(batch.trends[0].name, "ok");

        let body = r#"[{"as_of": "2030-01-01T00:00:00Z", "trends": [{"name": " "}]}]"#;
        assert!(matches!(
            JsonDecoder.decode(body),
            Err(DecodeError::EmptyTrendsList { .. })
        ));
    }
}
