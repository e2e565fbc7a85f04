//! XML trends decoder.
//!
//! The trends endpoint answers with a tiny, fixed document shape:
//!
//! ```text
//! <matching_trends type="array">
//!   <trends as_of="Tue, 01 Jan 2030 00:00:00 +0000" created_at="...">
//!     <trend query="Ursinhos+Carinhosos" url="http://...">Ursinhos Carinhosos</trend>
//!     ...
//!   </trends>
//! </matching_trends>
//! ```
//!
//! Rather than pulling in a full XML parser we extract exactly that shape:
//! the first `as_of` attribute and every `<trend>` element whose content is
//! plain text.  Attributes may appear in any order.  A `<trend>` with nested
//! markup inside it is not matched.

use std::sync::LazyLock;

use regex::Regex;

use super::{parse_as_of, DecodeError, Decoder, Trend, TrendBatch};

static AS_OF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\bas_of\s*=\s*"([^"]*)""#).unwrap());
static TREND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<trend\b([^>]*)>([^<]*)</trend\s*>").unwrap());
static ATTRIBUTE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"([A-Za-z_][\w.:-]*)\s*=\s*"([^"]*)""#).unwrap());

/// Decodes the XML representation of a trends response.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlDecoder;

impl XmlDecoder {
    /// Extract every trend element in document order.
    ///
    /// Entries with an empty name are dropped here so that callers only ever
    /// see valid records.
    pub fn extract_trends(body: &str) -> Vec<Trend> {
        TREND_RE
            .captures_iter(body)
            .filter_map(|captures| {
                let mut trend = Trend::new(&captures[2]);

                for attribute in ATTRIBUTE_RE.captures_iter(&captures[1]) {
                    match attribute[1].to_ascii_lowercase().as_str() {
                        "query" => trend = trend.with_query(&attribute[2]),
                        "url" => trend = trend.with_url(&attribute[2]),
                        _ => {}
                    }
                }

                if trend.is_valid() {
                    Some(trend)
                } else {
                    tracing::warn!(element = &captures[0], "skipping trend without a name");
                    None
                }
            })
            .collect()
    }
}

impl Decoder for XmlDecoder {
    fn decode(&self, body: &str) -> Result<TrendBatch, DecodeError> {
        let as_of = AS_OF_RE
            .captures(body)
            .map(|captures| parse_as_of(&captures[1]))
            .ok_or_else(|| DecodeError::MissingTimestamp {
                content: body.to_string(),
            })??;

        let trends = Self::extract_trends(body);
        if trends.is_empty() {
            return Err(DecodeError::NoTrendsFound {
                content: body.to_string(),
            });
        }

        tracing::debug!(count = trends.len(), %as_of, "decoded XML trends");
        Ok(TrendBatch::new(as_of, trends))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
