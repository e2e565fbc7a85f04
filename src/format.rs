//! Output rendering.
//!
//! All text the tool prints for an accepted batch is produced here.  Each
//! [`OutputFormat`] maps to one render function and every one of them ends
//! its output with exactly one blank line.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::location::Location;
use crate::source::{Trend, TrendBatch};

static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:#([0-9]{1,7})|#[xX]([0-9A-Fa-f]{1,6})|(amp|lt|gt|quot|apos));").unwrap()
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Numbered list followed by location, timestamp and quota
    #[default]
    Normal,
    /// One bare name per line
    Names,
    /// A single JSON document
    Json,
    /// Like normal, plus diagnostics for skipped batches
    Debug,
}

impl OutputFormat {
    /// Whether non-fatal warnings are shown.
    pub fn shows_warnings(self) -> bool {
        matches!(self, Self::Normal | Self::Debug)
    }

    pub fn is_verbose(self) -> bool {
        self == Self::Debug
    }
}

/// Replace character references with the characters they denote.
///
/// Decimal (`&#195;`) and hexadecimal (`&#xC3;`) references are decoded, as
/// are the five predefined XML entities.  References to invalid code points
/// are left as they are.  The text is scanned once, so `&#38;#65;` becomes
/// `&#65;` and not `A`.
pub fn decode_entities(text: &str) -> Cow<'_, str> {
    ENTITY_RE.replace_all(text, |captures: &Captures| {
        let code_point = if let Some(decimal) = captures.get(1) {
            decimal.as_str().parse().ok()
        } else if let Some(hex) = captures.get(2) {
            u32::from_str_radix(hex.as_str(), 16).ok()
        } else {
            None
        };

        match (code_point, captures.get(3).map(|m| m.as_str())) {
            (Some(code_point), _) => char::from_u32(code_point)
                .map(String::from)
                .unwrap_or_else(|| captures[0].to_string()),
            (None, Some("amp")) => "&".to_string(),
            (None, Some("lt")) => "<".to_string(),
            (None, Some("gt")) => ">".to_string(),
            (None, Some("quot")) => "\"".to_string(),
            (None, Some("apos")) => "'".to_string(),
            _ => captures[0].to_string(),
        }
    })
}

/// Render an accepted batch.
pub fn render(batch: &TrendBatch, location: &Location, format: OutputFormat) -> String {
    match format {
        OutputFormat::Normal | OutputFormat::Debug => render_ranking(batch, location),
        OutputFormat::Names => render_names(batch),
        OutputFormat::Json => render_json(batch),
    }
}

fn render_ranking(batch: &TrendBatch, location: &Location) -> String {
    let mut out = String::new();

    for (rank, trend) in batch.trends.iter().enumerate() {
        out.push_str(&format!("{}. {}", rank + 1, decode_entities(&trend.name)));
        if let Some(url) = &trend.url {
            out.push_str(&format!(" - {url}"));
        }
        out.push('\n');
    }

    let remaining = batch
        .remaining_calls
        .map(|n| n.to_string())
        .unwrap_or_else(|| "unknown".into());

    out.push_str(&format!(
        "\nLocation: {}\nTrending Topics as of {}\n({} API calls remaining)\n\n",
        location.display_name(),
        batch.as_of.format("%Y-%m-%d %H:%M:%S UTC"),
        remaining
    ));
    out
}

fn render_names(batch: &TrendBatch) -> String {
    let mut out = String::new();
    for trend in &batch.trends {
        out.push_str(&decode_entities(&trend.name));
        out.push('\n');
    }
    out.push('\n');
    out
}

fn render_json(batch: &TrendBatch) -> String {
    let trends: Vec<Trend> = batch
        .trends
        .iter()
        .map(|trend| Trend {
            name: decode_entities(&trend.name).into_owned(),
            ..trend.clone()
        })
        .collect();

    let document = serde_json::json!({
        "as_of": batch.as_of,
        "trends": trends,
        "remaining_calls": batch.remaining_calls,
    });
    format!("{document:#}\n\n")
}

/// A one-line `== SEVERITY: message (code) ==` notice.
pub fn notice(severity: &str, message: &str, code: &str) -> String {
    format!("== {}: {} ({}) ==\n", severity.to_uppercase(), message, code)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::Value;

    fn sample_batch() -> TrendBatch {
        TrendBatch::new(
            Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap(),
            vec![
                Trend::new("Name&#38;One").with_query("Q1").with_url("U1"),
                Trend::new("NameTwo").with_query("Q2").with_url("U2"),
            ],
        )
        .with_remaining_calls(Some(150))
    }

    // -- decode_entities -----------------------------------------------------

    #[test]
    fn plain_text_is_unchanged() {
        let text = "Ursinhos Carinhosos #rust 100% & more";
        assert_eq!(decode_entities(text), text);
        assert!(matches!(decode_entities(text), Cow::Borrowed(_)));
    }

    #[test]
    fn decimal_references_are_decoded() {
        assert_eq!(decode_entities("&#195;"), "\u{c3}");
        assert_eq!(decode_entities("S&#227;o Paulo"), "São Paulo");
        assert_eq!(decode_entities("Name&#38;One"), "Name&One");
    }

    #[test]
    fn hex_and_named_references_are_decoded() {
        assert_eq!(decode_entities("&#xC3;&#x1F980;"), "\u{c3}\u{1f980}");
        assert_eq!(decode_entities("&lt;a&gt; &amp; &quot;b&quot; &apos;"), "<a> & \"b\" '");
    }

    #[test]
    fn decoding_is_single_pass() {
        assert_eq!(decode_entities("&#38;#65;"), "&#65;");
        assert_eq!(decode_entities("&amp;amp;"), "&amp;");
    }

    #[test]
    fn invalid_code_points_are_kept() {
        assert_eq!(decode_entities("&#55296;"), "&#55296;");
        assert_eq!(decode_entities("&#9999999;"), "&#9999999;");
        assert_eq!(decode_entities("&nbsp;"), "&nbsp;");
    }

    // -- render --------------------------------------------------------------

    #[test]
    fn normal_lists_ranking_then_trailing_block() {
        let out = render(&sample_batch(), &Location::default(), OutputFormat::Normal);

        assert!(out.starts_with("1. Name&One - U1\n2. NameTwo - U2\n"));
        assert!(out.contains("\nLocation: Worldwide\n"));
        assert!(out.contains("Trending Topics as of 2030-01-01 00:00:00 UTC\n"));
        assert!(out.ends_with("(150 API calls remaining)\n\n"));
        assert!(!out.ends_with("\n\n\n"));
    }

    #[test]
    fn normal_omits_missing_url_and_unknown_quota() {
        let batch = TrendBatch::new(
            Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap(),
            vec![Trend::new("NoLink")],
        );
        let out = render(&batch, &Location::new(42), OutputFormat::Normal);

        assert!(out.starts_with("1. NoLink\n"));
        assert!(out.contains("Location: woeid 42\n"));
        assert!(out.contains("(unknown API calls remaining)"));
    }

    #[test]
    fn debug_renders_like_normal() {
        let location = Location::default();
        assert_eq!(
            render(&sample_batch(), &location, OutputFormat::Debug),
            render(&sample_batch(), &location, OutputFormat::Normal)
        );
    }

    #[test]
    fn names_is_one_bare_line_per_trend() {
        let out = render(&sample_batch(), &Location::default(), OutputFormat::Names);
        assert_eq!(out, "Name&One\nNameTwo\n\n");
    }

    #[test]
    fn json_has_expected_keys_and_decoded_names() {
        let out = render(&sample_batch(), &Location::default(), OutputFormat::Json);
        assert!(out.ends_with("}\n\n"));

        let value: Value = serde_json::from_str(&out).unwrap();
        let object = value.as_object().unwrap();

        let mut keys: Vec<_> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["as_of", "remaining_calls", "trends"]);
        assert!(!object.contains_key("body"));

        assert_eq!(object["as_of"], "2030-01-01T00:00:00Z");
        assert_eq!(object["remaining_calls"], 150);
        assert_eq!(object["trends"][0]["name"], "Name&One");
        assert_eq!(object["trends"][0]["query"], "Q1");
        assert_eq!(object["trends"][1]["url"], "U2");
    }

    #[test]
    fn json_keeps_null_quota() {
        let batch = sample_batch().with_remaining_calls(None);
        let out = render(&batch, &Location::default(), OutputFormat::Json);
        let value: Value = serde_json::from_str(&out).unwrap();

        assert_eq!(value.get("remaining_calls"), Some(&Value::Null));
    }

    #[test]
    fn notice_shape() {
        assert_eq!(
            notice("warning", "We are reaching the limit!!", "123"),
            "== WARNING: We are reaching the limit!! (123) ==\n"
        );
    }

    #[test]
    fn only_normal_and_debug_show_warnings() {
        assert!(OutputFormat::Normal.shows_warnings());
        assert!(OutputFormat::Debug.shows_warnings());
        assert!(!OutputFormat::Names.shows_warnings());
        assert!(!OutputFormat::Json.shows_warnings());
        assert!(OutputFormat::Debug.is_verbose());
        assert!(!OutputFormat::Normal.is_verbose());
    }
}
