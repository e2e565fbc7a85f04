//! Response decoding layer.
//!
//! This module defines the [`Decoder`] trait, the normalized [`Trend`] /
//! [`TrendBatch`] types and the [`WireFormat`] switch that picks a decoder
//! from the declared content type.  The two concrete decoders live in
//! sub-modules ([`xml`] and [`json`]).
//!
//! ## For contributors: adding a wire format
//!
//! 1. Create a new file in this directory (e.g. `atom.rs`).
//! 2. Define a unit struct and implement [`Decoder`] for it.
//! 3. Add a [`WireFormat`] variant, teach [`WireFormat::from_content_type`]
//!    to recognize it and return the decoder from [`WireFormat::decoder`].
//!
//! Decoders are pure: they only see the complete body text, never the
//! network, so every format can be tested from a string literal.

mod error;
mod json;
mod trend;
mod xml;

pub use error::DecodeError;
pub use json::JsonDecoder;
pub use trend::{Trend, TrendBatch};
pub use xml::XmlDecoder;

use chrono::{DateTime, NaiveDateTime, Utc};

/// Trait that every wire format decoder implements.
///
/// ```ignore
/// pub struct MyDecoder;
///
/// impl Decoder for MyDecoder {
///     fn decode(&self, body: &str) -> Result<TrendBatch, DecodeError> {
///         // Locate the timestamp and the ranked entries in `body`.
///         todo!()
///     }
/// }
/// ```
pub trait Decoder: Send + Sync {
    /// Build a batch from a complete response body.
    ///
    /// The returned batch has no `remaining_calls`; that value lives in the
    /// response headers and is attached by the caller.
    fn decode(&self, body: &str) -> Result<TrendBatch, DecodeError>;
}

/// Representation requested from, and answered by, the trends endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum WireFormat {
    Xml,
    Json,
}

impl WireFormat {
    /// Pick a format from a `Content-Type` header value.
    pub fn from_content_type(content_type: &str) -> Result<Self, DecodeError> {
        let lowered = content_type.to_ascii_lowercase();
        if lowered.contains("xml") {
            Ok(Self::Xml)
        } else if lowered.contains("json") {
            Ok(Self::Json)
        } else {
            Err(DecodeError::UnsupportedContentType(content_type.to_string()))
        }
    }

    /// File extension appended to the endpoint path.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Xml => "xml",
            Self::Json => "json",
        }
    }

    pub fn decoder(self) -> &'static dyn Decoder {
        match self {
            Self::Xml => &XmlDecoder,
            Self::Json => &JsonDecoder,
        }
    }
}

/// Parse a server timestamp.
///
/// The XML representation uses RFC 2822 dates while the JSON one has used
/// both RFC 3339 and a bare `YYYY-MM-DD HH:MM:SS` form (in UTC).
pub(crate) fn parse_as_of(value: &str) -> Result<DateTime<Utc>, DecodeError> {
    let value = value.trim();

    DateTime::parse_from_rfc2822(value)
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").map(|dt| dt.and_utc())
        })
        .map_err(|_| DecodeError::InvalidTimestamp {
            value: value.to_string(),
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
