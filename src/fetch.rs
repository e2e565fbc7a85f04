//! Fetch orchestration.
//!
//! One cycle is: request the trends for a location, check the response
//! status, pick a decoder from the content type, run the staleness filter
//! against the caller's [`LastKnown`] state and render the accepted batch.
//!
//! ## For contributors
//!
//! The network part ([`TrendsClient::fetch`]) and the decision part
//! ([`process`]) are split so that everything after the status check can be
//! exercised from a hand-built [`RawResponse`].  There is no retry: any
//! failure ends the cycle.

use std::fmt::Write as _;

use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::StatusCode;
use thiserror::Error;

use crate::config::Config;
use crate::format::{self, notice, OutputFormat};
use crate::location::Location;
use crate::source::{DecodeError, WireFormat};
use crate::staleness::{self, LastKnown, Verdict};

/// Response header carrying the remaining quota.
pub const REMAINING_CALLS_HEADER: &str = "x-ratelimit-remaining";

const REQUEST_FAILED_CODE: &str = "8309740116819739";
const TRANSPORT_CODE: &str = "1287364450912873";
const LOW_QUOTA_CODE: &str = "7925415213685483";
const STALE_CODE: &str = "3963864736724645";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request failed with status {status}")]
    RequestFailed {
        status: StatusCode,
        headers: HeaderMap,
    },
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("HTTP transport error")]
    Transport(#[from] reqwest::Error),
}

impl FetchError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::RequestFailed { .. } => REQUEST_FAILED_CODE,
            Self::Decode(error) => error.code(),
            Self::Transport(_) => TRANSPORT_CODE,
        }
    }

    /// The text printed before exiting with a failure status.
    ///
    /// Request failures echo the status and headers; content errors echo the
    /// content that could not be decoded.
    pub fn report(&self) -> String {
        let mut out = String::new();

        match self {
            Self::RequestFailed { status, headers } => {
                out.push_str(&notice("error", "Request failed.", self.code()));
                let _ = writeln!(out, "{status}");
                for (name, value) in headers {
                    let _ = writeln!(
                        out,
                        "{}: {}",
                        name.as_str(),
                        value.to_str().unwrap_or("<binary>")
                    );
                }
            }
            Self::Decode(error) => {
                out.push_str(&notice("error", &error.to_string(), self.code()));
                if let Some(content) = error.content() {
                    let _ = writeln!(out, "{content}");
                }
            }
            Self::Transport(error) => {
                out.push_str(&notice("error", &self.to_string(), self.code()));
                let _ = writeln!(out, "{error}");
            }
        }

        out
    }
}

/// A fully received response that passed the status check.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub headers: HeaderMap,
    pub body: String,
}

impl RawResponse {
    pub fn content_type(&self) -> &str {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("")
    }

    /// The quota header, if present and numeric.
    pub fn remaining_calls(&self) -> Option<u32> {
        self.headers
            .get(REMAINING_CALLS_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse().ok())
    }
}

/// HTTP client for the trends endpoint.
#[derive(Debug, Clone)]
pub struct TrendsClient {
    http: reqwest::Client,
    base_url: String,
    trends_path: String,
    bearer_token: Option<String>,
}

impl TrendsClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url().trim_end_matches('/').to_string(),
            trends_path: config.trends_path.clone(),
            bearer_token: config.bearer_token.clone(),
        }
    }

    pub fn is_signed(&self) -> bool {
        self.bearer_token.is_some()
    }

    pub fn endpoint(&self, location: &Location, wire: WireFormat) -> String {
        format!(
            "{}{}{}.{}",
            self.base_url,
            self.trends_path,
            location.woeid,
            wire.extension()
        )
    }

    /// Issue the request and collect the complete body.
    ///
    /// A status other than `200 OK` fails before any of the body is read.
    pub async fn fetch(
        &self,
        location: &Location,
        wire: WireFormat,
    ) -> Result<RawResponse, FetchError> {
        let url = self.endpoint(location, wire);
        tracing::debug!(%url, signed = self.is_signed(), "requesting trends");

        let mut request = self.http.get(&url);
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let mut response = request.send().await?;
        let status = response.status();
        tracing::debug!(%status, headers = ?response.headers(), "response received");

        if status != StatusCode::OK {
            return Err(FetchError::RequestFailed {
                status,
                headers: response.headers().clone(),
            });
        }

        let headers = response.headers().clone();
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            body.extend_from_slice(&chunk);
        }
        tracing::debug!(bytes = body.len(), "response body complete");

        Ok(RawResponse {
            headers,
            body: String::from_utf8_lossy(&body).into_owned(),
        })
    }
}

/// Per-run settings for [`process`].
#[derive(Debug, Clone, Copy)]
pub struct CycleOptions {
    pub location: Location,
    pub format: OutputFormat,
    pub low_quota_threshold: u32,
}

/// Decode, filter and render a received response.
///
/// Text for stdout is appended to `out` as it is produced, so a warning
/// emitted before a fatal decode error is still shown.  Returns the new
/// last-known state: the accepted batch, or `last_known` unchanged when the
/// response was stale.
pub fn process(
    response: RawResponse,
    last_known: LastKnown,
    options: &CycleOptions,
    out: &mut String,
) -> Result<LastKnown, FetchError> {
    let content_type = response.content_type();
    tracing::debug!(content_type, "dispatching response");
    let wire = WireFormat::from_content_type(content_type)?;

    let remaining_calls = response.remaining_calls();
    match remaining_calls {
        Some(remaining) if remaining < options.low_quota_threshold => {
            tracing::debug!(remaining, threshold = options.low_quota_threshold, "low quota");
            if options.format.shows_warnings() {
                out.push_str(&notice("warning", "We are reaching the limit!!", LOW_QUOTA_CODE));
                let _ = writeln!(out, "({remaining} API calls remaining)\n");
            }
        }
        Some(_) => {}
        None => tracing::debug!("response has no usable {REMAINING_CALLS_HEADER} header"),
    }

    let batch = wire
        .decoder()
        .decode(&response.body)?
        .with_remaining_calls(remaining_calls);

    match staleness::accept(batch, &last_known) {
        Verdict::Accepted(batch) => {
            out.push_str(&format::render(&batch, &options.location, options.format));
            Ok(last_known.replace(batch))
        }
        Verdict::Rejected(stale) => {
            if options.format.is_verbose() {
                out.push_str(&notice(
                    "info",
                    "The result we have is newer than this one, skip it.",
                    STALE_CODE,
                ));
                let _ = writeln!(
                    out,
                    "as_of {} is not after {}\n",
                    stale.batch.as_of, stale.last_known_as_of
                );
            }
            Ok(last_known)
        }
    }
}

/// Fetch once and process the response.
pub async fn run_cycle(
    client: &TrendsClient,
    wire: WireFormat,
    options: &CycleOptions,
    last_known: LastKnown,
    out: &mut String,
) -> Result<LastKnown, FetchError> {
    let response = client.fetch(&options.location, wire).await?;
    process(response, last_known, options, out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
