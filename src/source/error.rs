use thiserror::Error;

/// Why a response body could not be turned into a [`TrendBatch`].
///
/// Content errors carry the offending raw content so it can be echoed back
/// to the user.
///
/// [`TrendBatch`]: super::TrendBatch
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Wrong MIME type: {0}")]
    UnsupportedContentType(String),
    #[error("Response doesn't have a timestamp")]
    MissingTimestamp { content: String },
    #[error("Unrecognized timestamp: {value}")]
    InvalidTimestamp { value: String },
    #[error("XML contains no trends")]
    NoTrendsFound { content: String },
    #[error("Response doesn't have a trends list")]
    MissingTrendsList { content: String },
    #[error("Response trends list is empty")]
    EmptyTrendsList { content: String },
    #[error("Could not parse JSON")]
    MalformedPayload {
        content: String,
        #[source]
        source: Option<serde_json::Error>,
    },
}

impl DecodeError {
    /// Stable diagnostic code printed next to the message.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnsupportedContentType(_) => "20324136363342404",
            Self::MissingTimestamp { .. } => "9761156134773046",
            Self::InvalidTimestamp { .. } => "4410937862053321",
            Self::NoTrendsFound { .. } => "5253734595607966",
            Self::MissingTrendsList { .. } => "8779761055484414",
            Self::EmptyTrendsList { .. } => "6612175547052175",
            Self::MalformedPayload { .. } => "05745784239843488",
        }
    }

    /// The raw content that failed to decode, if any.
    pub fn content(&self) -> Option<&str> {
        match self {
            Self::UnsupportedContentType(_) | Self::InvalidTimestamp { .. } => None,
            Self::MissingTimestamp { content }
            | Self::NoTrendsFound { content }
            | Self::MissingTrendsList { content }
            | Self::EmptyTrendsList { content }
            | Self::MalformedPayload { content, .. } => Some(content),
        }
    }
}
