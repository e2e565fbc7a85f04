//! Staleness filtering.
//!
//! A freshly decoded batch is only worth showing if it is strictly newer than
//! the last one we accepted.  [`accept`] makes that decision without touching
//! any state; the caller owns the [`LastKnown`] value and replaces it on
//! acceptance.

use chrono::{DateTime, Utc};

use crate::source::TrendBatch;

/// The most recently accepted batch, if any.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LastKnown {
    batch: Option<TrendBatch>,
}

impl LastKnown {
    /// No batch seen yet; every real timestamp is newer.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn as_of(&self) -> DateTime<Utc> {
        self.batch
            .as_ref()
            .map(|batch| batch.as_of)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    pub fn batch(&self) -> Option<&TrendBatch> {
        self.batch.as_ref()
    }

    /// Store an accepted batch, discarding the previous one.
    pub fn replace(self, batch: TrendBatch) -> Self {
        Self { batch: Some(batch) }
    }
}

/// A rejected batch and the timestamp it lost against.
#[derive(Debug, Clone, PartialEq)]
pub struct Stale {
    pub batch: TrendBatch,
    pub last_known_as_of: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Accepted(TrendBatch),
    Rejected(Stale),
}

/// Accept `batch` only if it is strictly newer than `last_known`.
pub fn accept(batch: TrendBatch, last_known: &LastKnown) -> Verdict {
    let last_known_as_of = last_known.as_of();

    if batch.as_of <= last_known_as_of {
        tracing::debug!(as_of = %batch.as_of, %last_known_as_of, "stale batch");
        Verdict::Rejected(Stale {
            batch,
            last_known_as_of,
        })
    } else {
        Verdict::Accepted(batch)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
