//! Per-identifier outcomes and the ordered result table.

use std::fmt;

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::identifier::IdentifierRecord;

/// Registration status of one identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum LookupStatus {
    RegisteredDigitalPost,
    RegisteredNemSms,
    NotRegistered,
    Error,
}

impl LookupStatus {
    /// Label used in reports
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::RegisteredDigitalPost => "Registered (Digital Post)",
            Self::RegisteredNemSms => "Registered (NemSMS)",
            Self::NotRegistered => "Not registered",
            Self::Error => "Error",
        }
    }
}

impl fmt::Display for LookupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result for one input position
///
/// `error_detail` is present exactly when the status is `Error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupOutcome {
    position: usize,
    identifier: IdentifierRecord,
    status: LookupStatus,
    error_detail: Option<String>,
}

impl LookupOutcome {
    /// A completed lookup with a registry answer
    ///
    /// Passing `LookupStatus::Error` here yields an error outcome with a
    /// generic detail, keeping the detail invariant intact.
    #[must_use]
    pub fn success(position: usize, identifier: IdentifierRecord, status: LookupStatus) -> Self {
        if status == LookupStatus::Error {
            return Self::failure(position, identifier, "lookup failed");
        }
        Self {
            position,
            identifier,
            status,
            error_detail: None,
        }
    }

    /// A rejected or failed identifier
    #[must_use]
    pub fn failure(
        position: usize,
        identifier: IdentifierRecord,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            position,
            identifier,
            status: LookupStatus::Error,
            error_detail: Some(detail.into()),
        }
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    #[must_use]
    pub fn identifier(&self) -> &IdentifierRecord {
        &self.identifier
    }

    #[must_use]
    pub fn status(&self) -> LookupStatus {
        self.status
    }

    #[must_use]
    pub fn error_detail(&self) -> Option<&str> {
        self.error_detail.as_deref()
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.status == LookupStatus::Error
    }
}

/// Ordered, complete set of outcomes for one batch
///
/// Only the aggregator creates tables, and only once every position from
/// `0..len` has exactly one outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultTable {
    outcomes: Vec<LookupOutcome>,
}

impl ResultTable {
    /// Wrap outcomes already sorted by position with no gaps
    pub(crate) fn from_ordered(outcomes: Vec<LookupOutcome>) -> Self {
        debug_assert!(outcomes.iter().enumerate().all(|(i, o)| o.position == i));
        Self { outcomes }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LookupOutcome> {
        self.outcomes.iter()
    }

    #[must_use]
    pub fn get(&self, position: usize) -> Option<&LookupOutcome> {
        self.outcomes.get(position)
    }

    /// Count outcomes per status
    #[must_use]
    pub fn summary(&self) -> StatusSummary {
        let mut counts = FxHashMap::default();
        for outcome in &self.outcomes {
            *counts.entry(outcome.status).or_insert(0) += 1;
        }
        StatusSummary {
            total: self.outcomes.len(),
            counts,
        }
    }
}

impl<'a> IntoIterator for &'a ResultTable {
    type Item = &'a LookupOutcome;
    type IntoIter = std::slice::Iter<'a, LookupOutcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.outcomes.iter()
    }
}

/// Per-status counts of a result table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusSummary {
    total: usize,
    counts: FxHashMap<LookupStatus, usize>,
}

impl StatusSummary {
    /// Number of outcomes counted
    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    #[must_use]
    pub fn count(&self, status: LookupStatus) -> usize {
        self.counts.get(&status).copied().unwrap_or(0)
    }
}

impl fmt::Display for StatusSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} identifiers: {} Digital Post, {} NemSMS, {} not registered, {} errors",
            self.total,
            self.count(LookupStatus::RegisteredDigitalPost),
            self.count(LookupStatus::RegisteredNemSms),
            self.count(LookupStatus::NotRegistered),
            self.count(LookupStatus::Error),
        )
    }
}
