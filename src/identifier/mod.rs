//! Identifier classification
//!
//! Every raw input token becomes an [`IdentifierRecord`]: a valid person
//! number (CPR), a valid organization number (CVR), or an invalid token that
//! carries the reason it was rejected. Classification is pure and can run on
//! any number of threads at once.

pub mod cpr;
pub mod cvr;

use std::fmt;

use serde::Serialize;

pub use cpr::{Cpr, CprRejection};
pub use cvr::Cvr;

/// Detail used for tokens matching neither identifier format
pub const INVALID_IDENTIFIER: &str = "not a valid person or organization identifier";

/// Detail used for blank tokens
pub const EMPTY_IDENTIFIER: &str = "empty identifier";

/// Classification tag of an identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum IdentifierKind {
    /// Person (CPR)
    Person,
    /// Organization (CVR)
    Organization,
    /// Neither
    Invalid,
}

impl IdentifierKind {
    /// Label used in reports
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Person => "Person (CPR)",
            Self::Organization => "Organization (CVR)",
            Self::Invalid => "Invalid",
        }
    }
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An identifier the registry can be asked about
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum ValidIdentifier {
    Person(Cpr),
    Organization(Cvr),
}

impl ValidIdentifier {
    /// Canonical digit string
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Person(cpr) => cpr.as_str(),
            Self::Organization(cvr) => cvr.as_str(),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> IdentifierKind {
        match self {
            Self::Person(_) => IdentifierKind::Person,
            Self::Organization(_) => IdentifierKind::Organization,
        }
    }
}

/// Result of classifying one token
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Classification {
    Valid(ValidIdentifier),
    Invalid { reason: String },
}

/// One classified input token
///
/// Immutable once created. The raw token is kept untouched for traceability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentifierRecord {
    raw_input: String,
    classification: Classification,
}

impl IdentifierRecord {
    /// The token exactly as it was supplied
    #[must_use]
    pub fn raw_input(&self) -> &str {
        &self.raw_input
    }

    #[must_use]
    pub fn classification(&self) -> &Classification {
        &self.classification
    }

    #[must_use]
    pub fn kind(&self) -> IdentifierKind {
        match &self.classification {
            Classification::Valid(valid) => valid.kind(),
            Classification::Invalid { .. } => IdentifierKind::Invalid,
        }
    }

    /// Canonical digit string, absent for invalid tokens
    #[must_use]
    pub fn normalized(&self) -> Option<&str> {
        self.valid().map(ValidIdentifier::as_str)
    }

    #[must_use]
    pub fn valid(&self) -> Option<&ValidIdentifier> {
        match &self.classification {
            Classification::Valid(valid) => Some(valid),
            Classification::Invalid { .. } => None,
        }
    }

    /// Why the token was rejected, absent for valid identifiers
    #[must_use]
    pub fn rejection(&self) -> Option<&str> {
        match &self.classification {
            Classification::Valid(_) => None,
            Classification::Invalid { reason } => Some(reason),
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid().is_some()
    }
}

/// Classify a single raw token
///
/// CPR is tried before CVR; the two formats have different lengths so a token
/// never matches both.
#[must_use]
pub fn classify(raw: &str) -> IdentifierRecord {
    let classification = if raw.trim().is_empty() {
        Classification::Invalid {
            reason: EMPTY_IDENTIFIER.to_string(),
        }
    } else {
        match Cpr::parse(raw) {
            Ok(cpr) => Classification::Valid(ValidIdentifier::Person(cpr)),
            Err(rejection) => match Cvr::parse(raw) {
                Some(cvr) => Classification::Valid(ValidIdentifier::Organization(cvr)),
                None => Classification::Invalid {
                    reason: match rejection {
                        CprRejection::BirthDate => format!("{INVALID_IDENTIFIER}: invalid birth date"),
                        CprRejection::Format => INVALID_IDENTIFIER.to_string(),
                    },
                },
            },
        }
    };

    IdentifierRecord {
        raw_input: raw.to_string(),
        classification,
    }
}
