//! Result aggregation
//!
//! Merges classifier rejections and dispatcher outcomes into one table with
//! exactly one outcome per input position.

use rustc_hash::FxHashMap;

use crate::error::{DigipostError, Result};
use crate::identifier::IdentifierRecord;
use crate::outcome::{LookupOutcome, ResultTable};

/// Build the ordered result table
///
/// Invalid identifiers get an error outcome synthesized from their rejection
/// reason; valid identifiers take the dispatcher outcome recorded for their
/// position.
///
/// # Arguments
/// * `classified` - Every classified input token, in input order
/// * `lookup_outcomes` - Dispatcher outcomes for the valid identifiers, any order
///
/// # Errors
/// Returns a `Consistency` error when a valid position has no outcome, an
/// outcome is duplicated, an outcome belongs to another identifier, or an
/// outcome is left over for a position that was never dispatched.
pub fn assemble(
    classified: Vec<IdentifierRecord>,
    lookup_outcomes: Vec<LookupOutcome>,
) -> Result<ResultTable> {
    let mut by_position: FxHashMap<usize, LookupOutcome> =
        FxHashMap::with_capacity_and_hasher(lookup_outcomes.len(), Default::default());
    for outcome in lookup_outcomes {
        let position = outcome.position();
        if by_position.insert(position, outcome).is_some() {
            return Err(DigipostError::consistency(
                position,
                "more than one lookup outcome",
            ));
        }
    }

    let mut outcomes = Vec::with_capacity(classified.len());
    for (position, record) in classified.into_iter().enumerate() {
        if let Some(reason) = record.rejection() {
            let reason = reason.to_string();
            outcomes.push(LookupOutcome::failure(position, record, reason));
            continue;
        }

        let outcome = by_position.remove(&position).ok_or_else(|| {
            DigipostError::consistency(position, "valid identifier has no lookup outcome")
        })?;
        if outcome.identifier() != &record {
            return Err(DigipostError::consistency(
                position,
                "lookup outcome belongs to a different identifier",
            ));
        }
        outcomes.push(outcome);
    }

    if let Some(position) = by_position.keys().min() {
        return Err(DigipostError::consistency(
            *position,
            "lookup outcome for a position that was not dispatched",
        ));
    }

    Ok(ResultTable::from_ordered(outcomes))
}
