//! Bounded-concurrency lookup dispatcher
//!
//! At most `concurrency` lookups are in flight at once. Identifiers are fed to
//! free slots in input order; each completion is written into a pre-allocated
//! buffer at its own index, so the returned outcomes are in input order no
//! matter which lookup finishes first.

use std::time::Instant;

use futures::stream::{self, StreamExt};

use crate::config::LookupConfig;
use crate::error::{DigipostError, Result};
use crate::identifier::IdentifierRecord;
use crate::outcome::LookupOutcome;
use crate::registry::{self, RegistryClient};
use crate::utils::logging::{
    create_hidden_progress_bar, create_lookup_progress_bar, finish_progress_bar,
    log_operation_complete, log_operation_start,
};

/// An identifier waiting for a registry lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupJob {
    /// Index in the original input
    pub position: usize,
    /// The classified identifier
    pub record: IdentifierRecord,
}

impl LookupJob {
    #[must_use]
    pub fn new(position: usize, record: IdentifierRecord) -> Self {
        Self { position, record }
    }
}

/// Run lookups for every job with bounded concurrency
///
/// # Arguments
/// * `client` - Registry client shared read-only by all in-flight lookups
/// * `jobs` - Jobs to run, in input order
/// * `concurrency` - Maximum number of lookups in flight
/// * `config` - Channel, timeout and progress settings
///
/// # Returns
/// One outcome per job, in the same order as `jobs`. Lookup failures are
/// captured per job and never cancel other lookups.
///
/// # Errors
/// Returns a `Config` error for zero concurrency and a `Consistency` error if
/// a job ends up without exactly one outcome.
pub async fn run<C: RegistryClient + ?Sized>(
    client: &C,
    jobs: Vec<LookupJob>,
    concurrency: usize,
    config: &LookupConfig,
) -> Result<Vec<LookupOutcome>> {
    if concurrency == 0 {
        return Err(DigipostError::Config(
            "concurrency must be at least 1".to_string(),
        ));
    }

    let total = jobs.len();
    if total == 0 {
        return Ok(Vec::new());
    }

    let start = Instant::now();
    log_operation_start(
        &format!(
            "Looking up {} registration with {concurrency} concurrent lookups",
            config.channel
        ),
        total,
    );

    let pb = if config.show_progress {
        create_lookup_progress_bar(total as u64, Some("Registry lookups"))
    } else {
        create_hidden_progress_bar(total as u64)
    };

    let positions: Vec<usize> = jobs.iter().map(|job| job.position).collect();
    let mut slots: Vec<Option<LookupOutcome>> = vec![None; total];

    let channel = config.channel;
    let timeout = config.lookup_timeout;
    let mut completions = stream::iter(jobs.into_iter().enumerate())
        .map(move |(slot, job)| async move {
            let outcome = registry::lookup(client, job.position, job.record, channel, timeout).await;
            (slot, outcome)
        })
        .buffer_unordered(concurrency);

    let mut failures = 0usize;
    while let Some((slot, outcome)) = completions.next().await {
        if outcome.is_error() {
            failures += 1;
        }
        if slots[slot].replace(outcome).is_some() {
            return Err(DigipostError::consistency(
                positions[slot],
                "lookup outcome recorded twice",
            ));
        }
        pb.inc(1);
    }

    finish_progress_bar(&pb, Some("Lookups complete"));
    log_operation_complete("looked up", total, Some(start.elapsed()));
    if failures > 0 {
        log::warn!("{failures} of {total} lookups failed");
    }

    slots
        .into_iter()
        .zip(positions)
        .map(|(slot, position)| {
            slot.ok_or_else(|| DigipostError::consistency(position, "no lookup outcome recorded"))
        })
        .collect()
}
