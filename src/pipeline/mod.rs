//! Concurrent enrichment pipeline
//!
//! raw tokens → classify (rayon) → dispatch valid identifiers (bounded
//! concurrency) → assemble in input order. Invalid tokens skip the dispatcher
//! and become error rows directly.

pub mod aggregator;
pub mod dispatcher;

use std::time::Instant;

use rayon::prelude::*;

use crate::config::LookupConfig;
use crate::delivery::{Envelope, Mailer};
use crate::error::Result;
use crate::identifier::{self, IdentifierRecord};
use crate::intake::IntakeRequest;
use crate::outcome::ResultTable;
use crate::registry::RegistryClient;
use crate::report;

pub use aggregator::assemble;
pub use dispatcher::LookupJob;

/// Classify every raw token, preserving input order
#[must_use]
pub fn classify_all<S: AsRef<str> + Sync>(raw: &[S]) -> Vec<IdentifierRecord> {
    raw.par_iter()
        .map(|token| identifier::classify(token.as_ref()))
        .collect()
}

/// Lookup jobs for the valid records, in input order
#[must_use]
pub fn pending_lookups(classified: &[IdentifierRecord]) -> Vec<LookupJob> {
    classified
        .iter()
        .enumerate()
        .filter(|(_, record)| record.is_valid())
        .map(|(position, record)| LookupJob::new(position, record.clone()))
        .collect()
}

/// The lookup pipeline bound to one registry client
#[derive(Debug)]
pub struct Pipeline<C> {
    client: C,
    config: LookupConfig,
}

impl<C: RegistryClient> Pipeline<C> {
    /// Create a pipeline, validating the configuration
    pub fn new(client: C, config: LookupConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { client, config })
    }

    #[must_use]
    pub fn config(&self) -> &LookupConfig {
        &self.config
    }

    #[must_use]
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Run the pipeline with the configured thread count
    pub async fn run<S: AsRef<str> + Sync>(&self, raw: &[S]) -> Result<ResultTable> {
        self.run_with_concurrency(raw, self.config.thread_count)
            .await
    }

    /// Run the pipeline with an explicit concurrency level
    ///
    /// # Errors
    /// Returns a `Config` error for zero concurrency and a `Consistency`
    /// error if any position ends up without exactly one outcome. Individual
    /// lookup failures are not errors; they become error rows.
    pub async fn run_with_concurrency<S: AsRef<str> + Sync>(
        &self,
        raw: &[S],
        concurrency: usize,
    ) -> Result<ResultTable> {
        let start = Instant::now();
        let classified = classify_all(raw);
        let jobs = pending_lookups(&classified);
        log::info!(
            "Classified {} identifiers: {} valid, {} invalid",
            classified.len(),
            jobs.len(),
            classified.len() - jobs.len()
        );

        let outcomes = dispatcher::run(&self.client, jobs, concurrency, &self.config).await?;
        let table = assemble(classified, outcomes)?;

        log::info!("{} in {:?}", table.summary(), start.elapsed());
        Ok(table)
    }

    /// Render a result table as spreadsheet bytes
    pub fn render_report(&self, table: &ResultTable) -> Result<Vec<u8>> {
        report::render(table)
    }

    /// Hand a rendered report to `mailer`, addressed to the requester
    pub fn deliver<M: Mailer + ?Sized>(
        &self,
        mailer: &M,
        request: &IntakeRequest,
        bytes: Vec<u8>,
    ) -> Result<()> {
        let envelope = Envelope::for_report(&self.config.mail, &request.requester, bytes);
        mailer.send(&envelope)
    }

    /// Run a full request: look up, render and hand the report to `mailer`
    ///
    /// Nothing is rendered or sent if the batch fails a consistency check.
    pub async fn process_request<M: Mailer + ?Sized>(
        &self,
        request: &IntakeRequest,
        mailer: &M,
    ) -> Result<ResultTable> {
        let concurrency = request.thread_count.unwrap_or(self.config.thread_count);
        let table = self
            .run_with_concurrency(request.identifiers.as_slice(), concurrency)
            .await?;
        let bytes = self.render_report(&table)?;
        self.deliver(mailer, request, bytes)?;
        Ok(table)
    }
}
