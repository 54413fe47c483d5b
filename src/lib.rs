//! Bulk lookup of Digital Post / NemSMS registration status for Danish
//! person (CPR) and organization (CVR) numbers.
//!
//! Identifiers are classified, looked up against the registry with bounded
//! concurrency, reassembled in input order and rendered as a spreadsheet.

pub mod config;
pub mod delivery;
pub mod error;
pub mod identifier;
pub mod intake;
pub mod outcome;
pub mod pipeline;
pub mod registry;
pub mod report;
pub mod utils;

// Re-export the most common types for easier use
pub use config::LookupConfig;
pub use error::{DigipostError, LookupError, Result};
pub use identifier::{classify, IdentifierKind, IdentifierRecord};
pub use intake::IntakeRequest;
pub use outcome::{LookupOutcome, LookupStatus, ResultTable};
pub use pipeline::{assemble, classify_all, Pipeline};
pub use registry::{Channel, RegistryClient, ServiceplatformenClient};
pub use report::{render, save_report};
