//! Configuration for the lookup pipeline.

pub mod cli;

use std::time::Duration;

use crate::error::{DigipostError, Result};
use crate::registry::Channel;

/// Default credential reference in the secret store
pub const DEFAULT_CREDENTIAL_REFERENCE: &str = "Digital_Post_Masseopslag";

/// Default registry endpoint
pub const DEFAULT_BASE_URL: &str = "https://prod.serviceplatformen.dk/";

/// Upper bound for the default thread count
pub const MAX_DEFAULT_THREADS: usize = 8;

/// Default per-lookup timeout
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Default name of the spreadsheet attachment
pub const DEFAULT_ATTACHMENT_NAME: &str = "Tilmeldt Digital Post.xlsx";

/// Default sender of the report mail
pub const DEFAULT_SENDER: &str = "itk-rpa@mkb.aarhus.dk";

/// Default subject of the report mail
pub const DEFAULT_SUBJECT: &str = "RPA: Udtræk om Tilmelding til Digital Post";

/// Default body of the report mail
pub const DEFAULT_BODY: &str = "Robotten har nu udtrukket information om tilmelding til digital post i den forespurgte liste.\n\n\
Vedhæftet denne mail finder du et excel-ark, som indeholder de forespurgte CPR- og CVR-numre og svaret fra Serviceplatformen om, hvorvidt de er tilmeldt.\n\n\
Mvh. ITK RPA";

/// Configuration for a lookup batch
#[derive(Debug, Clone)]
pub struct LookupConfig {
    /// Opaque handle to the registry credential
    pub service_credential_reference: String,
    /// Number of concurrent lookups
    pub thread_count: usize,
    /// Registry base URL
    pub base_url: String,
    /// Channel to query
    pub channel: Channel,
    /// Limit for a single lookup
    pub lookup_timeout: Duration,
    /// Show a progress bar while dispatching
    pub show_progress: bool,
    /// Report mail settings
    pub mail: MailConfig,
}

/// Settings for the outgoing report mail
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub sender: String,
    pub subject: String,
    pub body: String,
    pub attachment_name: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            sender: DEFAULT_SENDER.to_string(),
            subject: DEFAULT_SUBJECT.to_string(),
            body: DEFAULT_BODY.to_string(),
            attachment_name: DEFAULT_ATTACHMENT_NAME.to_string(),
        }
    }
}

/// Default thread count: one per CPU, at most [`MAX_DEFAULT_THREADS`]
#[must_use]
pub fn default_thread_count() -> usize {
    num_cpus::get().clamp(1, MAX_DEFAULT_THREADS)
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            service_credential_reference: DEFAULT_CREDENTIAL_REFERENCE.to_string(),
            thread_count: default_thread_count(),
            base_url: DEFAULT_BASE_URL.to_string(),
            channel: Channel::DigitalPost,
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
            show_progress: true,
            mail: MailConfig::default(),
        }
    }
}

impl LookupConfig {
    /// Set the number of concurrent lookups
    #[must_use]
    pub fn with_thread_count(mut self, thread_count: usize) -> Self {
        self.thread_count = thread_count;
        self
    }

    /// Set the channel to query
    #[must_use]
    pub fn with_channel(mut self, channel: Channel) -> Self {
        self.channel = channel;
        self
    }

    /// Set the per-lookup timeout
    #[must_use]
    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    /// Set the registry base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the credential reference
    #[must_use]
    pub fn with_credential_reference(mut self, reference: impl Into<String>) -> Self {
        self.service_credential_reference = reference.into();
        self
    }

    /// Set the sender address of the report mail
    #[must_use]
    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.mail.sender = sender.into();
        self
    }

    /// Enable or disable the progress bar
    #[must_use]
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Check that all values are usable
    ///
    /// # Errors
    /// Returns a `Config` error for a zero thread count, a zero timeout or a
    /// blank credential reference or base URL.
    pub fn validate(&self) -> Result<()> {
        if self.thread_count == 0 {
            return Err(DigipostError::Config(
                "thread_count must be at least 1".to_string(),
            ));
        }
        if self.lookup_timeout.is_zero() {
            return Err(DigipostError::Config(
                "lookup timeout must be positive".to_string(),
            ));
        }
        if self.service_credential_reference.trim().is_empty() {
            return Err(DigipostError::Config(
                "service credential reference is empty".to_string(),
            ));
        }
        if self.base_url.trim().is_empty() {
            return Err(DigipostError::Config("base URL is empty".to_string()));
        }
        Ok(())
    }
}
