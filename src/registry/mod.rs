//! Registration lookup client
//!
//! The registry is treated as a per-identifier status oracle: one request, one
//! yes/no answer for the queried channel, or a [`LookupError`].

pub mod credentials;
pub mod http;

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{DigipostError, LookupError};
use crate::identifier::{IdentifierRecord, ValidIdentifier};
use crate::outcome::{LookupOutcome, LookupStatus};
use crate::utils::logging::log_warning;

pub use credentials::{Credential, CredentialProvider, EnvCredentialProvider};
pub use http::ServiceplatformenClient;

/// Future returned by [`RegistryClient::is_registered`]
pub type LookupFuture<'a> =
    Pin<Box<dyn Future<Output = std::result::Result<bool, LookupError>> + Send + 'a>>;

/// Digital communication channel a registration is checked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum Channel {
    DigitalPost,
    NemSms,
}

impl Channel {
    /// Path segment used by the registry service
    #[must_use]
    pub const fn service_name(self) -> &'static str {
        match self {
            Self::DigitalPost => "digitalpost",
            Self::NemSms => "nemsms",
        }
    }

    /// Status reported when the identifier is registered on this channel
    #[must_use]
    pub const fn registered_status(self) -> LookupStatus {
        match self {
            Self::DigitalPost => LookupStatus::RegisteredDigitalPost,
            Self::NemSms => LookupStatus::RegisteredNemSms,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.service_name())
    }
}

impl FromStr for Channel {
    type Err = DigipostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "digitalpost" | "digital_post" | "digital-post" => Ok(Self::DigitalPost),
            "nemsms" | "nem_sms" | "nem-sms" => Ok(Self::NemSms),
            other => Err(DigipostError::Config(format!("Unknown channel: {other}"))),
        }
    }
}

/// A client able to ask the registry about one identifier
///
/// Implementations must not retry internally and must be usable from many
/// concurrent lookups at once.
pub trait RegistryClient: Send + Sync {
    /// Whether `identifier` is registered on `channel`
    ///
    /// `Ok(false)` is a successful "not registered" answer. An identifier the
    /// registry does not know is `Err(LookupError::NotFound)`.
    fn is_registered<'a>(&'a self, identifier: &'a ValidIdentifier, channel: Channel)
    -> LookupFuture<'a>;
}

impl<T: RegistryClient + ?Sized> RegistryClient for std::sync::Arc<T> {
    fn is_registered<'a>(
        &'a self,
        identifier: &'a ValidIdentifier,
        channel: Channel,
    ) -> LookupFuture<'a> {
        (**self).is_registered(identifier, channel)
    }
}

/// Look up one classified identifier and turn the answer into an outcome
///
/// Never fails: transport, authentication, protocol and timeout failures all
/// become an `Error` outcome for this position only.
///
/// # Arguments
/// * `client` - Registry client shared by all workers
/// * `position` - Index of the identifier in the original input
/// * `record` - The classified identifier
/// * `channel` - Channel to ask about
/// * `timeout` - Limit for this single lookup
pub async fn lookup<C: RegistryClient + ?Sized>(
    client: &C,
    position: usize,
    record: IdentifierRecord,
    channel: Channel,
    timeout: Duration,
) -> LookupOutcome {
    let Some(identifier) = record.valid() else {
        // Invalid tokens never reach the registry
        let reason = record.rejection().unwrap_or_default().to_string();
        return LookupOutcome::failure(position, record, reason);
    };

    let answer = match tokio::time::timeout(timeout, client.is_registered(identifier, channel)).await
    {
        Ok(answer) => answer,
        Err(_) => Err(LookupError::Timeout(timeout)),
    };

    match answer {
        Ok(true) => {
            log::debug!("Position {position}: registered for {channel}");
            LookupOutcome::success(position, record, channel.registered_status())
        }
        Ok(false) => {
            log::debug!("Position {position}: not registered for {channel}");
            LookupOutcome::success(position, record, LookupStatus::NotRegistered)
        }
        Err(e) => {
            log_warning(&format!("Lookup failed: {e}"), Some(position));
            LookupOutcome::failure(position, record, e.to_string())
        }
    }
}
