//! Credential resolution for the registry service.

use std::fmt;

use crate::error::{DigipostError, Result};

/// Environment prefix used by [`EnvCredentialProvider`]
pub const TOKEN_ENV_PREFIX: &str = "DIGIPOST_TOKEN_";

/// Bearer credential for the registry
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
}

impl Credential {
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(DigipostError::Credential(
                "credential token is empty".to_string(),
            ));
        }
        Ok(Self {
            token: token.trim().to_string(),
        })
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Turns an opaque credential reference into a usable credential
pub trait CredentialProvider: Send + Sync {
    fn resolve(&self, reference: &str) -> Result<Credential>;
}

/// Reads credentials from environment variables
///
/// The reference `Digital_Post_Masseopslag` maps to
/// `DIGIPOST_TOKEN_DIGITAL_POST_MASSEOPSLAG`.
#[derive(Debug, Clone, Default)]
pub struct EnvCredentialProvider;

impl EnvCredentialProvider {
    /// Environment variable holding the token for `reference`
    #[must_use]
    pub fn env_key(reference: &str) -> String {
        let suffix: String = reference
            .trim()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect();
        format!("{TOKEN_ENV_PREFIX}{suffix}")
    }
}

impl CredentialProvider for EnvCredentialProvider {
    fn resolve(&self, reference: &str) -> Result<Credential> {
        let key = Self::env_key(reference);
        let token = std::env::var(&key).map_err(|_| {
            DigipostError::Credential(format!(
                "no credential found for reference '{reference}' (expected {key})"
            ))
        })?;
        Credential::new(token)
    }
}
