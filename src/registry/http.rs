//! HTTP client for the Serviceplatformen `PostForespoerg` service
//!
//! One `GET` per identifier:
//! `{base}/service/PostForespoerg_1/{channel}?cprNumber=..` (or `cvrNumber`),
//! answered with `{"result": true|false}`.

use std::time::Duration;

use chrono::Utc;
use reqwest::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

use super::{Channel, Credential, LookupFuture, RegistryClient};
use crate::error::{DigipostError, LookupError, Result};
use crate::identifier::ValidIdentifier;

const SERVICE_PATH: &str = "service/PostForespoerg_1";

/// Longest response excerpt kept in an error detail
const MAX_BODY_EXCERPT: usize = 200;

#[derive(Debug, Deserialize)]
struct PostForespoergResponse {
    result: bool,
}

/// Registry client backed by a shared `reqwest::Client`
///
/// The underlying connection pool is safe for concurrent use, so one instance
/// serves every worker.
#[derive(Debug, Clone)]
pub struct ServiceplatformenClient {
    http: reqwest::Client,
    base_url: String,
    credential: Credential,
}

impl ServiceplatformenClient {
    /// Build a client with its own connection pool
    pub fn new(base_url: &str, credential: Credential, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DigipostError::Config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(http, base_url, credential))
    }

    /// Use an existing `reqwest::Client`
    #[must_use]
    pub fn with_client(http: reqwest::Client, base_url: &str, credential: Credential) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            credential,
        }
    }

    /// Endpoint URL for a channel
    #[must_use]
    pub fn endpoint(&self, channel: Channel) -> String {
        format!("{}/{SERVICE_PATH}/{}", self.base_url, channel.service_name())
    }

    async fn query(
        &self,
        identifier: &ValidIdentifier,
        channel: Channel,
    ) -> std::result::Result<bool, LookupError> {
        let response = self
            .http
            .get(self.endpoint(channel))
            .query(&[query_parameter(identifier)])
            .header("X-TransaktionsId", Uuid::new_v4().to_string())
            .header("X-TransaktionsTid", Utc::now().to_rfc3339())
            .bearer_auth(self.credential.token())
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(transport_error)?;
        check_status(status, &body)?;
        parse_registration(&body)
    }
}

impl RegistryClient for ServiceplatformenClient {
    fn is_registered<'a>(
        &'a self,
        identifier: &'a ValidIdentifier,
        channel: Channel,
    ) -> LookupFuture<'a> {
        Box::pin(self.query(identifier, channel))
    }
}

/// Query parameter name and value for an identifier
fn query_parameter(identifier: &ValidIdentifier) -> (&'static str, &str) {
    match identifier {
        ValidIdentifier::Person(cpr) => ("cprNumber", cpr.as_str()),
        ValidIdentifier::Organization(cvr) => ("cvrNumber", cvr.as_str()),
    }
}

fn transport_error(error: reqwest::Error) -> LookupError {
    if error.is_timeout() {
        LookupError::Transport(format!("request timed out: {error}"))
    } else {
        LookupError::Transport(error.to_string())
    }
}

fn excerpt(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    match text.char_indices().nth(MAX_BODY_EXCERPT) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Map a non-success HTTP status to the matching lookup error
fn check_status(status: StatusCode, body: &[u8]) -> std::result::Result<(), LookupError> {
    if status.is_success() {
        return Ok(());
    }
    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            LookupError::Authentication(format!("{status}: {}", excerpt(body)))
        }
        StatusCode::NOT_FOUND => LookupError::NotFound,
        other => LookupError::Service {
            status: other.as_u16(),
            message: excerpt(body),
        },
    })
}

/// Decode the registration flag from a response body
fn parse_registration(body: &[u8]) -> std::result::Result<bool, LookupError> {
    serde_json::from_slice::<PostForespoergResponse>(body)
        .map(|response| response.result)
        .map_err(|e| LookupError::MalformedResponse(format!("{e}: {}", excerpt(body))))
}
