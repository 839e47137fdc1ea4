//! Record client for hosted backends.
//!
//! # Architecture
//!
//! The crate is organized around a backend dispatch pattern:
//!
//! - [`RecordStore`] - Unified entry point that dispatches to
//!   backend-specific implementations
//! - [`table`] - Table-service client (`/v0/{base}/{table}`, bearer auth,
//!   `{"fields": ...}` bodies, `{"records": [...]}` lists)
//! - [`document`] - Document-database client (Firestore-style REST with
//!   typed value envelopes and `:runQuery` owner filters)
//! - [`identity`] - Identity-provider client (create/lookup user by email)
//!
//! Both record backends expose the same four operations: list,
//! owner-filtered list, create, and single-record update. Records travel
//! as the generic [`Record`] shape; typed interpretation lives in
//! `tally-types`.
//!
//! # Error Handling
//!
//! Every operation returns `Result<_, ClientError>` and every failure is
//! terminal for that user action: no batching, no transactions, no
//! pagination, no retry or backoff. The caller re-fetches the source of
//! truth after mutations instead of patching local state.

pub mod document;
pub mod identity;
pub mod table;

use std::sync::OnceLock;
use std::time::Duration;

use tally_config::Backend;
use tally_types::{Fields, Record, RecordId, Scope, UserId};

pub use identity::{IdentityClient, User};

const CONNECT_TIMEOUT_SECS: u64 = 10;
const REQUEST_TIMEOUT_SECS: u64 = 30;
const TCP_KEEPALIVE_SECS: u64 = 60;

const MAX_ERROR_BODY_BYTES: usize = 32 * 1024;

/// Shared HTTP client. One connection pool for the whole process.
pub(crate) fn http_client() -> &'static reqwest::Client {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .tcp_keepalive(Some(Duration::from_secs(TCP_KEEPALIVE_SECS)))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap_or_else(|e| {
                tracing::error!("Failed to build HTTP client: {e}. Falling back to defaults.");
                reqwest::Client::new()
            })
    })
}

/// Failure taxonomy for backend calls.
///
/// - `BackendUnavailable`: network, auth, or server failure. Surfaced as an
///   error banner; the user retries by repeating the action.
/// - `Validation`: the backend rejected the field set. Surfaced inline;
///   resubmission required.
/// - `NotFound`: the record id no longer exists. Surfaced as a stale-data
///   banner after a re-fetch.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),
    #[error("backend rejected the record: {0}")]
    Validation(String),
    #[error("record {0} not found")]
    NotFound(RecordId),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::BackendUnavailable(err.to_string())
    }
}

/// Read an error body without trusting its size.
pub(crate) async fn read_capped_error_body(response: reqwest::Response) -> String {
    match response.text().await {
        Ok(mut body) => {
            if body.len() > MAX_ERROR_BODY_BYTES {
                body.truncate(MAX_ERROR_BODY_BYTES);
                body.push_str("...(truncated)");
            }
            body
        }
        Err(_) => String::new(),
    }
}

/// Map a non-success response to the error taxonomy.
///
/// 404 is only `NotFound` when the caller addressed a specific record;
/// list/create URLs that 404 mean the scope itself is wrong, which is an
/// availability problem.
pub(crate) async fn error_for_status(
    response: reqwest::Response,
    record: Option<&RecordId>,
) -> ClientError {
    let status = response.status();
    if status == reqwest::StatusCode::NOT_FOUND
        && let Some(id) = record
    {
        return ClientError::NotFound(id.clone());
    }

    let body = read_capped_error_body(response).await;
    if status == reqwest::StatusCode::UNPROCESSABLE_ENTITY
        || status == reqwest::StatusCode::BAD_REQUEST
    {
        return ClientError::Validation(validation_message(&body));
    }

    tracing::warn!(%status, "Backend request failed");
    ClientError::BackendUnavailable(format!("{status}: {body}"))
}

/// Pull a human-readable message out of a backend error body, falling back
/// to the raw body. Both backends nest it under `error`.
fn validation_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| {
            let error = json.get("error")?;
            error
                .get("message")
                .or_else(|| error.get("type"))
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}

/// Record access against the configured backend: list, list by owner,
/// create, update.
#[derive(Debug, Clone)]
pub struct RecordStore {
    backend: Backend,
}

impl RecordStore {
    #[must_use]
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    /// All records in a table.
    pub async fn list(&self, scope: &Scope) -> Result<Vec<Record>, ClientError> {
        match &self.backend {
            Backend::Table(settings) => table::list(settings, scope, None).await,
            Backend::Document(settings) => document::list(settings, scope).await,
        }
    }

    /// Records whose owner field equals `owner`. No matches is an empty
    /// list, not an error.
    pub async fn list_owned(
        &self,
        scope: &Scope,
        owner: &UserId,
    ) -> Result<Vec<Record>, ClientError> {
        match &self.backend {
            Backend::Table(settings) => table::list(settings, scope, Some(owner)).await,
            Backend::Document(settings) => document::query_owner(settings, scope, owner).await,
        }
    }

    /// Insert one record; the server assigns the id and timestamp.
    pub async fn create(&self, scope: &Scope, fields: Fields) -> Result<Record, ClientError> {
        match &self.backend {
            Backend::Table(settings) => table::create(settings, scope, fields).await,
            Backend::Document(settings) => document::create(settings, scope, fields).await,
        }
    }

    /// Patch one field set on an existing record.
    pub async fn update(
        &self,
        scope: &Scope,
        id: &RecordId,
        fields: Fields,
    ) -> Result<Record, ClientError> {
        match &self.backend {
            Backend::Table(settings) => table::update(settings, scope, id, fields).await,
            Backend::Document(settings) => document::update(settings, scope, id, fields).await,
        }
    }
}
