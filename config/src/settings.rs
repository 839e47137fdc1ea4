//! Resolved, validated settings.
//!
//! Raw TOML structs (all `Option`) stay in [`crate::raw`]; the resolver
//! turns them plus the environment into these types. Every field present
//! here is non-empty.

use tally_types::Scope;

use crate::raw::RawConfig;
use crate::{ConfigError, env_vars, expand_env_vars};

const TABLE_API_URL: &str = "https://api.airtable.com";
const DOCUMENT_API_URL: &str = "https://firestore.googleapis.com";
const DEFAULT_TASKS_TABLE: &str = "tasks";
const DEFAULT_EXPENSES_TABLE: &str = "expenses";

/// Backend API key. `Debug` is redacted so it can never leak into logs.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    #[must_use]
    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Table-service credentials (bearer token plus base).
#[derive(Debug, Clone)]
pub struct TableSettings {
    pub api_key: ApiKey,
    pub api_url: String,
    pub base_id: String,
}

/// Document-database credentials (token plus project).
#[derive(Debug, Clone)]
pub struct DocumentSettings {
    pub api_key: ApiKey,
    pub api_url: String,
    pub project_id: String,
}

/// Identity-provider endpoint.
#[derive(Debug, Clone)]
pub struct IdentitySettings {
    pub url: String,
    pub api_key: ApiKey,
}

/// Which hosted backend holds the records.
#[derive(Debug, Clone)]
pub enum Backend {
    Table(TableSettings),
    Document(DocumentSettings),
}

impl Backend {
    /// The base identifier scoping both record tables.
    #[must_use]
    pub fn base(&self) -> &str {
        match self {
            Backend::Table(t) => &t.base_id,
            Backend::Document(d) => &d.project_id,
        }
    }
}

/// Fully-resolved application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    backend: Backend,
    identity: IdentitySettings,
    tasks: Scope,
    expenses: Scope,
}

impl Settings {
    #[must_use]
    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    #[must_use]
    pub fn identity(&self) -> &IdentitySettings {
        &self.identity
    }

    #[must_use]
    pub fn tasks(&self) -> &Scope {
        &self.tasks
    }

    #[must_use]
    pub fn expenses(&self) -> &Scope {
        &self.expenses
    }
}

/// Environment first, then the (env-expanded) file value. Empty strings
/// count as absent, so `api_key = "${UNSET_VAR}"` is reported missing.
fn pick(
    lookup: &dyn Fn(&str) -> Option<String>,
    var: &'static str,
    file_value: Option<&String>,
) -> Option<String> {
    lookup(var)
        .or_else(|| file_value.map(|v| expand_env_vars(v)))
        .filter(|v| !v.trim().is_empty())
}

fn require(
    lookup: &dyn Fn(&str) -> Option<String>,
    var: &'static str,
    section: &'static str,
    key: &'static str,
    file_value: Option<&String>,
) -> Result<String, ConfigError> {
    pick(lookup, var, file_value).ok_or(ConfigError::CredentialMissing { var, section, key })
}

pub(crate) fn resolve(
    raw: RawConfig,
    lookup: &dyn Fn(&str) -> Option<String>,
) -> Result<Settings, ConfigError> {
    let kind = pick(
        lookup,
        env_vars::BACKEND,
        raw.backend.as_ref().and_then(|b| b.kind.as_ref()),
    )
    .unwrap_or_else(|| "table".to_string());

    let table = raw.table.unwrap_or_default();
    let document = raw.document.unwrap_or_default();

    let backend = match kind.trim().to_ascii_lowercase().as_str() {
        "table" | "airtable" => {
            let api_key = require(
                lookup,
                env_vars::API_KEY,
                "table",
                "api_key",
                table.api_key.as_ref(),
            )?;
            let base_id = require(
                lookup,
                env_vars::BASE_ID,
                "table",
                "base_id",
                table.base_id.as_ref(),
            )?;
            let api_url = pick(lookup, env_vars::API_URL, table.api_url.as_ref())
                .unwrap_or_else(|| TABLE_API_URL.to_string());
            Backend::Table(TableSettings {
                api_key: ApiKey::new(api_key),
                api_url,
                base_id,
            })
        }
        "document" | "firestore" => {
            let api_key = require(
                lookup,
                env_vars::API_KEY,
                "document",
                "api_key",
                document.api_key.as_ref(),
            )?;
            let project_id = require(
                lookup,
                env_vars::PROJECT_ID,
                "document",
                "project_id",
                document.project_id.as_ref(),
            )?;
            let api_url = pick(lookup, env_vars::API_URL, document.api_url.as_ref())
                .unwrap_or_else(|| DOCUMENT_API_URL.to_string());
            Backend::Document(DocumentSettings {
                api_key: ApiKey::new(api_key),
                api_url,
                project_id,
            })
        }
        other => return Err(ConfigError::UnknownBackend(other.to_string())),
    };

    let identity_raw = raw.identity.unwrap_or_default();
    let identity_url = require(
        lookup,
        env_vars::IDENTITY_URL,
        "identity",
        "url",
        identity_raw.url.as_ref(),
    )?;
    let identity_key = require(
        lookup,
        env_vars::IDENTITY_KEY,
        "identity",
        "api_key",
        identity_raw.api_key.as_ref(),
    )?;

    let tasks_table = pick(lookup, env_vars::TASKS_TABLE, table.tasks_table.as_ref())
        .unwrap_or_else(|| DEFAULT_TASKS_TABLE.to_string());
    let expenses_table = pick(
        lookup,
        env_vars::EXPENSES_TABLE,
        table.expenses_table.as_ref(),
    )
    .unwrap_or_else(|| DEFAULT_EXPENSES_TABLE.to_string());

    let base = backend.base().to_string();
    Ok(Settings {
        backend,
        identity: IdentitySettings {
            url: identity_url,
            api_key: ApiKey::new(identity_key),
        },
        tasks: Scope::new(base.clone(), tasks_table),
        expenses: Scope::new(base, expenses_table),
    })
}
