//! Credential and settings loading.
//!
//! Resolution order: `~/.tally/config.toml` first, environment variables
//! override. The output is a fully-validated [`Settings`] value; existence
//! of a field is proof of its validity, so nothing downstream carries an
//! `Option` credential. A missing credential is fatal at startup with a
//! message naming the variable to set - no defaults, no fallback keys in
//! source.

mod raw;
mod settings;

pub use settings::{
    ApiKey, Backend, DocumentSettings, IdentitySettings, Settings, TableSettings,
};

use std::env;
use std::path::PathBuf;

use raw::RawConfig;

/// Environment variable names, also used in error messages.
pub mod env_vars {
    pub const BACKEND: &str = "TALLY_BACKEND";
    pub const API_KEY: &str = "TALLY_API_KEY";
    pub const API_URL: &str = "TALLY_API_URL";
    pub const BASE_ID: &str = "TALLY_BASE_ID";
    pub const PROJECT_ID: &str = "TALLY_PROJECT_ID";
    pub const TASKS_TABLE: &str = "TALLY_TASKS_TABLE";
    pub const EXPENSES_TABLE: &str = "TALLY_EXPENSES_TABLE";
    pub const IDENTITY_URL: &str = "TALLY_IDENTITY_URL";
    pub const IDENTITY_KEY: &str = "TALLY_IDENTITY_KEY";
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing credential: set {var} (or [{section}] {key} in {file})", file = "~/.tally/config.toml")]
    CredentialMissing {
        var: &'static str,
        section: &'static str,
        key: &'static str,
    },
    #[error("unknown backend '{0}' (expected 'table' or 'document')")]
    UnknownBackend(String),
}

/// Load and resolve settings from the config file plus the process
/// environment.
pub fn load() -> Result<Settings, ConfigError> {
    let raw = RawConfig::load();
    settings::resolve(raw.unwrap_or_default(), &|var| env::var(var).ok())
}

/// Path of the config file, if a home directory exists.
#[must_use]
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".tally").join("config.toml"))
}

/// Expand `${VAR}` references from the environment.
///
/// Lets the secrets file reference keys without holding them literally,
/// e.g. `api_key = "${AIRTABLE_TOKEN}"`. Unset variables expand to the
/// empty string, which the resolver then reports as missing.
#[must_use]
pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        if let Some(end) = after.find('}') {
            let var = &after[..end];
            if !var.is_empty() {
                out.push_str(&env::var(var).unwrap_or_default());
            }
            rest = &after[end + 1..];
        } else {
            out.push_str(&rest[start..]);
            rest = "";
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::expand_env_vars;

    #[test]
    fn expand_passes_through_plain_strings() {
        assert_eq!(expand_env_vars("plain-key-123"), "plain-key-123");
    }

    #[test]
    fn expand_replaces_known_variable() {
        // PATH is always set in test environments
        let expanded = expand_env_vars("${PATH}");
        assert_eq!(expanded, std::env::var("PATH").unwrap());
    }

    #[test]
    fn expand_unset_variable_is_empty() {
        assert_eq!(expand_env_vars("x${TALLY_DOES_NOT_EXIST_42}y"), "xy");
    }

    #[test]
    fn expand_leaves_unterminated_reference() {
        assert_eq!(expand_env_vars("key-${UNTERMINATED"), "key-${UNTERMINATED");
    }
}
