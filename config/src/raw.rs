//! Raw TOML deserialization structs.
//!
//! Everything here is `Option`; validation happens in [`crate::settings`]
//! at the resolve boundary. A file that fails to read or parse is logged
//! and ignored - the environment alone can still carry a full config.

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawConfig {
    pub backend: Option<RawBackend>,
    pub table: Option<RawTable>,
    pub document: Option<RawDocument>,
    pub identity: Option<RawIdentity>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawBackend {
    pub kind: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawTable {
    pub api_key: Option<String>,
    pub api_url: Option<String>,
    pub base_id: Option<String>,
    pub tasks_table: Option<String>,
    pub expenses_table: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawDocument {
    pub api_key: Option<String>,
    pub api_url: Option<String>,
    pub project_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawIdentity {
    pub url: Option<String>,
    pub api_key: Option<String>,
}

impl RawConfig {
    pub(crate) fn load() -> Option<Self> {
        Self::load_from(&crate::config_path()?)
    }

    pub(crate) fn load_from(path: &std::path::Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return None;
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Some(config),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RawConfig;
    use std::io::Write;

    #[test]
    fn load_from_reads_partial_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"[table]\nbase_id = \"appXYZ\"\n")
            .unwrap();

        let raw = RawConfig::load_from(&path).unwrap();
        assert_eq!(raw.table.unwrap().base_id.as_deref(), Some("appXYZ"));
        assert!(raw.identity.is_none());
    }

    #[test]
    fn load_from_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(RawConfig::load_from(&dir.path().join("nope.toml")).is_none());
    }

    #[test]
    fn load_from_unparseable_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not toml {{{{").unwrap();
        assert!(RawConfig::load_from(&path).is_none());
    }
}
