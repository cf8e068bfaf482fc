//! The persisted credential record: a single API key, stored in the app's
//! config directory and sealed at rest by the [`SecretStore`].
//!
//! The key is written by the settings flow only; the generation flow reads
//! it once per request and never logs it in full.

use super::secrets::SecretStore;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CREDENTIALS_FILE: &str = "credentials.toml";

#[derive(Debug, Default, Serialize, Deserialize)]
struct CredentialRecord {
    #[serde(default)]
    api_key: String,
}

pub struct CredentialStore {
    root: PathBuf,
    secrets: SecretStore,
}

impl CredentialStore {
    pub fn new(root: &Path, encrypt: bool) -> Self {
        Self {
            root: root.to_path_buf(),
            secrets: SecretStore::new(root, encrypt),
        }
    }

    fn record_path(&self) -> PathBuf {
        self.root.join(CREDENTIALS_FILE)
    }

    /// Store (or replace) the API key.
    pub fn store_api_key(&self, api_key: &str) -> Result<(), ConfigError> {
        fs::create_dir_all(&self.root)?;

        let record = CredentialRecord {
            api_key: self
                .secrets
                .encrypt(api_key.trim())
                .map_err(|e| ConfigError::Credentials(e.to_string()))?,
        };
        let toml_str = toml::to_string_pretty(&record)
            .map_err(|e| ConfigError::Credentials(e.to_string()))?;
        fs::write(self.record_path(), toml_str)?;
        Ok(())
    }

    /// Load the stored API key, if one has been configured.
    pub fn load_api_key(&self) -> Result<Option<String>, ConfigError> {
        let path = self.record_path();
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&path)?;
        let record: CredentialRecord =
            toml::from_str(&contents).map_err(|e| ConfigError::Credentials(e.to_string()))?;
        if record.api_key.is_empty() {
            return Ok(None);
        }

        let api_key = self
            .secrets
            .decrypt(&record.api_key)
            .map_err(|e| ConfigError::Credentials(e.to_string()))?;
        Ok(Some(api_key))
    }

    /// Remove the stored credential.
    pub fn clear(&self) -> Result<(), ConfigError> {
        let path = self.record_path();
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Masked rendering for display: first and last few characters only.
    pub fn masked(api_key: &str) -> String {
        let chars: Vec<char> = api_key.chars().collect();
        if chars.len() <= 8 {
            return "*".repeat(chars.len());
        }
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}{}{tail}", "*".repeat(chars.len() - 8))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn store_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path(), true);

        store.store_api_key("AIza-round-trip-key").unwrap();
        assert_eq!(
            store.load_api_key().unwrap().as_deref(),
            Some("AIza-round-trip-key")
        );
    }

    #[test]
    fn key_is_sealed_on_disk() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path(), true);

        store.store_api_key("AIza-sealed-key").unwrap();
        let on_disk = std::fs::read_to_string(dir.path().join(CREDENTIALS_FILE)).unwrap();
        assert!(!on_disk.contains("AIza-sealed-key"));
        assert!(on_disk.contains("ENC:"));
    }

    #[test]
    fn missing_record_loads_as_none() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path(), true);
        assert_eq!(store.load_api_key().unwrap(), None);
    }

    #[test]
    fn clear_removes_the_record() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path(), true);

        store.store_api_key("AIza-temp").unwrap();
        store.clear().unwrap();
        assert_eq!(store.load_api_key().unwrap(), None);
    }

    #[test]
    fn stored_key_is_trimmed() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path(), false);

        store.store_api_key("  AIza-padded \n").unwrap();
        assert_eq!(store.load_api_key().unwrap().as_deref(), Some("AIza-padded"));
    }

    #[test]
    fn masked_hides_the_middle() {
        assert_eq!(CredentialStore::masked("AIzaSyExampleKey"), "AIza********eKey");
        assert_eq!(CredentialStore::masked("short"), "*****");
    }
}
