//! Encryption-at-rest for the stored credential.
//!
//! Values are sealed with ChaCha20-Poly1305 under a per-install key kept
//! next to the credential file (owner-only permissions). Encrypted values
//! are stored as `ENC:` followed by hex(nonce || ciphertext), so plaintext
//! values written by older installs still round-trip.

use anyhow::{Context, Result};
use chacha20poly1305::{
    ChaCha20Poly1305, KeyInit, Nonce,
    aead::{Aead, OsRng, rand_core::RngCore},
};
use std::fs;
use std::path::{Path, PathBuf};
use zeroize::Zeroize;

const KEY_FILE: &str = ".credential_key";
const ENC_PREFIX: &str = "ENC:";
const NONCE_LEN: usize = 12;
const KEY_LEN: usize = 32;

pub struct SecretStore {
    root: PathBuf,
    encrypt: bool,
}

impl SecretStore {
    pub fn new(root: &Path, encrypt: bool) -> Self {
        Self {
            root: root.to_path_buf(),
            encrypt,
        }
    }

    /// Returns `true` if the value has already been sealed.
    #[must_use]
    pub fn is_encrypted(value: &str) -> bool {
        value.starts_with(ENC_PREFIX)
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        if !self.encrypt || plaintext.is_empty() || Self::is_encrypted(plaintext) {
            return Ok(plaintext.to_string());
        }

        let mut key = self.load_or_create_key()?;
        let cipher = ChaCha20Poly1305::new_from_slice(&key).context("invalid key length")?;
        key.zeroize();

        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| anyhow::anyhow!("encryption failed: {e}"))?;

        let mut sealed = nonce_bytes.to_vec();
        sealed.extend_from_slice(&ciphertext);
        Ok(format!("{ENC_PREFIX}{}", hex::encode(sealed)))
    }

    pub fn decrypt(&self, value: &str) -> Result<String> {
        let Some(hex_payload) = value.strip_prefix(ENC_PREFIX) else {
            return Ok(value.to_string());
        };

        let sealed = hex::decode(hex_payload).context("invalid hex in encrypted value")?;
        if sealed.len() < NONCE_LEN {
            anyhow::bail!("encrypted value too short");
        }
        let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_LEN);

        let mut key = self.load_or_create_key()?;
        let cipher = ChaCha20Poly1305::new_from_slice(&key).context("invalid key length")?;
        key.zeroize();

        let plaintext = cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|e| anyhow::anyhow!("decryption failed: {e}"))?;

        String::from_utf8(plaintext).context("decrypted value is not valid UTF-8")
    }

    fn key_path(&self) -> PathBuf {
        self.root.join(KEY_FILE)
    }

    fn load_or_create_key(&self) -> Result<Vec<u8>> {
        let path = self.key_path();
        if path.exists() {
            return Self::read_key(&path);
        }

        let mut key = vec![0u8; KEY_LEN];
        OsRng.fill_bytes(&mut key);
        match Self::write_new_key(&path, &key) {
            Ok(()) => Ok(key),
            // Lost a creation race with another process; use the winner's key.
            Err(error)
                if error
                    .downcast_ref::<std::io::Error>()
                    .is_some_and(|io| io.kind() == std::io::ErrorKind::AlreadyExists) =>
            {
                Self::read_key(&path)
            }
            Err(error) => Err(error),
        }
    }

    fn read_key(path: &Path) -> Result<Vec<u8>> {
        let key = fs::read(path).context("failed to read key file")?;
        if key.len() != KEY_LEN {
            anyhow::bail!("key file has invalid length (expected {KEY_LEN} bytes)");
        }
        Ok(key)
    }

    fn write_new_key(path: &Path, key: &[u8]) -> Result<()> {
        #[cfg(unix)]
        {
            use std::io::Write;
            use std::os::unix::fs::OpenOptionsExt;

            let mut file = fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .mode(0o600)
                .open(path)
                .context("failed to create key file")?;
            file.write_all(key).context("failed to write key file")?;
            file.sync_all().context("failed to sync key file")?;
        }

        #[cfg(not(unix))]
        {
            fs::write(path, key).context("failed to write key file")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn encrypt_decrypt_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = SecretStore::new(dir.path(), true);

        let plaintext = "AIza-test-key-12345";
        let sealed = store.encrypt(plaintext).unwrap();
        assert!(SecretStore::is_encrypted(&sealed));
        assert_ne!(sealed, plaintext);

        assert_eq!(store.decrypt(&sealed).unwrap(), plaintext);
    }

    #[test]
    fn passthrough_when_encryption_disabled() {
        let dir = TempDir::new().unwrap();
        let store = SecretStore::new(dir.path(), false);
        assert_eq!(store.encrypt("plain-key").unwrap(), "plain-key");
    }

    #[test]
    fn decrypt_plaintext_returns_as_is() {
        let dir = TempDir::new().unwrap();
        let store = SecretStore::new(dir.path(), true);
        assert_eq!(store.decrypt("not-sealed").unwrap(), "not-sealed");
    }

    #[test]
    fn encrypting_twice_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = SecretStore::new(dir.path(), true);
        let sealed = store.encrypt("value").unwrap();
        assert_eq!(store.encrypt(&sealed).unwrap(), sealed);
    }

    #[cfg(unix)]
    #[test]
    fn key_file_permissions_are_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = SecretStore::new(dir.path(), true);
        let _ = store.encrypt("value").unwrap();

        let metadata = std::fs::metadata(dir.path().join(KEY_FILE)).unwrap();
        assert_eq!(metadata.permissions().mode() & 0o777, 0o600);
    }

    #[test]
    fn is_encrypted_detects_prefix() {
        assert!(SecretStore::is_encrypted("ENC:abcdef1234"));
        assert!(!SecretStore::is_encrypted("plaintext"));
        assert!(!SecretStore::is_encrypted(""));
    }
}
