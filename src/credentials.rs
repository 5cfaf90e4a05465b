//! Local credential persistence.
//!
//! Credentials are kept in `~/.config/pvetop/config.enc`, encrypted with
//! AES-256-GCM under a key derived from the machine identity
//! (`hostname:home:os`). The file is only readable on the machine and by the
//! user that wrote it:
//!
//! ```json
//! {"data": "<base64 ciphertext+tag>", "iv": "<base64 nonce>"}
//! ```

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN};
use ring::digest::{digest, SHA256};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Connection details for a Proxmox cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub host: String,
    pub port: u16,
    /// Informational; the token already names its user.
    #[serde(default)]
    pub username: String,
    /// Full API token, `user@realm!tokenid=secret`.
    pub token: String,
}

/// Errors from loading or storing credentials.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("No saved credentials at {0}")]
    Missing(PathBuf),

    #[error("Could not determine home directory")]
    NoHome,

    #[error("Credential file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed credential file: {0}")]
    Format(String),

    #[error("Failed to encrypt credentials")]
    Encrypt,

    #[error("Failed to decrypt credentials (wrong machine or tampered file)")]
    Decrypt,

    #[error("No {0} configured; pass --{0} or save credentials first")]
    Incomplete(&'static str),
}

/// Persistent storage for [`Credentials`].
pub trait CredentialStore {
    fn exists(&self) -> bool;
    fn load(&self) -> Result<Credentials, CredentialError>;
    fn save(&self, credentials: &Credentials) -> Result<(), CredentialError>;
    /// Remove stored credentials. Deleting nothing is not an error.
    fn delete(&self) -> Result<(), CredentialError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    data: String,
    iv: String,
}

/// Credential store backed by an encrypted JSON file.
pub struct EncryptedFileStore {
    path: PathBuf,
    key: [u8; 32],
}

impl std::fmt::Debug for EncryptedFileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptedFileStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl EncryptedFileStore {
    pub fn new(path: impl Into<PathBuf>, key: [u8; 32]) -> Self {
        Self {
            path: path.into(),
            key,
        }
    }

    /// `~/.config/pvetop/config.enc` under the machine key.
    pub fn default_location() -> Result<Self, CredentialError> {
        let home = dirs_next::home_dir().ok_or(CredentialError::NoHome)?;
        let path = home.join(".config").join("pvetop").join("config.enc");
        Ok(Self::new(path, machine_key()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn cipher(&self) -> Result<LessSafeKey, CredentialError> {
        let key = UnboundKey::new(&AES_256_GCM, &self.key).map_err(|_| CredentialError::Encrypt)?;
        Ok(LessSafeKey::new(key))
    }

    fn seal(&self, plaintext: &[u8]) -> Result<Envelope, CredentialError> {
        let mut iv = [0u8; NONCE_LEN];
        SystemRandom::new()
            .fill(&mut iv)
            .map_err(|_| CredentialError::Encrypt)?;

        let mut data = plaintext.to_vec();
        self.cipher()?
            .seal_in_place_append_tag(Nonce::assume_unique_for_key(iv), Aad::empty(), &mut data)
            .map_err(|_| CredentialError::Encrypt)?;

        Ok(Envelope {
            data: STANDARD.encode(&data),
            iv: STANDARD.encode(iv),
        })
    }

    fn open(&self, envelope: &Envelope) -> Result<Vec<u8>, CredentialError> {
        let mut data = STANDARD
            .decode(&envelope.data)
            .map_err(|e| CredentialError::Format(e.to_string()))?;
        let iv = STANDARD
            .decode(&envelope.iv)
            .map_err(|e| CredentialError::Format(e.to_string()))?;
        let nonce =
            Nonce::try_assume_unique_for_key(&iv).map_err(|_| CredentialError::Decrypt)?;

        let plaintext = self
            .cipher()?
            .open_in_place(nonce, Aad::empty(), &mut data)
            .map_err(|_| CredentialError::Decrypt)?;
        Ok(plaintext.to_vec())
    }
}

impl CredentialStore for EncryptedFileStore {
    fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn load(&self) -> Result<Credentials, CredentialError> {
        if !self.exists() {
            return Err(CredentialError::Missing(self.path.clone()));
        }
        let content = fs::read_to_string(&self.path)?;
        let envelope: Envelope =
            serde_json::from_str(&content).map_err(|e| CredentialError::Format(e.to_string()))?;
        let plaintext = self.open(&envelope)?;
        serde_json::from_slice(&plaintext).map_err(|e| CredentialError::Format(e.to_string()))
    }

    fn save(&self, credentials: &Credentials) -> Result<(), CredentialError> {
        let plaintext =
            serde_json::to_vec(credentials).map_err(|e| CredentialError::Format(e.to_string()))?;
        let envelope = self.seal(&plaintext)?;
        let json =
            serde_json::to_string(&envelope).map_err(|e| CredentialError::Format(e.to_string()))?;

        if let Some(dir) = self.path.parent() {
            create_private_dir(dir)?;
        }
        let mut file = open_private_file(&self.path)?;
        file.write_all(json.as_bytes())?;
        tracing::info!(path = %self.path.display(), "credentials saved");
        Ok(())
    }

    fn delete(&self) -> Result<(), CredentialError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!(path = %self.path.display(), "credentials deleted");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(unix)]
fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new().recursive(true).mode(0o700).create(dir)
}

#[cfg(not(unix))]
fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dir)
}

#[cfg(unix)]
fn open_private_file(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;
    fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_private_file(path: &Path) -> std::io::Result<fs::File> {
    fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
}

/// Key derived from this machine's identity.
pub fn machine_key() -> [u8; 32] {
    let home = dirs_next::home_dir()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "unknown".to_string());
    derive_key(&format!("{}:{}:{}", hostname(), home, std::env::consts::OS))
}

fn derive_key(machine_id: &str) -> [u8; 32] {
    let hash = digest(&SHA256, machine_id.as_bytes());
    let mut key = [0u8; 32];
    key.copy_from_slice(hash.as_ref());
    key
}

fn hostname() -> String {
    if let Ok(name) = std::env::var("HOSTNAME") {
        if !name.is_empty() {
            return name;
        }
    }
    ["/proc/sys/kernel/hostname", "/etc/hostname"]
        .iter()
        .filter_map(|p| fs::read_to_string(p).ok())
        .map(|s| s.trim().to_string())
        .find(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample() -> Credentials {
        Credentials {
            host: "pve.lan".to_string(),
            port: 8006,
            username: "root@pam".to_string(),
            token: "root@pam!pvetop=0f0e0d0c".to_string(),
        }
    }

    #[test]
    fn test_round_trip_through_encryption() {
        let dir = tempdir().unwrap();
        let store = EncryptedFileStore::new(dir.path().join("pvetop/config.enc"), derive_key("a"));

        assert!(!store.exists());
        store.save(&sample()).unwrap();
        assert!(store.exists());
        assert_eq!(store.load().unwrap(), sample());

        // the token never hits the disk in clear text
        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(!raw.contains("0f0e0d0c"));
        assert!(raw.contains("\"iv\""));
    }

    #[test]
    fn test_tampered_ciphertext_is_rejected() {
        let dir = tempdir().unwrap();
        let store = EncryptedFileStore::new(dir.path().join("config.enc"), derive_key("a"));
        store.save(&sample()).unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        let mut envelope: Envelope = serde_json::from_str(&raw).unwrap();
        let mut data = STANDARD.decode(&envelope.data).unwrap();
        data[0] ^= 0x01;
        envelope.data = STANDARD.encode(&data);
        fs::write(store.path(), serde_json::to_string(&envelope).unwrap()).unwrap();

        assert!(matches!(store.load(), Err(CredentialError::Decrypt)));
    }

    #[test]
    fn test_other_machine_key_cannot_decrypt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.enc");
        EncryptedFileStore::new(&path, derive_key("host-a:/home/a:linux"))
            .save(&sample())
            .unwrap();

        let other = EncryptedFileStore::new(&path, derive_key("host-b:/home/b:linux"));
        assert!(matches!(other.load(), Err(CredentialError::Decrypt)));
    }

    #[test]
    fn test_garbage_file_is_format_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.enc");
        fs::write(&path, "not json").unwrap();

        let store = EncryptedFileStore::new(&path, derive_key("a"));
        assert!(matches!(store.load(), Err(CredentialError::Format(_))));
    }

    #[test]
    fn test_missing_and_delete() {
        let dir = tempdir().unwrap();
        let store = EncryptedFileStore::new(dir.path().join("config.enc"), derive_key("a"));

        assert!(matches!(store.load(), Err(CredentialError::Missing(_))));
        store.delete().unwrap();

        store.save(&sample()).unwrap();
        store.delete().unwrap();
        assert!(!store.exists());
    }

    #[test]
    fn test_key_derivation_is_stable() {
        assert_eq!(derive_key("x:y:z"), derive_key("x:y:z"));
        assert_ne!(derive_key("x:y:z"), derive_key("x:y:w"));
    }

    #[cfg(unix)]
    #[test]
    fn test_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let store = EncryptedFileStore::new(dir.path().join("sub/config.enc"), derive_key("a"));
        store.save(&sample()).unwrap();

        let file_mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(file_mode & 0o777, 0o600);
        let dir_mode = fs::metadata(dir.path().join("sub")).unwrap().permissions().mode();
        assert_eq!(dir_mode & 0o777, 0o700);
    }
}
