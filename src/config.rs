//! Runtime settings.
//!
//! Settings are layered, later layers winning:
//!
//! 1. built-in defaults
//! 2. the config file (`--config PATH`, or `~/.config/pvetop/pvetop.toml` if present)
//! 3. `PVETOP_*` environment variables (`PVETOP_HOST`, `PVETOP_REFRESH_SECS`, ...)
//! 4. command-line flags ([`Overrides`])
//!
//! A host or token still missing after that is taken from the saved
//! credentials (see [`crate::credentials`]).
//!
//! ```toml
//! host = "pve.lan"
//! token = "root@pam!pvetop=0f0e0d0c-..."
//! refresh_secs = 5
//! verify_tls = true
//! log_file = "/tmp/pvetop.log"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::credentials::{CredentialError, CredentialStore, Credentials};

/// Default Proxmox API port.
pub const DEFAULT_PORT: u16 = 8006;

const ENV_PREFIX: &str = "PVETOP";

fn default_refresh_secs() -> u64 {
    2
}

/// Resolved settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,
    #[serde(default)]
    pub verify_tls: bool,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: None,
            port: None,
            username: None,
            token: None,
            refresh_secs: default_refresh_secs(),
            verify_tls: false,
            log_file: None,
        }
    }
}

impl Settings {
    /// Load defaults, the config file and the environment.
    ///
    /// An explicit `path` must exist; the default location is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::layered(path, None)
    }

    fn layered(
        path: Option<&Path>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        match path {
            Some(path) => builder = builder.add_source(File::from(path).required(true)),
            None => {
                if let Some(default) = default_path() {
                    builder = builder.add_source(File::from(default).required(false));
                }
            }
        }

        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .source(env),
            )
            .build()?;

        config.try_deserialize()
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn refresh(&self) -> Duration {
        Duration::from_secs(self.refresh_secs)
    }

    /// Credentials from the settings, completed from `store` where a host or
    /// token is missing. Explicit settings win over saved values.
    pub fn resolve_credentials(
        &self,
        store: &dyn CredentialStore,
    ) -> Result<Credentials, CredentialError> {
        let stored = if self.host.is_some() && self.token.is_some() {
            None
        } else if store.exists() {
            Some(store.load()?)
        } else {
            None
        };

        let host = self
            .host
            .clone()
            .or_else(|| stored.as_ref().map(|c| c.host.clone()))
            .ok_or(CredentialError::Incomplete("host"))?;
        let token = self
            .token
            .clone()
            .or_else(|| stored.as_ref().map(|c| c.token.clone()))
            .ok_or(CredentialError::Incomplete("token"))?;
        let port = self
            .port
            .or_else(|| stored.as_ref().map(|c| c.port))
            .unwrap_or(DEFAULT_PORT);
        let username = self
            .username
            .clone()
            .or_else(|| stored.map(|c| c.username))
            .unwrap_or_default();

        Ok(Credentials {
            host,
            port,
            username,
            token,
        })
    }
}

/// `~/.config/pvetop/pvetop.toml`
pub fn default_path() -> Option<PathBuf> {
    dirs_next::home_dir().map(|home| home.join(".config").join("pvetop").join("pvetop.toml"))
}

/// Command-line flags layered over the loaded [`Settings`].
#[derive(clap::Args, Debug, Clone, Default)]
pub struct Overrides {
    /// Proxmox host name or address
    #[arg(long)]
    pub host: Option<String>,

    /// Proxmox API port [default: 8006]
    #[arg(long)]
    pub port: Option<u16>,

    /// User the token belongs to (informational)
    #[arg(long)]
    pub username: Option<String>,

    /// API token, `user@realm!tokenid=secret`
    #[arg(long)]
    pub token: Option<String>,

    /// Refresh interval in seconds [default: 2]
    #[arg(short, long = "refresh")]
    pub refresh_secs: Option<u64>,

    /// Verify the server's TLS certificate
    #[arg(long)]
    pub verify_tls: bool,

    /// Write logs to this file (honours RUST_LOG)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Overrides {
    pub fn apply(self, settings: &mut Settings) {
        if let Some(host) = self.host {
            settings.host = Some(host);
        }
        if let Some(port) = self.port {
            settings.port = Some(port);
        }
        if let Some(username) = self.username {
            settings.username = Some(username);
        }
        if let Some(token) = self.token {
            settings.token = Some(token);
        }
        if let Some(secs) = self.refresh_secs {
            settings.refresh_secs = secs;
        }
        if self.verify_tls {
            settings.verify_tls = true;
        }
        if let Some(path) = self.log_file {
            settings.log_file = Some(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn env(vars: &[(&str, &str)]) -> Option<config::Map<String, String>> {
        Some(
            vars.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    fn config_file(content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[derive(Default)]
    struct MemoryStore {
        saved: Option<Credentials>,
        loads: Cell<usize>,
    }

    impl CredentialStore for MemoryStore {
        fn exists(&self) -> bool {
            self.saved.is_some()
        }

        fn load(&self) -> Result<Credentials, CredentialError> {
            self.loads.set(self.loads.get() + 1);
            self.saved
                .clone()
                .ok_or_else(|| CredentialError::Missing(PathBuf::from("memory")))
        }

        fn save(&self, _credentials: &Credentials) -> Result<(), CredentialError> {
            Ok(())
        }

        fn delete(&self) -> Result<(), CredentialError> {
            Ok(())
        }
    }

    fn stored() -> Credentials {
        Credentials {
            host: "saved.lan".to_string(),
            port: 443,
            username: "ops@pve".to_string(),
            token: "ops@pve!t=saved".to_string(),
        }
    }

    #[test]
    fn test_defaults() {
        let file = config_file("");
        let settings = Settings::layered(Some(file.path()), env(&[])).unwrap();

        assert_eq!(settings, Settings::default());
        assert_eq!(settings.port(), 8006);
        assert_eq!(settings.refresh(), Duration::from_secs(2));
        assert!(!settings.verify_tls);
    }

    #[test]
    fn test_file_over_defaults() {
        let file = config_file(
            "host = \"pve.lan\"\nport = 8443\nrefresh_secs = 5\nverify_tls = true\n",
        );
        let settings = Settings::layered(Some(file.path()), env(&[])).unwrap();

        assert_eq!(settings.host.as_deref(), Some("pve.lan"));
        assert_eq!(settings.port(), 8443);
        assert_eq!(settings.refresh_secs, 5);
        assert!(settings.verify_tls);
        assert_eq!(settings.token, None);
    }

    #[test]
    fn test_env_over_file() {
        let file = config_file("host = \"pve.lan\"\nrefresh_secs = 5\n");
        let settings = Settings::layered(
            Some(file.path()),
            env(&[("PVETOP_HOST", "other.lan"), ("PVETOP_REFRESH_SECS", "10")]),
        )
        .unwrap();

        assert_eq!(settings.host.as_deref(), Some("other.lan"));
        assert_eq!(settings.refresh_secs, 10);
    }

    #[test]
    fn test_flags_over_env() {
        let file = config_file("refresh_secs = 5\n");
        let mut settings = Settings::layered(
            Some(file.path()),
            env(&[("PVETOP_HOST", "other.lan"), ("PVETOP_TOKEN", "a@pam!x=1")]),
        )
        .unwrap();

        Overrides {
            host: Some("flag.lan".to_string()),
            refresh_secs: Some(1),
            verify_tls: true,
            ..Default::default()
        }
        .apply(&mut settings);

        assert_eq!(settings.host.as_deref(), Some("flag.lan"));
        assert_eq!(settings.token.as_deref(), Some("a@pam!x=1"));
        assert_eq!(settings.refresh_secs, 1);
        assert!(settings.verify_tls);
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(Settings::layered(Some(&missing), env(&[])).is_err());
    }

    #[test]
    fn test_credentials_from_settings_skip_store() {
        let settings = Settings {
            host: Some("pve.lan".to_string()),
            token: Some("root@pam!t=s".to_string()),
            ..Default::default()
        };
        let store = MemoryStore {
            saved: Some(stored()),
            ..Default::default()
        };

        let creds = settings.resolve_credentials(&store).unwrap();
        assert_eq!(creds.host, "pve.lan");
        assert_eq!(creds.port, 8006);
        assert_eq!(creds.username, "");
        assert_eq!(store.loads.get(), 0);
    }

    #[test]
    fn test_credentials_completed_from_store() {
        let settings = Settings {
            host: Some("pve.lan".to_string()),
            ..Default::default()
        };
        let store = MemoryStore {
            saved: Some(stored()),
            ..Default::default()
        };

        let creds = settings.resolve_credentials(&store).unwrap();
        assert_eq!(creds.host, "pve.lan");
        assert_eq!(creds.token, "ops@pve!t=saved");
        assert_eq!(creds.port, 443);
        assert_eq!(creds.username, "ops@pve");
    }

    #[test]
    fn test_credentials_missing_everywhere() {
        let settings = Settings {
            host: Some("pve.lan".to_string()),
            ..Default::default()
        };
        let err = settings
            .resolve_credentials(&MemoryStore::default())
            .unwrap_err();
        assert!(matches!(err, CredentialError::Incomplete("token")));
    }
}
