use std::fmt;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{ExportError, Result};

pub const DB_HOST: &str = "DB_IP_MOR";
pub const DB_PORT: &str = "DB_PORT_MOR";
pub const DB_NAME: &str = "DB_NAME_MOR";
pub const DB_USER: &str = "DB_USER_MOR";
pub const DB_PASS: &str = "DB_PASS_MOR";
pub const SSH_HOST: &str = "DB_SSH_IP_MOR";
pub const SSH_PORT: &str = "DB_SSH_PORT_MOR";
pub const SSH_USER: &str = "DB_SSH_USER_MOR";
pub const SSH_KEY: &str = "DB_SSH_KEY_MOR";
pub const SSH_KEY_PASS: &str = "DB_SSH_KEY_PASS_MOR";
pub const SSH_KNOWN_HOSTS: &str = "DB_SSH_KNOWN_HOSTS_MOR";

/// Jump host the database is reached through.
#[derive(Clone)]
pub struct SshSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub key_path: PathBuf,
    pub key_passphrase: Option<String>,
    /// OpenSSH known_hosts file. Without one, any host key is accepted.
    pub known_hosts: Option<PathBuf>,
}

impl SshSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Debug for SshSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SshSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("key_path", &self.key_path)
            .field("key_passphrase", &self.key_passphrase.as_ref().map(|_| "***"))
            .field("known_hosts", &self.known_hosts)
            .finish()
    }
}

/// Database endpoint as seen from the jump host.
#[derive(Clone)]
pub struct DatabaseSettings {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
}

impl DatabaseSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

/// Everything needed to reach one MOR database. Built once per run.
#[derive(Debug, Clone)]
pub struct ConnectionProfile {
    pub ssh: SshSettings,
    pub database: DatabaseSettings,
}

impl ConnectionProfile {
    /// Reads the profile from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the profile from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or_else(|| ExportError::Config(format!("{key} must be set")))
        };
        let optional = |key: &str| -> Option<String> {
            lookup(key).filter(|value| !value.trim().is_empty())
        };
        let port = |key: &str| -> Result<u16> {
            let raw = required(key)?;
            raw.parse().map_err(|_| {
                ExportError::Config(format!("{key} must be a port number, got '{raw}'"))
            })
        };

        let ssh = SshSettings {
            host: required(SSH_HOST)?,
            port: port(SSH_PORT)?,
            user: required(SSH_USER)?,
            key_path: PathBuf::from(required(SSH_KEY)?),
            key_passphrase: optional(SSH_KEY_PASS),
            known_hosts: optional(SSH_KNOWN_HOSTS).map(PathBuf::from),
        };
        let database = DatabaseSettings {
            host: required(DB_HOST)?,
            port: port(DB_PORT)?,
            name: required(DB_NAME)?,
            user: required(DB_USER)?,
            password: lookup(DB_PASS).unwrap_or_default(),
        };

        Ok(Self { ssh, database })
    }
}

/// Loads a dotenv file into the process environment.
///
/// With an explicit `path` the file must exist. Otherwise `.env` is looked up
/// from the working directory and its absence is not an error.
pub fn load_dotenv(path: Option<&Path>) -> Result<Option<PathBuf>> {
    let loaded = match path {
        Some(path) => dotenvy::from_path(path)
            .map(|_| Some(path.to_path_buf()))
            .map_err(|err| {
                ExportError::Config(format!("failed to load {}: {err}", path.display()))
            })?,
        None => match dotenvy::dotenv() {
            Ok(found) => Some(found),
            Err(err) if err.not_found() => None,
            Err(err) => return Err(ExportError::Config(format!("failed to load .env: {err}"))),
        },
    };

    if let Some(file) = &loaded {
        info!(config = %file.display(), "using config file");
    }
    Ok(loaded)
}
