//! Server settings, session key loading, and the server configuration object.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use actix_web::cookie::{Key, SameSite};
use ortho_config::OrthoConfig;
use serde::Deserialize;
use tracing::warn;
use zeroize::Zeroize;

use farm_backend::domain::ProtectedRoles;
use farm_backend::outbound::persistence::DbPool;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const SESSION_KEY_DEFAULT_PATH: &str = "/var/run/secrets/session_key";
const SESSION_KEY_MIN_LEN: usize = 64;

/// Settings loaded from `FARM_*` environment variables, configuration files
/// and the command line.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "FARM")]
pub struct FarmSettings {
    /// Socket address the HTTP server listens on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; the in-memory store is used when absent.
    pub database_url: Option<String>,
    /// Maximum number of pooled database connections.
    pub db_pool_size: Option<u32>,
    /// Comma-separated role names that can never be deleted.
    pub protected_roles: Option<String>,
    /// File holding the session signing key.
    pub session_key_file: Option<PathBuf>,
    /// Mark the session cookie `Secure`.
    #[ortho_config(default = true)]
    pub cookie_secure: bool,
}

impl FarmSettings {
    /// Parsed bind address, defaulting to `0.0.0.0:8080`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBindAddr`] when the value is not a
    /// socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|_| ConfigError::InvalidBindAddr {
            value: raw.to_owned(),
        })
    }

    /// Configured protected roles, or the administrator role alone.
    pub fn protected_roles(&self) -> ProtectedRoles {
        self.protected_roles
            .as_deref()
            .map(ProtectedRoles::parse)
            .unwrap_or_default()
    }

    /// Session key path, defaulting to the mounted secret.
    pub fn session_key_file(&self) -> PathBuf {
        self.session_key_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(SESSION_KEY_DEFAULT_PATH))
    }
}

/// Build mode for session key validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds fall back to an ephemeral key.
    Debug,
    /// Release builds require a readable key of adequate length.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }
}

/// Errors raised while turning settings into a server configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The bind address could not be parsed.
    #[error("invalid bind address '{value}'")]
    InvalidBindAddr { value: String },
    /// Reading the session key file failed.
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The session key is too short for release builds.
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
}

/// Load the session signing key from `path`.
///
/// Debug builds fall back to a random key when the file is unreadable, so
/// sessions do not survive a restart.
///
/// # Errors
///
/// In release builds, returns [`ConfigError::KeyRead`] or
/// [`ConfigError::KeyTooShort`].
pub fn load_session_key(path: &Path, mode: BuildMode) -> Result<Key, ConfigError> {
    match std::fs::read(path) {
        Ok(mut bytes) => {
            let length = bytes.len();
            if mode == BuildMode::Release && length < SESSION_KEY_MIN_LEN {
                bytes.zeroize();
                return Err(ConfigError::KeyTooShort {
                    path: path.to_path_buf(),
                    length,
                    min_len: SESSION_KEY_MIN_LEN,
                });
            }
            let key = Key::derive_from(&bytes);
            bytes.zeroize();
            Ok(key)
        }
        Err(error) if mode == BuildMode::Debug => {
            warn!(
                path = %path.display(),
                error = %error,
                "using temporary session key (dev only)"
            );
            Ok(Key::generate())
        }
        Err(error) => Err(ConfigError::KeyRead {
            path: path.to_path_buf(),
            source: error,
        }),
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) protected_roles: ProtectedRoles,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    /// Construct a server configuration backed by the in-memory store.
    pub fn new(key: Key, cookie_secure: bool, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site: SameSite::Lax,
            bind_addr,
            protected_roles: ProtectedRoles::default(),
            db_pool: None,
        }
    }

    /// Roles the role and user managers refuse to delete.
    #[must_use]
    pub fn with_protected_roles(mut self, protected_roles: ProtectedRoles) -> Self {
        self.protected_roles = protected_roles;
        self
    }

    /// Attach a database pool; the Diesel adapters replace the in-memory
    /// store.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }
}
