//! Configuration for the relay server
//!
//! Configuration is loaded in order of precedence:
//! 1. Environment variables (highest priority)
//! 2. Config file (~/.config/admin-relay/config.toml)
//! 3. Built-in defaults (lowest priority)
//!
//! Two values have no default and must be present at startup: the backend
//! origin and the service credential. The credential is accepted from the
//! environment only, never from the config file, so it cannot end up on disk.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;


/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default bind address for the relay server
const DEFAULT_BIND: &str = "127.0.0.1:8787";

/// Default timeout for the outbound call, in seconds.
/// The original relied on transport defaults; we bound it explicitly so a
/// stalled backend cannot hold the connection forever.
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;

/// Application configuration
///
/// Immutable after startup; shared with the handler via `Arc`.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to bind the relay server to
    pub bind_addr: SocketAddr,

    /// Base URL prepended to relative `path` values (e.g. "https://api.example.com")
    pub backend_origin: String,

    /// Service credential injected into every forwarded call
    /// (sent as both `apikey` and `Authorization: Bearer <credential>`)
    pub service_credential: String,

    /// Timeout for the outbound request, in seconds
    pub upstream_timeout_secs: u64,
}

/// Raw config file contents (all fields optional)
///
/// Note the deliberate absence of a credential field: secrets come from the
/// environment only.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub bind_addr: Option<String>,
    pub backend_origin: Option<String>,
    pub upstream_timeout_secs: Option<u64>,
}

/// Environment variable values captured at startup
///
/// Split out from `from_env` so resolution can be tested without mutating
/// process-wide environment state.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub bind_addr: Option<String>,
    pub backend_origin: Option<String>,
    pub service_credential: Option<String>,
    pub upstream_timeout_secs: Option<String>,
}

impl EnvOverrides {
    /// Snapshot the relevant environment variables
    pub fn snapshot() -> Self {
        Self {
            bind_addr: std::env::var("RELAY_BIND").ok(),
            backend_origin: std::env::var("BACKEND_ORIGIN").ok(),
            service_credential: std::env::var("SERVICE_CREDENTIAL").ok(),
            upstream_timeout_secs: std::env::var("RELAY_UPSTREAM_TIMEOUT_SECS").ok(),
        }
    }
}

impl Config {
    /// Path to the config file (~/.config/admin-relay/config.toml)
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("admin-relay").join("config.toml"))
    }

    /// Load the optional config file. A missing file is fine (defaults
    /// apply); a file that exists but fails to parse is a startup error.
    fn load_file_config() -> Result<FileConfig> {
        let Some(path) = Self::config_path() else {
            return Ok(FileConfig::default());
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FileConfig::default()),
            Err(e) => {
                Err(e).with_context(|| format!("Failed to read config file {}", path.display()))
            }
        }
    }

    /// Load configuration: env vars -> file -> defaults.
    ///
    /// Fails fast when the backend origin or service credential is absent,
    /// so the process never serves requests with a missing credential.
    pub fn from_env() -> Result<Self> {
        let file = Self::load_file_config()?;
        Self::resolve(file, EnvOverrides::snapshot())
    }

    /// Resolve a final config from file values and env overrides
    pub fn resolve(file: FileConfig, env: EnvOverrides) -> Result<Self> {
        // Bind address: env > file > default
        let bind_addr = env
            .bind_addr
            .or(file.bind_addr)
            .unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind_addr: SocketAddr = bind_addr
            .parse()
            .with_context(|| format!("Invalid bind address: {bind_addr}"))?;

        // Backend origin: env > file, no default
        let Some(backend_origin) = env.backend_origin.or(file.backend_origin) else {
            bail!("BACKEND_ORIGIN is not set (env var or `backend_origin` in the config file)");
        };

        // Service credential: env only, no default
        let Some(service_credential) = env.service_credential else {
            bail!("SERVICE_CREDENTIAL env var is not set");
        };
        if service_credential.is_empty() {
            bail!("SERVICE_CREDENTIAL is empty");
        }

        // Upstream timeout: env > file > default
        let upstream_timeout_secs = match env.upstream_timeout_secs {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("Invalid RELAY_UPSTREAM_TIMEOUT_SECS: {raw}"))?,
            None => file
                .upstream_timeout_secs
                .unwrap_or(DEFAULT_UPSTREAM_TIMEOUT_SECS),
        };

        Ok(Self {
            bind_addr,
            backend_origin,
            service_credential,
            upstream_timeout_secs,
        })
    }

    /// Render the effective configuration as TOML for `config --show`.
    /// The credential is redacted; it never appears in output.
    pub fn to_toml(&self) -> String {
        format!(
            "bind_addr = \"{}\"\nbackend_origin = \"{}\"\nservice_credential = \"[set via environment]\"\nupstream_timeout_secs = {}\n",
            self.bind_addr, self.backend_origin, self.upstream_timeout_secs
        )
    }
}
