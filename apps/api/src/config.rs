use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::warn;

pub const OPENAI_KEY_NAME: &str = "OPENAI_API_KEY";
pub const ANTHROPIC_KEY_NAME: &str = "ANTHROPIC_API_KEY";

const DEFAULT_SECRETS_FILE: &str = "secrets.toml";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Provider credentials, resolved once at startup and handed to the LLM gateway.
/// Neither key is required: with both absent the gateway runs offline.
#[derive(Debug, Clone, Default)]
pub struct ProviderCredentials {
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
}

impl ProviderCredentials {
    /// Resolves each key from the secrets store first, then from the process environment.
    pub fn resolve(secrets: &HashMap<String, String>) -> Self {
        Self::resolve_with(secrets, |key| std::env::var(key).ok())
    }

    fn resolve_with(
        secrets: &HashMap<String, String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let lookup = |key: &str| {
            secrets
                .get(key)
                .cloned()
                .or_else(|| env(key))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            openai_api_key: lookup(OPENAI_KEY_NAME),
            anthropic_api_key: lookup(ANTHROPIC_KEY_NAME),
        }
    }
}

/// Application configuration loaded from environment variables and the secrets file.
#[derive(Debug, Clone)]
pub struct Config {
    pub secrets_file: PathBuf,
    pub llm_timeout_secs: u64,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let secrets_file = std::env::var("NUCLEA_SECRETS_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_SECRETS_FILE));

        Ok(Config {
            secrets_file,
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", 120)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Reads the secrets file and resolves provider credentials.
    /// Call after logging is initialised so a bad secrets file is reported.
    pub fn resolve_credentials(&self) -> ProviderCredentials {
        ProviderCredentials::resolve(&load_secrets(&self.secrets_file))
    }
}

/// Reads string-valued top-level entries from a TOML secrets file.
/// A missing, unreadable or malformed file yields an empty store, so credential
/// lookup falls through to the environment and then to the offline provider.
pub fn load_secrets(path: &Path) -> HashMap<String, String> {
    match read_secrets(path) {
        Ok(secrets) => secrets,
        Err(e) => {
            warn!("Ignoring secrets file: {e:#}");
            HashMap::new()
        }
    }
}

fn read_secrets(path: &Path) -> Result<HashMap<String, String>> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
        Err(e) => {
            return Err(e)
                .with_context(|| format!("Failed to read secrets file {}", path.display()))
        }
    };

    let table: toml::Table = raw
        .parse()
        .with_context(|| format!("Secrets file {} is not valid TOML", path.display()))?;

    let mut secrets = HashMap::new();
    for (key, value) in table {
        match value {
            toml::Value::String(s) => {
                secrets.insert(key, s);
            }
            _ => warn!("Ignoring non-string secret '{key}' in {}", path.display()),
        }
    }
    Ok(secrets)
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
