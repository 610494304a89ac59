// ABOUTME: Server configuration loaded from the environment
// ABOUTME: Parses and validates TESTDESK_* variables into typed settings with defaults

use std::env;
use std::net::IpAddr;
use std::num::ParseIntError;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use testdesk_ai::{GenerationConfig, DEFAULT_GENERATION_URL};
use testdesk_config::{
    PORT, TESTDESK_CORS_ORIGIN, TESTDESK_DATABASE_PATH, TESTDESK_DB_ACQUIRE_TIMEOUT_SECS,
    TESTDESK_DB_BUSY_TIMEOUT_SECS, TESTDESK_DB_MAX_CONNECTIONS,
    TESTDESK_GENERATION_CONNECT_TIMEOUT_SECS, TESTDESK_GENERATION_TIMEOUT_SECS,
    TESTDESK_GENERATION_URL, TESTDESK_HOST, TESTDESK_MAX_BODY_BYTES, TESTDESK_PORT,
    TESTDESK_TAB_BASE_NAME,
};
use testdesk_core::{default_database_path, DEFAULT_TAB_BASE_NAME};
use testdesk_storage::PoolConfig;
use testdesk_tabs::TabNaming;

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid port number: {0}")]
    InvalidPort(#[from] ParseIntError),
    #[error("Port {0} is out of valid range (1-65535)")]
    PortOutOfRange(u16),
    #[error("Invalid host address: {0}")]
    InvalidHost(String),
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Allowed cross-origin callers
#[derive(Debug, Clone, PartialEq)]
pub enum CorsOrigin {
    Any,
    List(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub database_path: PathBuf,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
    pub db_busy_timeout: Duration,
    pub generation_url: String,
    pub generation_timeout: Duration,
    pub generation_connect_timeout: Duration,
    pub cors_origin: CorsOrigin,
    pub tab_base_name: String,
    pub max_body_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    ///
    /// Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = match get(TESTDESK_PORT).or_else(|| get(PORT)) {
            Some(raw) => raw.parse::<u16>()?,
            None => DEFAULT_PORT,
        };
        if port == 0 {
            return Err(ConfigError::PortOutOfRange(port));
        }

        let host_raw = get(TESTDESK_HOST).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let host = host_raw
            .parse::<IpAddr>()
            .map_err(|_| ConfigError::InvalidHost(host_raw.clone()))?;

        let database_path = get(TESTDESK_DATABASE_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(default_database_path);

        let cors_origin = match get(TESTDESK_CORS_ORIGIN) {
            None => CorsOrigin::Any,
            Some(raw) if raw == "*" => CorsOrigin::Any,
            Some(raw) => CorsOrigin::List(
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            ),
        };

        Ok(Config {
            host,
            port,
            database_path,
            db_max_connections: parse_number(&get, TESTDESK_DB_MAX_CONNECTIONS, 10)?,
            db_acquire_timeout: secs(parse_number(&get, TESTDESK_DB_ACQUIRE_TIMEOUT_SECS, 30)?),
            db_busy_timeout: secs(parse_number(&get, TESTDESK_DB_BUSY_TIMEOUT_SECS, 30)?),
            generation_url: get(TESTDESK_GENERATION_URL)
                .unwrap_or_else(|| DEFAULT_GENERATION_URL.to_string()),
            generation_timeout: secs(parse_number(&get, TESTDESK_GENERATION_TIMEOUT_SECS, 120)?),
            generation_connect_timeout: secs(parse_number(
                &get,
                TESTDESK_GENERATION_CONNECT_TIMEOUT_SECS,
                5,
            )?),
            cors_origin,
            tab_base_name: get(TESTDESK_TAB_BASE_NAME)
                .unwrap_or_else(|| DEFAULT_TAB_BASE_NAME.to_string()),
            max_body_bytes: parse_number(&get, TESTDESK_MAX_BODY_BYTES, DEFAULT_MAX_BODY_BYTES)?,
        })
    }

    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            database_path: self.database_path.clone(),
            max_connections: self.db_max_connections,
            acquire_timeout: self.db_acquire_timeout,
            busy_timeout: self.db_busy_timeout,
        }
    }

    pub fn generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            url: self.generation_url.clone(),
            timeout: self.generation_timeout,
            connect_timeout: self.generation_connect_timeout,
        }
    }

    pub fn tab_naming(&self) -> TabNaming {
        TabNaming::new(self.tab_base_name.clone())
    }
}

fn parse_number<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
        None => Ok(default),
    }
}

fn secs(value: u64) -> Duration {
    Duration::from_secs(value)
}
