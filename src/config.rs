use std::path::Path;

use anyhow::{anyhow, Context, Error};
use serde::{Deserialize, Serialize};

const DEFAULT_CONFIG_PATH: &str = "config.ron";
const DEFAULT_DATABASE: &str = "hue";
const DEFAULT_LISTEN: &str = "0.0.0.0:80";
const DEFAULT_BRIDGE_TIMEOUT_MS: u64 = 5000;

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Config {
    pub bridge: BridgeConfig,
    pub database: DatabaseConfig,
    #[serde(default = "default_listen")]
    pub listen: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct BridgeConfig {
    /// Bridge IP address or host name
    pub address: String,
    /// Whitelisted API user ("access key")
    pub user: String,
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct DatabaseConfig {
    pub host: String,
    pub user: String,
    pub password: String,
    #[serde(default = "default_database")]
    pub name: String,
}

fn default_listen() -> String {
    DEFAULT_LISTEN.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_BRIDGE_TIMEOUT_MS
}

fn default_database() -> String {
    DEFAULT_DATABASE.to_string()
}

impl Config {
    /// Reads the RON file named by `HUE_SCENES_CONFIG` (or `config.ron`) if
    /// it exists, otherwise the environment.
    pub fn load() -> Result<Config, Error> {
        let path = std::env::var("HUE_SCENES_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        if Path::new(&path).exists() {
            let config = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path))?;
            return Config::from_ron_str(&config).with_context(|| format!("parsing {}", path));
        }

        Config::from_env()
    }

    pub fn from_ron_str(config: &str) -> Result<Config, Error> {
        let config: Config = ron::from_str(config)?;
        Ok(config)
    }

    pub fn from_env() -> Result<Config, Error> {
        Config::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from a variable lookup. Every required variable that
    /// is missing is named in the error.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Config, Error> {
        let mut missing = Vec::new();
        let mut required = |key: &'static str| {
            lookup(key).filter(|v| !v.is_empty()).unwrap_or_else(|| {
                missing.push(key);
                String::new()
            })
        };

        let address = required("BRIDGE_IP");
        let user = required("BRIDGE_USER");
        let host = required("MYSQL_HOST");
        let db_user = required("MYSQL_USER");
        let password = required("MYSQL_PW");

        if !missing.is_empty() {
            return Err(anyhow!(
                "missing required environment variables: {}",
                missing.join(", ")
            ));
        }

        let timeout_ms = match lookup("BRIDGE_TIMEOUT_MS") {
            Some(ms) => ms
                .parse()
                .with_context(|| format!("BRIDGE_TIMEOUT_MS is not a number: {}", ms))?,
            None => DEFAULT_BRIDGE_TIMEOUT_MS,
        };

        Ok(Config {
            bridge: BridgeConfig {
                address,
                user,
                timeout_ms,
            },
            database: DatabaseConfig {
                host,
                user: db_user,
                password,
                name: lookup("MYSQL_DATABASE").unwrap_or_else(default_database),
            },
            listen: lookup("LISTEN_ADDR").unwrap_or_else(default_listen),
        })
    }
}
