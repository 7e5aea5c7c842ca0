use std::{
    env,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    str::FromStr,
};

use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {name}")]
    InvalidValue { name: &'static str, value: String },
}

/// Where locations are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    #[default]
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
    pub storage: StorageBackend,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            storage: StorageBackend::default(),
        }
    }
}

fn parse<T: FromStr>(
    name: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
    }
}

impl ServerConfig {
    /// Reads `LISTEN_ADDRESS`, `PORT` and `LOCATIONS_STORAGE`. Unset
    /// variables fall back to their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            address: parse("LISTEN_ADDRESS", lookup("LISTEN_ADDRESS"), defaults.address)?,
            port: parse("PORT", lookup("PORT"), defaults.port)?,
            storage: parse(
                "LOCATIONS_STORAGE",
                lookup("LOCATIONS_STORAGE"),
                defaults.storage,
            )?,
        })
    }

    pub fn socket_address(&self) -> SocketAddr {
        SocketAddr::new(self.address, self.port)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn falls_back_to_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.socket_address().to_string(), "0.0.0.0:8080");
    }

    #[test]
    fn reads_all_variables() {
        let config = config(&[
            ("LISTEN_ADDRESS", "127.0.0.1"),
            ("PORT", "3000"),
            ("LOCATIONS_STORAGE", "Memory"),
        ])
        .unwrap();
        assert_eq!(config.socket_address().to_string(), "127.0.0.1:3000");
        assert_eq!(config.storage, StorageBackend::Memory);
    }

    #[test]
    fn rejects_invalid_values() {
        assert_eq!(
            config(&[("PORT", "eighty")]),
            Err(ConfigError::InvalidValue {
                name: "PORT",
                value: "eighty".to_owned()
            })
        );
        assert!(config(&[("LOCATIONS_STORAGE", "sqlite")]).is_err());
    }
}
