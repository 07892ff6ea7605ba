use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use axum::http::{HeaderValue, Method};
use thiserror::Error;
use tower_http::cors::{AllowHeaders, AllowOrigin, Any, CorsLayer};

pub const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("PORT must be a number between 0 and 65535, got {0:?}")]
    InvalidPort(String),
    #[error("HOST must be an IP address, got {0:?}")]
    InvalidHost(String),
    #[error("ALLOWED_ORIGINS contains an invalid origin {0:?}")]
    InvalidOrigin(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigins {
    Any,
    List(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub allowed_origins: AllowedOrigins,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            allowed_origins: AllowedOrigins::Any,
        }
    }
}

impl Config {
    /// Reads `HOST`, `PORT` and `ALLOWED_ORIGINS` from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| dotenv::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Some(host) = lookup("HOST") {
            config.host = host.parse().map_err(|_| ConfigError::InvalidHost(host))?;
        }
        if let Some(port) = lookup("PORT") {
            config.port = port.parse().map_err(|_| ConfigError::InvalidPort(port))?;
        }
        if let Some(origins) = lookup("ALLOWED_ORIGINS") {
            config.allowed_origins = parse_origins(&origins);
        }

        Ok(config)
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn cors_layer(&self) -> Result<CorsLayer, ConfigError> {
        let origin = match &self.allowed_origins {
            AllowedOrigins::Any => AllowOrigin::from(Any),
            AllowedOrigins::List(origins) => AllowOrigin::list(
                origins
                    .iter()
                    .map(|o| HeaderValue::from_str(o).map_err(|_| ConfigError::InvalidOrigin(o.clone())))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
        };

        Ok(CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers(AllowHeaders::mirror_request()))
    }
}

fn parse_origins(raw: &str) -> AllowedOrigins {
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_owned)
        .collect();

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        AllowedOrigins::Any
    } else {
        AllowedOrigins::List(origins)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.addr().port(), 5000);
    }

    #[test]
    fn reads_port_and_host() {
        let config = config(&[("PORT", "8080"), ("HOST", "127.0.0.1")]).unwrap();
        assert_eq!(config.addr(), "127.0.0.1:8080".parse().unwrap());
    }

    #[test]
    fn rejects_bad_port() {
        assert!(matches!(config(&[("PORT", "lots")]), Err(ConfigError::InvalidPort(p)) if p == "lots"));
        assert!(matches!(config(&[("PORT", "70000")]), Err(ConfigError::InvalidPort(_))));
    }

    #[test]
    fn parses_origins() {
        assert_eq!(config(&[("ALLOWED_ORIGINS", "*")]).unwrap().allowed_origins, AllowedOrigins::Any);
        assert_eq!(config(&[("ALLOWED_ORIGINS", "")]).unwrap().allowed_origins, AllowedOrigins::Any);
        assert_eq!(
            config(&[("ALLOWED_ORIGINS", "http://a.test, http://b.test")]).unwrap().allowed_origins,
            AllowedOrigins::List(vec!["http://a.test".into(), "http://b.test".into()])
        );
    }

    #[test]
    fn cors_layer_rejects_garbage_origin() {
        let config = config(&[("ALLOWED_ORIGINS", "http://ok.test,bad\norigin")]).unwrap();
        assert!(matches!(config.cors_layer(), Err(ConfigError::InvalidOrigin(_))));
    }
}
