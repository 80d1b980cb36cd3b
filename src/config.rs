use std::env;

use crate::errors::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    pub server_url: String,
}

impl ServerConfig {
    pub fn from_env() -> AppResult<Self> {
        Ok(Self {
            database_url: var_or("DATABASE_URL", "sqlite://shareit.db"),
            host: var_or("SERVER_HOST", "0.0.0.0"),
            port: port_var("SERVER_PORT", 9090)?,
        })
    }
}

impl GatewayConfig {
    pub fn from_env() -> AppResult<Self> {
        Ok(Self {
            host: var_or("GATEWAY_HOST", "0.0.0.0"),
            port: port_var("GATEWAY_PORT", 8080)?,
            server_url: var_or("SHAREIT_SERVER_URL", "http://localhost:9090")
                .trim_end_matches('/')
                .to_owned(),
        })
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn port_var(key: &str, default: u16) -> AppResult<u16> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| AppError::Config(format!("{key}={raw}: {e}"))),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(e) => Err(e.into()),
    }
}
