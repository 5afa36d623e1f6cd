use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::constants::{
    BIND_ALL_HOST, DEFAULT_HOST, DEFAULT_PORT, GRAPHQL_PATH, LOGIN_PATH, SSL_CERT_FILE,
    SSL_KEY_FILE,
};

/// Port as written in `config.yml`, which Stash accepts as a number or a string
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum PortValue {
    Number(u16),
    Text(String),
}

/// Subset of the Stash `config.yml` this tool reads
#[derive(Deserialize, Debug, Default)]
struct RawConfig {
    host: Option<String>,
    port: Option<PortValue>,
    username: Option<String>,
    password: Option<String>,
    api_key: Option<String>,
}

/// Connection settings for a Stash server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StashConfig {
    pub host: String,
    pub port: String,
    pub username: String,
    /// The server has a password configured, so GraphQL needs credentials
    pub password_set: bool,
    pub api_key: String,
    pub ssl: bool,
}

impl StashConfig {
    /// Read and parse a Stash `config.yml`
    pub fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Unable to load Stash config from {}", path.display()))?;
        let ssl = match path.parent() {
            Some(dir) => dir.join(SSL_CERT_FILE).is_file() && dir.join(SSL_KEY_FILE).is_file(),
            None => false,
        };
        Self::parse(&content, ssl)
            .with_context(|| format!("Invalid Stash config at {}", path.display()))
    }

    /// Parse config content; `ssl` tells whether the TLS certificate pair was found
    pub fn parse(content: &str, ssl: bool) -> Result<Self> {
        // An empty file deserializes to `null`
        let raw: Option<RawConfig> = serde_yaml_ng::from_str(content)?;
        let raw = raw.unwrap_or_default();

        let host = match raw.host.as_deref().map(str::trim) {
            None | Some("") | Some(BIND_ALL_HOST) => DEFAULT_HOST.to_string(),
            Some(host) => host.to_string(),
        };
        let port = match raw.port {
            Some(PortValue::Number(port)) => port.to_string(),
            Some(PortValue::Text(port)) if !port.trim().is_empty() => port.trim().to_string(),
            _ => DEFAULT_PORT.to_string(),
        };

        Ok(Self {
            host,
            port,
            username: raw.username.unwrap_or_default(),
            password_set: raw.password.is_some_and(|p| !p.is_empty()),
            api_key: raw.api_key.unwrap_or_default(),
            ssl,
        })
    }

    pub fn stash_url(&self) -> String {
        let s = if self.ssl { "s" } else { "" };
        format!("http{}://{}:{}", s, self.host, self.port)
    }

    pub fn graphql_url(&self) -> String {
        format!("{}{}", self.stash_url(), GRAPHQL_PATH)
    }

    pub fn login_url(&self) -> String {
        format!("{}{}", self.stash_url(), LOGIN_PATH)
    }
}
