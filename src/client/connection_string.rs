//! DSN parsing
//!
//! Format:
//! * token:<access token>@<host>[:<port>]<rpc path>[?<params>]
//!
//! Recognized params: `catalog`, `schema`, `maxRows`, `timeout` (seconds),
//! `userAgentEntry`. Every other param becomes a session parameter.
//! Values are taken literally (no percent-decoding).

use super::config::Config;
use crate::protocol::constants::DEFAULT_PORT;
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::time::Duration;

/// Parsed DSN
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionInfo {
    /// Server hostname
    pub host: String,
    /// Server port
    pub port: u16,
    /// RPC endpoint path (including the leading `/`, empty if absent)
    pub rpc_path: String,
    /// Access token
    pub access_token: Option<String>,
    /// Initial catalog
    pub catalog: Option<String>,
    /// Initial schema
    pub schema: Option<String>,
    /// Row-fetch batch hint
    pub max_rows: Option<usize>,
    /// Server-side statement timeout in seconds
    pub timeout_secs: Option<u64>,
    /// Extra user agent entry
    pub user_agent_entry: Option<String>,
    /// Everything else
    pub session_params: BTreeMap<String, String>,
}

impl ConnectionInfo {
    /// Parse a DSN
    pub fn parse(s: &str) -> Result<Self> {
        // Query values may contain '@' or '/', so split them off first
        let (rest, query_string) = match s.find('?') {
            Some(pos) => (&s[..pos], &s[pos + 1..]),
            None => (s, ""),
        };

        // Credentials live in the authority only (before the first '/')
        let authority_end = rest.find('/').unwrap_or(rest.len());
        let (auth, rest) = match rest[..authority_end].rfind('@') {
            Some(pos) => (Some(&rest[..pos]), &rest[pos + 1..]),
            None => (None, rest),
        };

        let access_token = match auth {
            Some(auth) => Some(parse_token(auth)?),
            None => None,
        };

        let (host_port, rpc_path) = match rest.find('/') {
            Some(pos) => (&rest[..pos], rest[pos..].to_string()),
            None => (rest, String::new()),
        };

        let (host, port) = match host_port.rfind(':') {
            Some(pos) => {
                let port = host_port[pos + 1..]
                    .parse()
                    .map_err(|_| Error::Config("invalid port".into()))?;
                (&host_port[..pos], port)
            }
            None => (host_port, DEFAULT_PORT),
        };

        if host.is_empty() {
            return Err(Error::Config("DSN is missing a hostname".into()));
        }

        let mut info = Self {
            host: host.to_string(),
            port,
            rpc_path,
            access_token,
            ..Self::default()
        };

        for (key, value) in parse_query_params(query_string)? {
            match key {
                "catalog" => info.catalog = Some(value.to_string()),
                "schema" => info.schema = Some(value.to_string()),
                "maxRows" => {
                    info.max_rows = Some(value.parse().map_err(|_| {
                        Error::Config(format!("invalid maxRows '{}'", value))
                    })?)
                }
                "timeout" => {
                    info.timeout_secs = Some(value.parse().map_err(|_| {
                        Error::Config(format!("invalid timeout '{}'", value))
                    })?)
                }
                "userAgentEntry" => info.user_agent_entry = Some(value.to_string()),
                _ => {
                    info.session_params
                        .insert(key.to_string(), value.to_string());
                }
            }
        }

        Ok(info)
    }

    /// Convert to a [`Config`] over the defaults
    pub fn to_config(&self) -> Config {
        let mut builder = Config::builder()
            .server_hostname(&self.host)
            .port(self.port)
            .rpc_path(&self.rpc_path)
            .initial_namespace(
                self.catalog.clone().unwrap_or_default(),
                self.schema.clone().unwrap_or_default(),
            )
            .session_params(self.session_params.clone());

        if let Some(token) = &self.access_token {
            builder = builder.access_token(token);
        }
        if let Some(n) = self.max_rows {
            builder = builder.max_rows(n);
        }
        if let Some(secs) = self.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if let Some(entry) = &self.user_agent_entry {
            builder = builder.user_agent_entry(entry);
        }

        builder.build()
    }
}

fn parse_token(auth: &str) -> Result<String> {
    match auth.split_once(':') {
        Some(("token", token)) if !token.is_empty() => Ok(token.to_string()),
        Some(("token", _)) => Err(Error::Config("DSN access token is empty".into())),
        _ => Err(Error::Config(
            "unsupported DSN credentials: expected token:<access token>".into(),
        )),
    }
}

/// Split a query string into key/value pairs
fn parse_query_params(query_string: &str) -> Result<Vec<(&str, &str)>> {
    query_string
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) if key.is_empty() => Err(Error::Config(format!(
                "malformed DSN parameter '{}'",
                pair
            ))),
            Some(kv) => Ok(kv),
            None => Err(Error::Config(format!(
                "malformed DSN parameter '{}'",
                pair
            ))),
        })
        .collect()
}
