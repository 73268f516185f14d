//! Connector configuration

use crate::connection::TlsConfig;
use crate::error::Target;
use crate::protocol::constants::{DEFAULT_PORT, USER_AGENT};
use crate::protocol::ProtocolVersion;
use crate::Result;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Default poll interval for bounded calls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Default client-side ceiling on a single remote call
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15 * 60);

/// Default row-fetch batch hint
pub const DEFAULT_MAX_ROWS: usize = 10_000;

/// Connector configuration
///
/// Immutable once a connector has been built from it; connectors and their
/// connections share it read-only.
#[derive(Clone)]
pub struct Config {
    /// Server hostname
    pub host: String,
    /// Server port (default: 443)
    pub port: u16,
    /// Bearer access token
    pub access_token: Option<String>,
    /// RPC endpoint path
    pub rpc_path: String,
    /// Initial catalog (empty = server default)
    pub catalog: String,
    /// Initial schema (empty = server default)
    pub schema: String,
    /// How often bounded calls re-check cancellation and deadline
    pub poll_interval: Duration,
    /// Client-side ceiling on a single remote call (None = context deadline only)
    pub default_timeout: Option<Duration>,
    /// Parameters replayed as `SET` statements after the session opens, in key order
    pub session_params: BTreeMap<String, String>,
    /// Row-fetch batch hint
    pub max_rows: usize,
    /// Server-side statement timeout hint
    pub query_timeout: Option<Duration>,
    /// Extra user agent entry
    pub user_agent_entry: Option<String>,
    /// Client protocol version sent on open-session
    pub protocol_version: ProtocolVersion,
    /// Whether the session may address multiple catalogs
    pub can_use_multiple_catalogs: bool,
    /// Whether to wrap the transport in TLS (default: true)
    pub use_tls: bool,
    /// TLS settings (None = system roots)
    pub tls: Option<TlsConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: DEFAULT_PORT,
            access_token: None,
            rpc_path: String::new(),
            catalog: String::new(),
            schema: String::new(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            default_timeout: Some(DEFAULT_TIMEOUT),
            session_params: BTreeMap::new(),
            max_rows: DEFAULT_MAX_ROWS,
            query_timeout: None,
            user_agent_entry: None,
            protocol_version: ProtocolVersion::default(),
            can_use_multiple_catalogs: true,
            use_tls: true,
            tls: None,
        }
    }
}

impl Config {
    /// Create a builder starting from defaults
    ///
    /// # Examples
    ///
    /// ```
    /// use dbsql_wire::client::Config;
    /// use std::time::Duration;
    ///
    /// let config = Config::builder()
    ///     .server_hostname("example.cloud.local")
    ///     .rpc_path("/sql/1.0/warehouses/abc")
    ///     .access_token("secret")
    ///     .initial_namespace("main", "default")
    ///     .session_param("timezone", "UTC")
    ///     .default_timeout(Some(Duration::from_secs(30)))
    ///     .build();
    ///
    /// assert_eq!(config.port, 443);
    /// assert_eq!(config.catalog, "main");
    /// ```
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Parse a DSN of the form `token:<token>@<host>[:<port>]<path>?<params>`
    pub fn from_dsn(dsn: &str) -> Result<Self> {
        Ok(super::connection_string::ConnectionInfo::parse(dsn)?.to_config())
    }

    /// Connection target, for error context and logs
    pub fn target(&self) -> Target {
        Target {
            host: self.host.clone(),
            port: self.port,
            path: self.rpc_path.clone(),
        }
    }

    /// User agent string sent with every request
    pub fn user_agent(&self) -> String {
        match &self.user_agent_entry {
            Some(entry) if !entry.is_empty() => format!("{} ({})", USER_AGENT, entry),
            _ => USER_AGENT.to_string(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "<redacted>"),
            )
            .field("rpc_path", &self.rpc_path)
            .field("catalog", &self.catalog)
            .field("schema", &self.schema)
            .field("poll_interval", &self.poll_interval)
            .field("default_timeout", &self.default_timeout)
            .field("session_params", &self.session_params)
            .field("max_rows", &self.max_rows)
            .field("query_timeout", &self.query_timeout)
            .field("user_agent_entry", &self.user_agent_entry)
            .field("protocol_version", &self.protocol_version)
            .field("can_use_multiple_catalogs", &self.can_use_multiple_catalogs)
            .field("use_tls", &self.use_tls)
            .field("tls", &self.tls)
            .finish()
    }
}

/// Builder for [`Config`]
///
/// Each setter applies one option over the defaults, in call order.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the server hostname
    pub fn server_hostname(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the server port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the bearer access token
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.config.access_token = Some(token.into());
        self
    }

    /// Set the RPC endpoint path
    pub fn rpc_path(mut self, path: impl Into<String>) -> Self {
        self.config.rpc_path = path.into();
        self
    }

    /// Set the row-fetch batch hint
    ///
    /// Zero leaves the current value unchanged.
    pub fn max_rows(mut self, n: usize) -> Self {
        if n != 0 {
            self.config.max_rows = n;
        }
        self
    }

    /// Set the server-side statement timeout hint
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.query_timeout = Some(timeout);
        self
    }

    /// Set the initial catalog and schema
    ///
    /// Empty strings leave the choice to the server.
    pub fn initial_namespace(mut self, catalog: impl Into<String>, schema: impl Into<String>) -> Self {
        self.config.catalog = catalog.into();
        self.config.schema = schema.into();
        self
    }

    /// Set the extra user agent entry
    pub fn user_agent_entry(mut self, entry: impl Into<String>) -> Self {
        self.config.user_agent_entry = Some(entry.into());
        self
    }

    /// Replace all session parameters
    ///
    /// Keys and values must not contain a backtick: the `SET` statement
    /// quotes them with backticks and does not escape.
    pub fn session_params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.config.session_params = params
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    /// Add one session parameter
    pub fn session_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.session_params.insert(key.into(), value.into());
        self
    }

    /// Set the poll interval for bounded calls
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    /// Set the client-side ceiling on a single remote call
    pub fn default_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.default_timeout = timeout;
        self
    }

    /// Set the client protocol version
    pub fn protocol_version(mut self, version: ProtocolVersion) -> Self {
        self.config.protocol_version = version;
        self
    }

    /// Allow or forbid addressing multiple catalogs
    pub fn can_use_multiple_catalogs(mut self, enabled: bool) -> Self {
        self.config.can_use_multiple_catalogs = enabled;
        self
    }

    /// Enable or disable TLS on the transport
    pub fn use_tls(mut self, enabled: bool) -> Self {
        self.config.use_tls = enabled;
        self
    }

    /// Use custom TLS settings (implies TLS)
    pub fn tls(mut self, tls: TlsConfig) -> Self {
        self.config.use_tls = true;
        self.config.tls = Some(tls);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Config {
        self.config
    }
}
