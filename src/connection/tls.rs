//! TLS configuration for the RPC transport.
//!
//! The reference wire client talks TLS by default. Server certificates are
//! verified against a custom CA file, the system roots, or (when no system
//! roots load) the bundled webpki roots.

use crate::{Error, Result};
use rustls::ClientConfig;
use rustls::RootCertStore;
use rustls_pemfile::Item;
use std::fs;
use std::sync::Arc;

/// TLS configuration for the RPC transport.
///
/// # Examples
///
/// ```ignore
/// use dbsql_wire::connection::TlsConfig;
///
/// // System root certificates
/// let tls = TlsConfig::builder().build()?;
///
/// // Custom CA certificate
/// let tls = TlsConfig::builder()
///     .ca_cert_path("/path/to/ca.pem")
///     .build()?;
/// ```
#[derive(Clone)]
pub struct TlsConfig {
    /// Path to CA certificate file (None = system roots)
    ca_cert_path: Option<String>,
    /// Compiled rustls ClientConfig
    client_config: Arc<ClientConfig>,
}

impl TlsConfig {
    /// Create a new TLS configuration builder.
    pub fn builder() -> TlsConfigBuilder {
        TlsConfigBuilder::default()
    }

    /// Get the rustls ClientConfig for this TLS configuration.
    pub fn client_config(&self) -> Arc<ClientConfig> {
        self.client_config.clone()
    }

    /// Custom CA path, if one was configured.
    pub fn ca_cert_path(&self) -> Option<&str> {
        self.ca_cert_path.as_deref()
    }
}

impl std::fmt::Debug for TlsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsConfig")
            .field("ca_cert_path", &self.ca_cert_path)
            .field("client_config", &"<ClientConfig>")
            .finish()
    }
}

/// Builder for TLS configuration.
#[derive(Debug, Default)]
pub struct TlsConfigBuilder {
    ca_cert_path: Option<String>,
    webpki_roots_only: bool,
}

impl TlsConfigBuilder {
    /// Set the path to a custom CA certificate file (PEM format).
    ///
    /// If not set, system root certificates will be used.
    pub fn ca_cert_path(mut self, path: impl Into<String>) -> Self {
        self.ca_cert_path = Some(path.into());
        self
    }

    /// Skip the system store and trust only the bundled webpki roots.
    pub fn webpki_roots_only(mut self, enabled: bool) -> Self {
        self.webpki_roots_only = enabled;
        self
    }

    /// Build the TLS configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the CA certificate file cannot be read or holds no
    /// valid certificate.
    pub fn build(self) -> Result<TlsConfig> {
        let root_store = match &self.ca_cert_path {
            Some(ca_path) => load_custom_ca(ca_path)?,
            None if self.webpki_roots_only => webpki_store(),
            None => {
                let result = rustls_native_certs::load_native_certs();

                let mut store = RootCertStore::empty();
                for cert in result.certs {
                    let _ = store.add_parsable_certificates(std::iter::once(cert));
                }

                if store.is_empty() {
                    tracing::debug!(
                        errors = result.errors.len(),
                        "no system root certificates, using webpki roots"
                    );
                    webpki_store()
                } else {
                    store
                }
            }
        };

        let client_config = Arc::new(
            ClientConfig::builder()
                .with_root_certificates(root_store)
                .with_no_client_auth(),
        );

        Ok(TlsConfig {
            ca_cert_path: self.ca_cert_path,
            client_config,
        })
    }
}

fn webpki_store() -> RootCertStore {
    RootCertStore {
        roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
    }
}

/// Load a custom CA certificate from a PEM file.
fn load_custom_ca(ca_path: &str) -> Result<RootCertStore> {
    let ca_cert_data = fs::read(ca_path).map_err(|e| {
        Error::Config(format!(
            "Failed to read CA certificate file '{}': {}",
            ca_path, e
        ))
    })?;

    let mut reader = std::io::Cursor::new(&ca_cert_data);
    let mut root_store = RootCertStore::empty();
    let mut found_certs = 0;

    loop {
        match rustls_pemfile::read_one(&mut reader) {
            Ok(Some(Item::X509Certificate(cert))) => {
                let _ = root_store.add_parsable_certificates(std::iter::once(cert));
                found_certs += 1;
            }
            Ok(Some(_)) => {}
            Ok(None) => break,
            Err(_) => {
                return Err(Error::Config(format!(
                    "Failed to parse CA certificate from '{}'",
                    ca_path
                )));
            }
        }
    }

    if found_certs == 0 {
        return Err(Error::Config(format!(
            "No valid certificates found in '{}'",
            ca_path
        )));
    }

    Ok(root_store)
}

/// Validate a hostname for TLS SNI (Server Name Indication).
///
/// # Errors
///
/// Returns an error if the hostname is empty, too long, or has characters
/// outside `[A-Za-z0-9.-]`.
pub fn parse_server_name(hostname: &str) -> Result<String> {
    let hostname = hostname.trim_end_matches('.');

    if hostname.is_empty() || hostname.len() > 253 {
        return Err(Error::Config(format!(
            "Invalid hostname for TLS: '{}'",
            hostname
        )));
    }

    if !hostname
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
    {
        return Err(Error::Config(format!(
            "Invalid hostname for TLS: '{}'",
            hostname
        )));
    }

    Ok(hostname.to_string())
}
