//! TLS client setup for DNS-over-TLS

use std::sync::Arc;

use tokio_rustls::TlsConnector;
use tokio_rustls::rustls::{self, ClientConfig, RootCertStore};
use tracing::debug;

/// TLS-related errors
#[derive(Debug, thiserror::Error)]
pub enum TlsError {
    #[error("TLS configuration error: {0}")]
    ConfigError(#[from] rustls::Error),
}

/// Connector that verifies resolver certificates against the webpki roots.
pub fn client_connector() -> Result<TlsConnector, TlsError> {
    let mut root_store = RootCertStore::empty();
    root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    client_connector_with_roots(root_store)
}

/// Connector that verifies resolver certificates against `root_store`.
pub fn client_connector_with_roots(root_store: RootCertStore) -> Result<TlsConnector, TlsError> {
    let anchors = root_store.len();
    let config =
        ClientConfig::builder_with_provider(Arc::new(rustls::crypto::ring::default_provider()))
            .with_safe_default_protocol_versions()?
            .with_root_certificates(root_store)
            .with_no_client_auth();

    debug!("TLS client configured with {} trust anchors", anchors);
    Ok(TlsConnector::from(Arc::new(config)))
}
