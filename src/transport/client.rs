use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::TlsConnector;
use tokio_rustls::rustls::pki_types::ServerName;
use tracing::{debug, warn};

use super::{Exchange, Exchanged, Result, TransportError, TransportProtocol, tcp, tls, udp};
use crate::config::ProbeConfig;
use crate::dns::DNSPacket;

/// Invocation-scoped client for one resolver. Every exchange opens a new
/// socket or connection.
#[derive(Clone)]
pub struct ResolverClient {
    server: SocketAddr,
    protocol: TransportProtocol,
    timeout: Duration,
    tls: Option<TlsConnector>,
}

impl ResolverClient {
    pub fn new(
        server: SocketAddr,
        protocol: TransportProtocol,
        timeout: Duration,
    ) -> std::result::Result<Self, tls::TlsError> {
        let tls = match protocol {
            TransportProtocol::Tls => Some(tls::client_connector()?),
            _ => None,
        };
        Ok(Self {
            server,
            protocol,
            timeout,
            tls,
        })
    }

    pub fn from_config(config: &ProbeConfig) -> std::result::Result<Self, tls::TlsError> {
        Self::new(config.resolver_addr(), config.protocol, config.timeout)
    }

    /// DNS-over-TLS client using a caller-built connector, e.g. one trusting
    /// a private root.
    pub fn with_tls_connector(
        server: SocketAddr,
        timeout: Duration,
        connector: TlsConnector,
    ) -> Self {
        Self {
            server,
            protocol: TransportProtocol::Tls,
            timeout,
            tls: Some(connector),
        }
    }

    async fn exchange_wire(&self, wire: &[u8], id: u16) -> Result<Exchanged> {
        match self.protocol {
            TransportProtocol::Udp => udp::exchange(self.server, wire, id).await,
            TransportProtocol::Tcp => tcp::exchange(self.server, wire, id).await,
            TransportProtocol::Tls => {
                let connector = self.tls.as_ref().ok_or_else(|| {
                    TransportError::ConnectionFailed("TLS connector not configured".into())
                })?;
                let stream = TcpStream::connect(self.server).await?;
                stream.set_nodelay(true)?;
                let server_name = ServerName::from(self.server.ip());
                let stream = connector.connect(server_name, stream).await.map_err(|e| {
                    warn!("TLS handshake with {} failed: {}", self.server, e);
                    TransportError::ConnectionFailed(format!("TLS handshake failed: {}", e))
                })?;
                tcp::exchange_framed(stream, wire, id).await
            }
        }
    }
}

#[async_trait]
impl Exchange for ResolverClient {
    async fn exchange(&self, query: &DNSPacket) -> Result<Exchanged> {
        let wire = query
            .serialize()
            .map_err(|e| TransportError::ConnectionFailed(format!("failed to encode query: {}", e)))?;
        let id = query.header.id;

        match timeout(self.timeout, self.exchange_wire(&wire, id)).await {
            Ok(Ok(exchanged)) => {
                debug!(
                    "{} exchange with {} took {:?}: rcode={}, answers={}",
                    self.protocol,
                    self.server,
                    exchanged.rtt,
                    exchanged.response.rcode_name(),
                    exchanged.response.answers.len()
                );
                Ok(exchanged)
            }
            Ok(Err(e)) => {
                debug!("{} exchange with {} failed: {}", self.protocol, self.server, e);
                Err(e)
            }
            Err(_) => {
                debug!(
                    "{} exchange with {} timed out after {:?}",
                    self.protocol, self.server, self.timeout
                );
                Err(TransportError::Timeout)
            }
        }
    }
}
