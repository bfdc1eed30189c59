use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Instant;

use tokio::net::UdpSocket;
use tracing::{debug, trace};

use super::{Exchanged, Result, TransportError};
use crate::dns::{DNSPacket, constants::MAX_UDP_RESPONSE};

/// Send one datagram and wait for the matching response. Datagrams with a
/// different ID are skipped; the caller bounds the wait.
pub async fn exchange(server: SocketAddr, query: &[u8], id: u16) -> Result<Exchanged> {
    let bind_addr: SocketAddr = if server.is_ipv4() {
        (Ipv4Addr::UNSPECIFIED, 0).into()
    } else {
        (Ipv6Addr::UNSPECIFIED, 0).into()
    };
    let socket = UdpSocket::bind(bind_addr).await?;
    socket.connect(server).await?;

    let start = Instant::now();
    socket.send(query).await?;

    let mut buf = vec![0u8; MAX_UDP_RESPONSE];
    loop {
        let len = socket.recv(&mut buf).await?;
        trace!(
            "Raw UDP response data ({} bytes): {:02x?}",
            len,
            &buf[..len.min(64)]
        );
        let response = DNSPacket::parse(&buf[..len]).map_err(|e| {
            debug!("Failed to parse UDP response from {}: {}", server, e);
            TransportError::ConnectionFailed(format!("malformed response: {}", e))
        })?;
        if response.header.id != id {
            debug!(
                "Ignoring UDP response with id {} (expected {}) from {}",
                response.header.id, id, server
            );
            continue;
        }
        return Ok(Exchanged {
            response,
            rtt: start.elapsed(),
        });
    }
}
