use std::net::SocketAddr;
use std::time::Instant;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, trace};

use super::{Exchanged, Result, TransportError};
use crate::dns::DNSPacket;

/// Plain TCP exchange on a fresh connection
pub async fn exchange(server: SocketAddr, query: &[u8], id: u16) -> Result<Exchanged> {
    let stream = TcpStream::connect(server).await?;
    stream.set_nodelay(true)?;
    exchange_framed(stream, query, id).await
}

/// Two-byte length framed exchange (RFC 1035 §4.2.2), shared with TLS.
/// The RTT covers the write and the response read, not connection setup.
pub async fn exchange_framed<S>(mut stream: S, query: &[u8], id: u16) -> Result<Exchanged>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let query_length = u16::try_from(query.len())
        .map_err(|_| TransportError::ConnectionFailed("query exceeds 65535 bytes".into()))?;

    let start = Instant::now();
    let mut frame = Vec::with_capacity(query.len() + 2);
    frame.extend_from_slice(&query_length.to_be_bytes());
    frame.extend_from_slice(query);
    stream.write_all(&frame).await?;
    stream.flush().await?;

    let mut length_buf = [0u8; 2];
    stream.read_exact(&mut length_buf).await?;
    let response_length = u16::from_be_bytes(length_buf) as usize;

    let mut response_buf = vec![0u8; response_length];
    stream.read_exact(&mut response_buf).await?;
    let rtt = start.elapsed();

    trace!(
        "Raw stream response data ({} bytes): {:02x?}",
        response_length,
        &response_buf[..response_length.min(64)]
    );

    let response = DNSPacket::parse(&response_buf).map_err(|e| {
        debug!("Failed to parse stream response: {}", e);
        TransportError::ConnectionFailed(format!("malformed response: {}", e))
    })?;
    if response.header.id != id {
        return Err(TransportError::ConnectionFailed(format!(
            "response id {} does not match query id {}",
            response.header.id, id
        )));
    }

    Ok(Exchanged { response, rtt })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::{enums::DNSResourceType, name::DomainName};

    #[tokio::test]
    async fn test_framed_exchange_over_duplex() {
        let (client, mut server) = tokio::io::duplex(4096);
        let name = DomainName::parse("example.com").unwrap();
        let query = DNSPacket::query(&name, DNSResourceType::A, 77);
        let wire = query.serialize().unwrap();

        let responder = tokio::spawn(async move {
            let mut len = [0u8; 2];
            server.read_exact(&mut len).await.unwrap();
            let mut buf = vec![0u8; u16::from_be_bytes(len) as usize];
            server.read_exact(&mut buf).await.unwrap();
            let mut response = DNSPacket::parse(&buf).unwrap();
            response.header.qr = true;
            let out = response.serialize().unwrap();
            server.write_all(&(out.len() as u16).to_be_bytes()).await.unwrap();
            server.write_all(&out).await.unwrap();
        });

        let exchanged = exchange_framed(client, &wire, 77).await.unwrap();
        assert!(exchanged.response.header.qr);
        assert_eq!(exchanged.response.questions, query.questions);
        responder.await.unwrap();
    }

    #[tokio::test]
    async fn test_id_mismatch_is_connection_failure() {
        let (client, mut server) = tokio::io::duplex(4096);
        let name = DomainName::parse("example.com").unwrap();
        let wire = DNSPacket::query(&name, DNSResourceType::A, 1).serialize().unwrap();
        let other = DNSPacket::query(&name, DNSResourceType::A, 2).serialize().unwrap();

        tokio::spawn(async move {
            let mut sink = vec![0u8; wire.len() + 2];
            let _ = server.read_exact(&mut sink).await;
            let _ = server.write_all(&(other.len() as u16).to_be_bytes()).await;
            let _ = server.write_all(&other).await;
        });

        let query = DNSPacket::query(&name, DNSResourceType::A, 1).serialize().unwrap();
        assert!(matches!(
            exchange_framed(client, &query, 1).await,
            Err(TransportError::ConnectionFailed(_))
        ));
    }
}
