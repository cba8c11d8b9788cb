use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::protocol::error::{BalancerError, Result};
use crate::protocol::{Request, Response};
use crate::transport::codec::JsonCodec;

/// Maximum accepted frame size. Worker replies are small; anything larger
/// indicates a broken or hostile peer.
pub const MAX_MESSAGE_SIZE: usize = 1024 * 1024;

/// Async TCP transport for worker RPC.
///
/// Messages travel as `[4-byte length as u32 big-endian] + [JSON data]`.
/// One connection carries one request/response exchange; the dispatcher
/// opens a fresh connection per call so concurrent requests to the same
/// worker never serialize on a shared stream.
pub struct TcpTransport;

impl TcpTransport {
    /// Connects to a worker endpoint.
    ///
    /// Hostname resolution goes through tokio, which runs getaddrinfo off
    /// the runtime worker threads; a slow resolver never stalls unrelated
    /// tasks. Tokio tries each resolved address until one connects.
    pub async fn connect(addr: &str) -> Result<TcpStream> {
        TcpStream::connect(addr).await.map_err(|e| {
            BalancerError::Connection(format!("Failed to connect to {}: {}", addr, e))
        })
    }

    /// Sends one request and waits for its response.
    pub async fn send_request(stream: &mut TcpStream, request: &Request) -> Result<Response> {
        let encoded = JsonCodec::encode_request(request)?;
        Self::send_message(stream, &encoded).await?;
        let response_data = Self::receive_message(stream).await?;
        JsonCodec::decode_response(&response_data)
    }

    /// Writes a length-prefixed frame. Frames over [`MAX_MESSAGE_SIZE`]
    /// are rejected before anything is written, so an oversized payload
    /// never produces a truncated length prefix.
    pub async fn send_message(stream: &mut TcpStream, data: &[u8]) -> Result<()> {
        if data.len() > MAX_MESSAGE_SIZE {
            return Err(BalancerError::Protocol(format!(
                "Message too large: {} bytes (max {} bytes)",
                data.len(),
                MAX_MESSAGE_SIZE
            )));
        }
        let len = data.len() as u32;
        stream
            .write_all(&len.to_be_bytes())
            .await
            .map_err(|e| Self::map_io_error(e, "writing length prefix"))?;
        stream
            .write_all(data)
            .await
            .map_err(|e| Self::map_io_error(e, "writing data"))?;
        stream
            .flush()
            .await
            .map_err(|e| Self::map_io_error(e, "flushing stream"))?;
        Ok(())
    }

    /// Reads a length-prefixed frame.
    pub async fn receive_message(stream: &mut TcpStream) -> Result<Vec<u8>> {
        let mut len_buf = [0u8; 4];
        stream
            .read_exact(&mut len_buf)
            .await
            .map_err(|e| Self::map_io_error(e, "reading length prefix"))?;

        let len = u32::from_be_bytes(len_buf) as usize;
        if len > MAX_MESSAGE_SIZE {
            return Err(BalancerError::InvalidResponse(format!(
                "Message too large: {} bytes (max {} bytes)",
                len, MAX_MESSAGE_SIZE
            )));
        }

        let mut buf = vec![0u8; len];
        stream
            .read_exact(&mut buf)
            .await
            .map_err(|e| Self::map_io_error(e, "reading data"))?;
        Ok(buf)
    }

    fn map_io_error(err: std::io::Error, context: &str) -> BalancerError {
        match err.kind() {
            std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::ConnectionAborted
            | std::io::ErrorKind::NotConnected
            | std::io::ErrorKind::UnexpectedEof => {
                BalancerError::Connection(format!("{}: connection lost", context))
            }
            _ => BalancerError::Io(err),
        }
    }
}
