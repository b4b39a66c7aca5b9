//! Message framing for application datagrams
//!
//! Every datagram on a byte pipe is a 4-byte big-endian length field
//! followed by the payload; the length counts itself. Works over any
//! AsyncWrite/AsyncRead stream, decoupled from the concrete transport.

use crate::error::NetError;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Maximum size of one framed message (16 MB).
pub const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

/// Framed writer for sending datagrams over any AsyncWrite stream.
pub struct MessageSink<W: AsyncWrite + Send + Unpin> {
    inner: W,
}

impl<W: AsyncWrite + Send + Unpin> MessageSink<W> {
    pub fn new(stream: W) -> Self {
        Self { inner: stream }
    }

    /// Send one datagram (length-prefixed).
    pub async fn send(&mut self, payload: &[u8]) -> Result<(), NetError> {
        let total = payload.len() + 4;
        if total > MAX_MESSAGE_SIZE {
            return Err(NetError::Frame(format!(
                "message of {} bytes exceeds the {} byte limit",
                total, MAX_MESSAGE_SIZE
            )));
        }
        self.inner.write_u32(total as u32).await?;
        self.inner.write_all(payload).await?;
        self.inner.flush().await?;
        Ok(())
    }

    /// Shut down the write half, signalling end of stream to the peer.
    pub async fn shutdown(&mut self) -> Result<(), NetError> {
        self.inner.shutdown().await?;
        Ok(())
    }
}

/// Framed reader for receiving datagrams from any AsyncRead stream.
pub struct MessageStream<R: AsyncRead + Send + Unpin> {
    inner: R,
}

impl<R: AsyncRead + Send + Unpin> MessageStream<R> {
    pub fn new(stream: R) -> Self {
        Self { inner: stream }
    }

    /// Receive the next datagram (or None if the stream closed cleanly).
    pub async fn recv(&mut self) -> Result<Option<Vec<u8>>, NetError> {
        let total = match self.inner.read_u32().await {
            Ok(value) => value as usize,
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(NetError::Io(e)),
        };
        if total < 4 {
            return Err(NetError::Frame(format!(
                "length field {} smaller than its own width",
                total
            )));
        }
        if total > MAX_MESSAGE_SIZE {
            return Err(NetError::Frame(format!(
                "message of {} bytes exceeds the {} byte limit",
                total, MAX_MESSAGE_SIZE
            )));
        }
        let mut payload = vec![0u8; total - 4];
        self.inner.read_exact(&mut payload).await?;
        Ok(Some(payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_roundtrip_over_duplex() {
        let (a, b) = tokio::io::duplex(4096);
        let (_, a_write) = tokio::io::split(a);
        let (b_read, _) = tokio::io::split(b);
        let mut sink = MessageSink::new(a_write);
        let mut stream = MessageStream::new(b_read);

        sink.send(b"first").await.unwrap();
        sink.send(b"").await.unwrap();
        assert_eq!(stream.recv().await.unwrap(), Some(b"first".to_vec()));
        assert_eq!(stream.recv().await.unwrap(), Some(vec![]));
    }

    #[tokio::test]
    async fn test_length_counts_itself() {
        let (a, b) = tokio::io::duplex(64);
        let (_, a_write) = tokio::io::split(a);
        let (mut b_read, _) = tokio::io::split(b);
        let mut sink = MessageSink::new(a_write);

        sink.send(&[0xaa, 0xbb]).await.unwrap();
        let mut raw = [0u8; 6];
        b_read.read_exact(&mut raw).await.unwrap();
        assert_eq!(raw, [0x00, 0x00, 0x00, 0x06, 0xaa, 0xbb]);
    }

    #[tokio::test]
    async fn test_clean_eof_is_none() {
        let (a, b) = tokio::io::duplex(64);
        let (_, a_write) = tokio::io::split(a);
        let (b_read, _) = tokio::io::split(b);
        let mut sink = MessageSink::new(a_write);
        let mut stream = MessageStream::new(b_read);

        sink.shutdown().await.unwrap();
        assert!(stream.recv().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_undersized_length_rejected() {
        let (a, b) = tokio::io::duplex(64);
        let (_, mut a_write) = tokio::io::split(a);
        let (b_read, _) = tokio::io::split(b);
        a_write.write_u32(3).await.unwrap();
        let mut stream = MessageStream::new(b_read);
        assert!(matches!(stream.recv().await, Err(NetError::Frame(_))));
    }
}
