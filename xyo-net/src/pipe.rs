//! Pipe abstraction - the seam between the driver and any transport
//!
//! A pipe is an opaque bidirectional byte channel carrying framed
//! application datagrams. Production wraps a network stream in
//! [`FramedPipe`]; simulation harnesses provide in-memory implementations.
//! Timeouts and reconnection are the transport's business, not the pipe's.

use crate::error::NetError;
use crate::framing::{MessageSink, MessageStream};
use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::watch;

/// One peer session's byte channel.
#[async_trait]
pub trait Pipe: Send {
    /// The first inbound application message, present on the accepting side
    /// of a connection. Consumed once; `None` on the connecting side.
    fn take_initiation_data(&mut self) -> Option<Vec<u8>>;

    /// Send one datagram. With `await_response` the call suspends until the
    /// peer's reply arrives (`None` means the peer closed the stream);
    /// without it, only until the bytes are handed to the transport.
    async fn send(
        &mut self,
        data: Vec<u8>,
        await_response: bool,
    ) -> Result<Option<Vec<u8>>, NetError>;

    /// A watch that flips to `true` when the peer goes away.
    fn disconnects(&self) -> watch::Receiver<bool>;

    /// Release the channel.
    async fn close(&mut self);
}

/// A watch receiver that never signals a disconnect.
///
/// For transports with no liveness signal of their own; the driver then
/// learns about the peer only through stream EOF.
pub fn no_disconnect_signal() -> watch::Receiver<bool> {
    static SENDER: std::sync::OnceLock<watch::Sender<bool>> = std::sync::OnceLock::new();
    SENDER.get_or_init(|| watch::channel(false).0).subscribe()
}

/// `Pipe` over any split byte stream, using the standard framing.
pub struct FramedPipe<W, R>
where
    W: AsyncWrite + Send + Unpin,
    R: AsyncRead + Send + Unpin,
{
    sink: MessageSink<W>,
    stream: MessageStream<R>,
    initiation: Option<Vec<u8>>,
    disconnected: watch::Receiver<bool>,
}

impl<W, R> FramedPipe<W, R>
where
    W: AsyncWrite + Send + Unpin,
    R: AsyncRead + Send + Unpin,
{
    /// Wrap the connecting side of a stream. No initiation data.
    pub fn connect(write: W, read: R, disconnected: watch::Receiver<bool>) -> Self {
        Self {
            sink: MessageSink::new(write),
            stream: MessageStream::new(read),
            initiation: None,
            disconnected,
        }
    }

    /// Wrap the accepting side of a stream, reading the peer's first
    /// datagram as initiation data.
    pub async fn accept(
        write: W,
        read: R,
        disconnected: watch::Receiver<bool>,
    ) -> Result<Self, NetError> {
        let mut stream = MessageStream::new(read);
        let initiation = match stream.recv().await? {
            Some(data) => data,
            None => return Err(NetError::PeerDisconnected),
        };
        Ok(Self {
            sink: MessageSink::new(write),
            stream,
            initiation: Some(initiation),
            disconnected,
        })
    }
}

#[async_trait]
impl<W, R> Pipe for FramedPipe<W, R>
where
    W: AsyncWrite + Send + Unpin,
    R: AsyncRead + Send + Unpin,
{
    fn take_initiation_data(&mut self) -> Option<Vec<u8>> {
        self.initiation.take()
    }

    async fn send(
        &mut self,
        data: Vec<u8>,
        await_response: bool,
    ) -> Result<Option<Vec<u8>>, NetError> {
        self.sink.send(&data).await?;
        if await_response {
            self.stream.recv().await
        } else {
            Ok(None)
        }
    }

    fn disconnects(&self) -> watch::Receiver<bool> {
        self.disconnected.clone()
    }

    async fn close(&mut self) {
        let _ = self.sink.shutdown().await;
    }
}
