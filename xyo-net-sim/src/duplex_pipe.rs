//! In-memory pipe links over `tokio::io::DuplexStream`
//!
//! A link is a pair of sockets whose writes appear as the other socket's
//! reads, plus a control handle that simulates the transport dropping the
//! connection. Build a [`FramedPipe`] from either socket, or drive the raw
//! framing by hand to script partial exchanges.

use std::sync::Arc;
use tokio::io::{DuplexStream, ReadHalf, WriteHalf};
use tokio::sync::watch;
use xyo_net::{FramedPipe, NetError};

const DUPLEX_BUF_SIZE: usize = 64 * 1024;

/// One end of an in-memory link.
pub struct SimSocket {
    pub write: WriteHalf<DuplexStream>,
    pub read: ReadHalf<DuplexStream>,
    pub disconnected: watch::Receiver<bool>,
}

/// Control handle simulating transport-level disconnection.
#[derive(Clone)]
pub struct SimLink {
    severed: Arc<watch::Sender<bool>>,
}

impl SimLink {
    /// Fire both sockets' disconnect watches, as a dropped transport would.
    pub fn sever(&self) {
        let _ = self.severed.send(true);
    }
}

/// Create a connected socket pair and its link control.
pub fn link() -> (SimSocket, SimSocket, SimLink) {
    let (a, b) = tokio::io::duplex(DUPLEX_BUF_SIZE);
    let (a_read, a_write) = tokio::io::split(a);
    let (b_read, b_write) = tokio::io::split(b);
    let (severed_tx, severed_rx) = watch::channel(false);

    let a_socket = SimSocket {
        write: a_write,
        read: a_read,
        disconnected: severed_rx.clone(),
    };
    let b_socket = SimSocket {
        write: b_write,
        read: b_read,
        disconnected: severed_rx,
    };
    let control = SimLink {
        severed: Arc::new(severed_tx),
    };
    (a_socket, b_socket, control)
}

impl SimSocket {
    /// Wrap as the connecting (initiating) side of the link.
    pub fn connect_pipe(self) -> FramedPipe<WriteHalf<DuplexStream>, ReadHalf<DuplexStream>> {
        FramedPipe::connect(self.write, self.read, self.disconnected)
    }

    /// Wrap as the accepting side, waiting for the peer's first datagram.
    pub async fn accept_pipe(
        self,
    ) -> Result<FramedPipe<WriteHalf<DuplexStream>, ReadHalf<DuplexStream>>, NetError> {
        FramedPipe::accept(self.write, self.read, self.disconnected).await
    }
}
