//! XYO Networking
//!
//! The session layer between the protocol engine and any byte transport:
//! - **Pipe**: opaque bidirectional datagram channel, the transport seam
//! - **Framing**: 4-byte self-counting length prefix over any byte stream
//! - **Catalogue**: first-message sub-protocol negotiation header
//! - **InteractionDriver**: runs one side of the zig-zag over a pipe
//! - **BoundWitnessHandler**: session glue from pipe to committed chain state

pub mod catalogue;
pub mod driver;
pub mod error;
pub mod framing;
pub mod handler;
pub mod pipe;

pub use driver::InteractionDriver;
pub use error::{HandlerError, NetError};
pub use framing::{MessageSink, MessageStream, MAX_MESSAGE_SIZE};
pub use handler::{
    BoundWitnessHandler, ChainStatePayloadProvider, HandlerBuilder, PayloadProvider,
    SuccessListener,
};
pub use pipe::{no_disconnect_signal, FramedPipe, Pipe};
