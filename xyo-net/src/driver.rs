//! Interaction driver - runs one peer's side of the zig-zag over a pipe
//!
//! The driver owns the pipe for the session's lifetime, frames the first
//! outbound message with a catalogue header, races every suspension point
//! against the pipe's disconnect watch, and closes the pipe when the
//! exchange completes. The side is chosen by the pipe itself: a pipe with
//! initiation data is the accepting (concluding) side.

use crate::catalogue;
use crate::error::NetError;
use crate::pipe::Pipe;
use std::sync::Arc;
use tracing::debug;
use xyo_core::ZigZagAssembler;
use xyo_model::{BoundWitness, Transfer};
use xyo_packer::{schema, Framing, Packer, Value};

/// Drives a bound-witness assembler over one pipe.
pub struct InteractionDriver<P: Pipe> {
    pipe: P,
    packer: Arc<Packer>,
    catalogue: u32,
}

impl<P: Pipe> InteractionDriver<P> {
    pub fn new(pipe: P, packer: Arc<Packer>) -> Self {
        Self {
            pipe,
            packer,
            catalogue: catalogue::BOUND_WITNESS,
        }
    }

    /// Run the three-message exchange to completion.
    ///
    /// Returns the completed block, or the first error; on error the
    /// assembler is terminal and no block is emitted.
    pub async fn run(&mut self, assembler: &mut ZigZagAssembler) -> Result<BoundWitness, NetError> {
        let result = match self.pipe.take_initiation_data() {
            None => self.run_initiator(assembler).await,
            Some(first) => self.run_responder(assembler, first).await,
        };
        self.pipe.close().await;
        result
    }

    async fn run_initiator(
        &mut self,
        assembler: &mut ZigZagAssembler,
    ) -> Result<BoundWitness, NetError> {
        debug!("initiating bound-witness exchange");
        let offer = assembler.incoming_data(None, false)?;
        let first = catalogue::with_header(self.catalogue, &self.encode_transfer(&offer)?);

        let reply = self
            .send_guarded(first, true)
            .await?
            .ok_or(NetError::PeerDisconnected)?;
        let countered = self.decode_transfer(&reply)?;

        let closing = assembler.incoming_data(Some(countered), false)?;
        self.send_guarded(self.encode_transfer(&closing)?, false)
            .await?;

        completed_block(assembler)
    }

    async fn run_responder(
        &mut self,
        assembler: &mut ZigZagAssembler,
        first: Vec<u8>,
    ) -> Result<BoundWitness, NetError> {
        let (items, rest) = catalogue::split_header(&first)?;
        if items & catalogue::BOUND_WITNESS == 0 {
            return Err(NetError::UnexpectedCatalogue(items));
        }
        debug!("answering bound-witness exchange");

        let offer = self.decode_transfer(rest)?;
        let counter = assembler.incoming_data(Some(offer), true)?;

        let reply = self
            .send_guarded(self.encode_transfer(&counter)?, true)
            .await?
            .ok_or(NetError::PeerDisconnected)?;
        let closing = self.decode_transfer(&reply)?;
        assembler.incoming_data(Some(closing), false)?;

        completed_block(assembler)
    }

    /// Send, racing the pipe's disconnect watch.
    async fn send_guarded(
        &mut self,
        data: Vec<u8>,
        await_response: bool,
    ) -> Result<Option<Vec<u8>>, NetError> {
        let mut disconnected = self.pipe.disconnects();
        tokio::select! {
            biased;
            _ = watch_disconnect(&mut disconnected) => Err(NetError::PeerDisconnected),
            result = self.pipe.send(data, await_response) => result,
        }
    }

    fn encode_transfer(&self, transfer: &Transfer) -> Result<Vec<u8>, NetError> {
        Ok(self.packer.serialize(
            &Value::Transfer(transfer.clone()),
            schema::MAJOR_STRUCT,
            schema::MINOR_TRANSFER,
            Framing::Untyped,
        )?)
    }

    fn decode_transfer(&self, bytes: &[u8]) -> Result<Transfer, NetError> {
        match self.packer.deserialize_untyped(
            bytes,
            schema::MAJOR_STRUCT,
            schema::MINOR_TRANSFER,
        )? {
            Value::Transfer(transfer) => Ok(transfer),
            other => Err(NetError::Protocol(format!(
                "expected transfer message, got {}",
                other.kind_name()
            ))),
        }
    }
}

/// Resolve when the watch reports a disconnect; pend forever otherwise.
async fn watch_disconnect(watch: &mut tokio::sync::watch::Receiver<bool>) {
    let disconnected = watch.wait_for(|disconnected| *disconnected).await.is_ok();
    if !disconnected {
        // Sender gone without signalling: no liveness signal exists.
        std::future::pending::<()>().await;
    }
}

fn completed_block(assembler: &mut ZigZagAssembler) -> Result<BoundWitness, NetError> {
    assembler
        .take_bound_witness()
        .ok_or_else(|| NetError::Protocol("exchange finished without a completed block".into()))
}
