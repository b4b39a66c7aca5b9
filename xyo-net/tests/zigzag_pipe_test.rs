//! End-to-end bound-witness sessions over in-memory pipes
//!
//! Validates the full handler → driver → assembler path over duplex links,
//! including chain growth across sessions, listener ordering, and
//! disconnect behavior, without any real networking.

use async_trait::async_trait;
use std::sync::Arc;
use xyo_core::{
    ChainVerifier, MemoryChainRepository, OriginChainRepository, Party, ZigZagAssembler,
};
use xyo_model::{BoundWitness, Ed25519Signer, Heuristic, Payload, Signer};
use xyo_net::{
    catalogue, BoundWitnessHandler, ChainStatePayloadProvider, HandlerError, MessageSink,
    MessageStream, NetError, SuccessListener,
};
use xyo_packer::{schema, Framing, Packer, Value};

/// Records every block it is notified about.
#[derive(Default)]
struct RecordingListener {
    blocks: tokio::sync::Mutex<Vec<BoundWitness>>,
}

#[async_trait]
impl SuccessListener for RecordingListener {
    async fn on_bound_witness_success(&self, block: &BoundWitness) {
        self.blocks.lock().await.push(block.clone());
    }
}

struct Peer {
    signer: Arc<dyn Signer>,
    repo: Arc<MemoryChainRepository>,
    listener: Arc<RecordingListener>,
    handler: Arc<BoundWitnessHandler>,
}

fn peer(rssi: i8) -> Peer {
    let signer: Arc<dyn Signer> = Arc::new(Ed25519Signer::generate());
    let repo = Arc::new(MemoryChainRepository::new(vec![signer.clone()]));
    let listener = Arc::new(RecordingListener::default());
    let handler = Arc::new(
        BoundWitnessHandler::builder(repo.clone())
            .with_payload_provider(Arc::new(
                ChainStatePayloadProvider::new().with_signed(Heuristic::Rssi(rssi)),
            ))
            .with_listener(listener.clone())
            .build(),
    );
    Peer {
        signer,
        repo,
        listener,
        handler,
    }
}

/// Run one session between two peers, returning (initiator, responder) blocks.
async fn session(initiator: &Peer, responder: &Peer) -> (BoundWitness, BoundWitness) {
    let (a_socket, b_socket, _link) = xyo_net_sim::link();

    let responder_handler = responder.handler.clone();
    let responder_task = tokio::spawn(async move {
        let pipe = b_socket.accept_pipe().await?;
        responder_handler.handle(pipe).await
    });

    let block_a = initiator
        .handler
        .handle(a_socket.connect_pipe())
        .await
        .expect("initiator session");
    let block_b = responder_task
        .await
        .expect("responder task")
        .expect("responder session");
    (block_a, block_b)
}

#[tokio::test]
async fn test_session_commits_identical_blocks_on_both_peers() {
    let a = peer(-5);
    let b = peer(-10);

    let (block_a, block_b) = session(&a, &b).await;
    assert_eq!(block_a, block_b);
    assert_eq!(block_a.participant_count(), 2);
    assert_eq!(block_a.public_keys[0][0], a.signer.public_key());
    assert_eq!(block_a.public_keys[1][0], b.signer.public_key());
    assert_eq!(block_a.payloads[0].index(), Some(0));

    // Both repositories advanced to index 1 with a recorded hash.
    for p in [&a, &b] {
        assert_eq!(p.repo.get_index().await.unwrap(), 1);
        assert!(p.repo.get_previous_hash().await.unwrap().is_some());
        assert_eq!(p.listener.blocks.lock().await.len(), 1);
    }
}

#[tokio::test]
async fn test_chain_grows_and_verifies_across_sessions() {
    let a = peer(-5);
    let b = peer(-10);
    let c = peer(-15);

    session(&a, &b).await;
    session(&a, &c).await;

    assert_eq!(a.repo.get_index().await.unwrap(), 2);
    let chain = a.listener.blocks.lock().await.clone();
    assert_eq!(chain.len(), 2);
    assert_eq!(chain[1].payloads[0].index(), Some(1));
    assert!(chain[1].payloads[0].previous_hash().is_some());

    let verifier = ChainVerifier::new(Arc::new(Packer::standard()));
    let report = verifier.verify(&chain, &Party::GenesisKey(a.signer.public_key()));
    assert!(report.is_valid, "unexpected fault: {:?}", report.fault);

    // Out of order, the same blocks do not verify.
    let reversed = vec![chain[1].clone(), chain[0].clone()];
    assert!(!verifier
        .verify(&reversed, &Party::GenesisKey(a.signer.public_key()))
        .is_valid);
}

#[tokio::test]
async fn test_disconnect_before_closing_transfer_leaves_repository_untouched() {
    let b = peer(-10);
    let (a_socket, b_socket, link) = xyo_net_sim::link();

    let responder_handler = b.handler.clone();
    let responder_task = tokio::spawn(async move {
        let pipe = b_socket.accept_pipe().await?;
        responder_handler.handle(pipe).await
    });

    // Drive the initiator side by hand up to the second transfer, then
    // drop the transport before the closing signatures are sent.
    let packer = Arc::new(Packer::standard());
    let signer: Arc<dyn Signer> = Arc::new(Ed25519Signer::generate());
    let mut assembler = ZigZagAssembler::new(
        packer.clone(),
        vec![signer],
        Payload::new(vec![Heuristic::Index(0)], vec![]),
    );

    let mut sink = MessageSink::new(a_socket.write);
    let mut stream = MessageStream::new(a_socket.read);

    let offer = assembler.incoming_data(None, false).unwrap();
    let offer_bytes = packer
        .serialize(
            &Value::Transfer(offer),
            schema::MAJOR_STRUCT,
            schema::MINOR_TRANSFER,
            Framing::Untyped,
        )
        .unwrap();
    sink.send(&catalogue::with_header(catalogue::BOUND_WITNESS, &offer_bytes))
        .await
        .unwrap();

    // The responder counters with its keys, payload, and signatures...
    let countered = stream.recv().await.unwrap().expect("counter transfer");
    assert!(!countered.is_empty());

    // ...and then the transport dies.
    link.sever();
    drop(sink);
    drop(stream);

    let result = responder_task.await.expect("responder task");
    assert!(matches!(
        result,
        Err(HandlerError::Net(NetError::PeerDisconnected))
    ));
    assert_eq!(b.repo.get_index().await.unwrap(), 0);
    assert_eq!(b.repo.get_previous_hash().await.unwrap(), None);
    assert!(b.listener.blocks.lock().await.is_empty());
}

#[tokio::test]
async fn test_catalogue_without_bound_witness_bit_aborts() {
    let b = peer(-10);
    let (a_socket, b_socket, _link) = xyo_net_sim::link();

    let responder_handler = b.handler.clone();
    let responder_task = tokio::spawn(async move {
        let pipe = b_socket.accept_pipe().await?;
        responder_handler.handle(pipe).await
    });

    // First message advertises some other sub-protocol.
    let mut sink = MessageSink::new(a_socket.write);
    sink.send(&catalogue::with_header(0x2, b"ignored")).await.unwrap();

    let result = responder_task.await.expect("responder task");
    assert!(matches!(
        result,
        Err(HandlerError::Net(NetError::UnexpectedCatalogue(0x2)))
    ));
    assert_eq!(b.repo.get_index().await.unwrap(), 0);
}

#[tokio::test]
async fn test_next_key_commitment_travels_through_session() {
    let a = peer(-5);
    let b = peer(-10);

    // Queue a rotation on A before the session.
    let incoming: Arc<dyn Signer> = Arc::new(Ed25519Signer::generate());
    a.repo.add_signer(incoming.clone()).await.unwrap();

    let (block, _) = session(&a, &b).await;
    assert_eq!(
        block.payloads[0].next_public_key(),
        Some(&incoming.public_key())
    );

    // The commitment is consumed and the signer promoted by the commit.
    assert_eq!(a.repo.get_next_public_key().await.unwrap(), None);
    let signers = a.repo.get_signers().await.unwrap();
    assert_eq!(signers.len(), 2);
    assert_eq!(signers[1].public_key(), incoming.public_key());
}
