//! Two nodes talking over real HTTP on localhost.

use std::{net::SocketAddr, path::Path, time::Duration};

use duet_core::{RetryPolicy, SessionState};
use duet_node::{Console, Node, NodeConfig, Preset};
use duet_proto::{
    ErrorKind, ErrorReply,
    demo::{DecryptReply, EncryptReply, ServiceInfo},
};
use tokio::{
    io::{AsyncBufReadExt, BufReader, DuplexStream, Lines},
    net::TcpListener,
};

struct Peer {
    node: Node,
    console: Lines<BufReader<DuplexStream>>,
}

impl Peer {
    fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.node.local_addr())
    }

    /// Read console output until `expected` appears.
    async fn expect_line(&mut self, expected: &str) {
        let wait = async {
            while let Some(line) = self.console.next_line().await.unwrap() {
                if line == expected {
                    return;
                }
            }
            panic!("console closed before {expected:?}");
        };
        tokio::time::timeout(Duration::from_secs(5), wait).await.unwrap();
    }
}

fn config(preset: Preset, peer_addr: SocketAddr, dir: &Path) -> NodeConfig {
    let mut config = NodeConfig::preset(preset);
    config.peer_url = format!("http://{peer_addr}");
    config.transcript_path = dir.join(format!("{}_chat.log", config.name.to_lowercase()));
    config.retry = RetryPolicy::new(5, Duration::from_millis(50));
    config.handshake_timeout = Duration::from_secs(5);
    config.request_timeout = Duration::from_secs(2);
    config
}

fn start(config: NodeConfig, listener: TcpListener) -> Peer {
    let (writer, reader) = tokio::io::duplex(64 * 1024);
    let (console, _printer) = Console::spawn(writer);
    let node = Node::with_listener(config, listener, console).unwrap();
    Peer { node, console: BufReader::new(reader).lines() }
}

/// Alice and Bob, both listening, handshake not started.
async fn pair(dir: &Path) -> (Peer, Peer) {
    let alice_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let bob_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let alice_addr = alice_listener.local_addr().unwrap();
    let bob_addr = bob_listener.local_addr().unwrap();

    let alice = start(config(Preset::Alice, bob_addr, dir), alice_listener);
    let bob = start(config(Preset::Bob, alice_addr, dir), bob_listener);
    (alice, bob)
}

async fn get(url: &str) -> (u16, Vec<u8>) {
    let response = reqwest::get(url).await.unwrap();
    let status = response.status().as_u16();
    (status, response.bytes().await.unwrap().to_vec())
}

async fn post(url: &str, body: &'static str) -> (u16, Vec<u8>) {
    let response = reqwest::Client::new()
        .post(url)
        .header("content-type", "application/json")
        .body(body)
        .send()
        .await
        .unwrap();
    let status = response.status().as_u16();
    (status, response.bytes().await.unwrap().to_vec())
}

#[tokio::test]
async fn handshake_and_messages_over_http() {
    let dir = tempfile::tempdir().unwrap();
    let (mut alice, mut bob) = pair(dir.path()).await;

    let (a, b) = tokio::join!(alice.node.establish(), bob.node.establish());
    a.unwrap();
    b.unwrap();
    assert_eq!(alice.node.session().state(), SessionState::HandshakeComplete);
    assert_eq!(bob.node.session().state(), SessionState::HandshakeComplete);

    let ciphertext = alice.node.session().send_message("HELLO").await.unwrap();
    bob.node.session().send_message("Hi Alice").await.unwrap();

    bob.expect_line("[Alice] HELLO").await;
    alice.expect_line("[Bob] Hi Alice").await;

    let bob_log = std::fs::read_to_string(dir.path().join("bob_chat.log")).unwrap();
    assert!(bob_log.starts_with("--- Chat log for Bob ("));
    let received = format!("received from Alice: HELLO -> {:?}", ciphertext.as_slice());
    assert!(bob_log.contains(&received));
    assert!(bob_log.contains("sent to Alice: Hi Alice -> "));
    assert!(bob_log.contains("[system]: Communication established with Alice."));
}

#[tokio::test]
async fn message_before_key_gets_conflict() {
    let dir = tempfile::tempdir().unwrap();
    let (alice, _bob) = pair(dir.path()).await;

    let (status, body) = post(&alice.url("/msg"), "[1270, 755]").await;

    assert_eq!(status, 409);
    let reply: ErrorReply = serde_json::from_slice(&body).unwrap();
    assert_eq!(reply.kind, ErrorKind::ProtocolOrderingViolation);
    assert_eq!(alice.node.session().peer_key(), None);
}

#[tokio::test]
async fn malformed_key_gets_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let (alice, _bob) = pair(dir.path()).await;

    let (status, body) = post(&alice.url("/key"), r#"{"e": 3}"#).await;

    assert_eq!(status, 400);
    let reply: ErrorReply = serde_json::from_slice(&body).unwrap();
    assert_eq!(reply.kind, ErrorKind::DecodeFailure);
    assert_eq!(alice.node.session().peer_key(), None);
}

#[tokio::test]
async fn undecryptable_message_gets_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let (alice, _bob) = pair(dir.path()).await;
    let (status, _) = post(&alice.url("/key"), r#"{"e": 859, "n": 4757}"#).await;
    assert_eq!(status, 200);

    let (status, body) = post(&alice.url("/msg"), "[99999]").await;

    assert_eq!(status, 400);
    let reply: ErrorReply = serde_json::from_slice(&body).unwrap();
    assert_eq!(reply.kind, ErrorKind::DecodeFailure);
}

#[tokio::test]
async fn demonstration_endpoints() {
    let dir = tempfile::tempdir().unwrap();
    let (mut alice, _bob) = pair(dir.path()).await;

    let (status, body) = get(&alice.url("/")).await;
    assert_eq!(status, 200);
    let info: ServiceInfo = serde_json::from_slice(&body).unwrap();
    assert_eq!(info.message, "Alice RSA node running.");
    assert!(info.endpoints.contains(&"/encrypt".to_string()));

    let (status, body) = post(&alice.url("/encrypt"), r#"{"message": "HELLO"}"#).await;
    assert_eq!(status, 200);
    let encrypted: EncryptReply = serde_json::from_slice(&body).unwrap();
    assert_eq!(encrypted.encrypted, vec![1270, 755, 666, 666, 128]);
    assert_eq!((encrypted.public_key.e, encrypted.public_key.n), (19, 3233));

    let (status, body) =
        post(&alice.url("/decrypt"), r#"{"ciphertext": [1270, 755, 666, 666, 128]}"#).await;
    assert_eq!(status, 200);
    let decrypted: DecryptReply = serde_json::from_slice(&body).unwrap();
    assert_eq!(decrypted.decrypted, "HELLO");

    for (path, body) in [
        ("/encrypt", r#"{"message": ""}"#),
        ("/encrypt", "{}"),
        ("/decrypt", r#"{"ciphertext": "HELLO"}"#),
        ("/decrypt", "{}"),
        ("/webhook", "not json"),
    ] {
        let (status, reply) = post(&alice.url(path), body).await;
        assert_eq!(status, 400, "{path} {body}");
        let reply: ErrorReply = serde_json::from_slice(&reply).unwrap();
        assert_eq!(reply.kind, ErrorKind::InvalidRequest);
    }

    let (status, body) = post(&alice.url("/webhook"), r#"{"message": "build passed"}"#).await;
    assert_eq!(status, 200);
    assert_eq!(body, br#"{"status":"received"}"#);
    alice.expect_line("[webhook] build passed").await;

    let alice_log = std::fs::read_to_string(dir.path().join("alice_chat.log")).unwrap();
    assert!(alice_log.contains("[system]: Webhook: build passed"));
}

#[tokio::test]
async fn absent_peer_fails_handshake() {
    let dir = tempfile::tempdir().unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let nobody = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let mut config = config(Preset::Alice, nobody.local_addr().unwrap(), dir.path());
    config.retry = RetryPolicy::new(3, Duration::from_millis(10));
    drop(nobody);

    let mut alice = start(config, listener);

    let err = alice.node.establish().await.unwrap_err();
    assert!(err.to_string().contains("peer unreachable after 3 attempts"), "{err}");
    assert_eq!(alice.node.session().state(), SessionState::Failed);
    alice.expect_line("--- Chat started as Alice ---").await;

    let alice_log = std::fs::read_to_string(dir.path().join("alice_chat.log")).unwrap();
    assert!(alice_log.contains("Could not connect to Bob to send key after 3 attempts."));
}
