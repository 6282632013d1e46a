//! Duet peer node.
//!
//! Runs one end of an encrypted two-party chat over HTTP. The node serves the
//! peer-facing routes from a background task while the foreground task
//! drives the handshake and then the terminal chat.
//!
//! # Architecture
//!
//! This crate is production glue around [`duet_core`]: an axum listener feeds
//! [`Inbound`](duet_core::Inbound), a reqwest [`HttpTransport`] carries
//! outbound payloads, and [`SystemEnv`] supplies real time.
//!
//! # Components
//!
//! - [`Node`]: binds the listener and owns the session
//! - [`NodeConfig`]: resolved settings, with the Alice and Bob presets
//! - [`HttpTransport`]: outbound delivery to the peer
//! - [`FileTranscript`]: timestamped chat log on disk
//! - [`Console`]: serialised terminal output shared by both flows

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod config;
mod console;
mod error;
mod http;
pub mod server;
mod system_env;
mod transcript;

use std::{net::SocketAddr, sync::Arc};

pub use config::{NodeConfig, Preset, default_transcript_path};
pub use console::{ChatExit, Console, chat_loop};
use duet_core::PeerSession;
pub use error::NodeError;
pub use http::{DEFAULT_REQUEST_TIMEOUT, HttpTransport};
pub use system_env::SystemEnv;
use tokio::{io::BufReader, net::TcpListener, task::JoinHandle};
pub use transcript::FileTranscript;

/// Session type used by a running node.
pub type NodeSession = PeerSession<SystemEnv, HttpTransport>;

/// A bound node: listener running, handshake not yet started.
pub struct Node {
    config: NodeConfig,
    session: Arc<NodeSession>,
    transcript: Arc<FileTranscript>,
    console: Console,
    local_addr: SocketAddr,
    listener: JoinHandle<()>,
}

impl Node {
    /// Generate keys, create the transcript and start listening on the
    /// configured address.
    ///
    /// # Errors
    ///
    /// - `Session` if the configured primes are rejected
    /// - `Io` if the transcript cannot be created or the address is in use
    /// - `Config` if the HTTP client cannot be built
    pub async fn bind(config: NodeConfig, console: Console) -> Result<Self, NodeError> {
        let listener = TcpListener::bind(&config.bind_address).await?;
        Self::with_listener(config, listener, console)
    }

    /// Like [`Node::bind`], over an already-bound listener.
    ///
    /// # Errors
    ///
    /// See [`Node::bind`].
    pub fn with_listener(
        config: NodeConfig,
        listener: TcpListener,
        console: Console,
    ) -> Result<Self, NodeError> {
        let transport = HttpTransport::new(&config.peer_url, config.request_timeout)?;
        let session = PeerSession::generate(
            SystemEnv::new(),
            transport,
            config.p,
            config.q,
            config.session_config(),
        )?;

        let transcript = Arc::new(FileTranscript::create(
            &config.transcript_path,
            &config.name,
            &config.peer_name,
        )?);
        let session = Arc::new(session.with_transcript(transcript.clone()));

        let local_addr = listener.local_addr()?;
        let router = server::router(server::AppState {
            inbound: session.inbound(),
            console: console.clone(),
            transcript: transcript.clone(),
            name: config.name.clone(),
        });

        let listener = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!(error = %e, "listener stopped");
            }
        });

        tracing::info!(name = %config.name, %local_addr, "node listening");

        Ok(Self { config, session, transcript, console, local_addr, listener })
    }

    /// Address the listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// The node's session.
    pub fn session(&self) -> &Arc<NodeSession> {
        &self.session
    }

    /// The node's settings.
    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Run the handshake, reporting progress on the console.
    ///
    /// # Errors
    ///
    /// - `Session` if the handshake fails
    pub async fn establish(&self) -> Result<(), NodeError> {
        let peer = &self.config.peer_name;
        self.console.line(format!("--- Chat started as {} ---", self.config.name));
        self.console.line(format!("Transcript: {}", self.transcript.path().display()));
        self.console.line(format!("Using public key: {}", self.session.public_key()));
        self.console.system(format!("Sending public key to {peer}..."));

        match self.session.establish().await {
            Ok(_) => {
                self.console
                    .system(format!("Key from {peer} received. You can start sending messages."));
                Ok(())
            },
            Err(e) => {
                self.console.system(format!("Could not establish communication with {peer}: {e}"));
                Err(e.into())
            },
        }
    }

    /// Handshake, then chat on stdin until the user quits or input closes.
    ///
    /// # Errors
    ///
    /// - `Session` if the handshake fails
    /// - `Io` if stdin cannot be read
    pub async fn run(self) -> Result<ChatExit, NodeError> {
        self.establish().await?;

        let stdin = BufReader::new(tokio::io::stdin());
        let prompt = format!("[{}] ", self.config.name);
        chat_loop(&self.session, stdin, &self.console, &prompt, self.transcript.as_ref()).await
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        self.listener.abort();
    }
}
