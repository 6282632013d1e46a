//! Terminal chat: one writer task for all output, one loop for input.
//!
//! Both the listener (incoming messages, webhook notices) and the foreground
//! flow (status, send failures) print through a [`Console`]. Lines go over a
//! channel to a single writer task, so output from the two flows never
//! interleaves mid-line.

use duet_core::{Environment, PeerSession, Transcript, TranscriptEntry, Transport};
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt},
    sync::mpsc,
    task::JoinHandle,
};

use crate::error::NodeError;

/// Handle for printing whole lines to the terminal.
#[derive(Debug, Clone)]
pub struct Console {
    tx: mpsc::UnboundedSender<String>,
}

impl Console {
    /// Spawn the writer task over `writer`.
    ///
    /// The task ends once every `Console` clone is dropped and returns the
    /// writer.
    pub fn spawn<W>(writer: W) -> (Self, JoinHandle<W>)
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(write_lines(rx, writer));
        (Self { tx }, task)
    }

    /// Queue a line for printing. Dropped silently if the writer is gone.
    pub fn line(&self, text: impl Into<String>) {
        let mut line = text.into();
        line.push('\n');
        let _ = self.tx.send(line);
    }

    /// Queue an input prompt, left unterminated so typing continues after it.
    pub fn prompt(&self, text: impl Into<String>) {
        let _ = self.tx.send(text.into());
    }

    /// Queue a `[system]` line.
    pub fn system(&self, text: impl AsRef<str>) {
        self.line(format!("[system] {}", text.as_ref()));
    }
}

async fn write_lines<W>(mut rx: mpsc::UnboundedReceiver<String>, mut writer: W) -> W
where
    W: AsyncWrite + Unpin,
{
    while let Some(text) = rx.recv().await {
        let written = async {
            writer.write_all(text.as_bytes()).await?;
            writer.flush().await
        };
        if let Err(e) = written.await {
            tracing::warn!(error = %e, "console write failed");
        }
    }
    writer
}

/// Words that end the chat, compared case-insensitively.
const QUIT_WORDS: [&str; 3] = ["quit", "exit", "sair"];

/// How the chat loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatExit {
    /// User typed a quit word
    UserQuit,
    /// Input closed
    EndOfInput,
}

/// Read lines from `input` and send each as a message until the user quits.
///
/// `prompt` is printed before every read. Empty lines are skipped. Send
/// failures are printed and the loop carries on with the next line.
///
/// # Errors
///
/// - `Io` if reading `input` fails
pub async fn chat_loop<E, T, R>(
    session: &PeerSession<E, T>,
    input: R,
    console: &Console,
    prompt: &str,
    transcript: &dyn Transcript,
) -> Result<ChatExit, NodeError>
where
    E: Environment,
    T: Transport,
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();

    loop {
        console.prompt(prompt);
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let text = line.trim_end_matches('\r');
        if text.trim().is_empty() {
            continue;
        }

        if QUIT_WORDS.iter().any(|word| text.trim().eq_ignore_ascii_case(word)) {
            console.system("Closing chat...");
            transcript.record(TranscriptEntry::system("Chat closed by user."));
            return Ok(ChatExit::UserQuit);
        }

        if let Err(e) = session.send_message(text).await {
            console.system(format!("Message not delivered: {e}"));
        }
    }

    Ok(ChatExit::EndOfInput)
}

#[cfg(test)]
mod tests {
    use duet_core::{
        SessionConfig, TransportError,
        test_utils::{MemoryTranscript, MockEnv, MockTransport},
    };
    use duet_proto::MessagePayload;

    use super::*;

    async fn established(transport: MockTransport) -> PeerSession<MockEnv, MockTransport> {
        let config = SessionConfig { peer_name: "Bob".to_string(), ..SessionConfig::default() };
        let session = PeerSession::generate(MockEnv::new(), transport, 61, 53, config).unwrap();
        session.inbound().receive_key(br#"{"e":859,"n":4757}"#).unwrap();
        session.establish().await.unwrap();
        session
    }

    async fn output(console: Console, task: JoinHandle<Vec<u8>>) -> String {
        drop(console);
        String::from_utf8(task.await.unwrap()).unwrap()
    }

    #[tokio::test]
    async fn console_writes_whole_lines_in_order() {
        let (console, task) = Console::spawn(Vec::new());
        console.line("[Bob] Hello");
        console.system("Closing chat...");

        assert_eq!(output(console, task).await, "[Bob] Hello\n[system] Closing chat...\n");
    }

    #[tokio::test(start_paused = true)]
    async fn quit_word_ends_chat_and_is_recorded() {
        let transport = MockTransport::new();
        let session = established(transport.clone()).await;
        let transcript = MemoryTranscript::new();
        let (console, task) = Console::spawn(Vec::new());

        let input: &[u8] = b"Hi\n\n   \nEXIT\nnever sent\n";
        let exit = chat_loop(&session, input, &console, "", &transcript).await.unwrap();

        assert_eq!(exit, ChatExit::UserQuit);
        assert_eq!(transport.sent_messages(), vec![MessagePayload(vec![72, 3589])]);
        assert_eq!(
            transcript.entries().last(),
            Some(&TranscriptEntry::system("Chat closed by user."))
        );
        assert_eq!(output(console, task).await, "[system] Closing chat...\n");
    }

    #[tokio::test(start_paused = true)]
    async fn end_of_input_ends_chat_without_quit_entry() {
        let transport = MockTransport::new();
        let session = established(transport.clone()).await;
        let transcript = MemoryTranscript::new();
        let (console, _task) = Console::spawn(Vec::new());

        let input: &[u8] = b"one\r\ntwo";
        let exit = chat_loop(&session, input, &console, "", &transcript).await.unwrap();

        assert_eq!(exit, ChatExit::EndOfInput);
        assert_eq!(transport.sent_messages().len(), 2);
        assert!(transcript.entries().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn send_failure_is_reported_and_loop_continues() {
        let transport = MockTransport::new();
        let session = established(transport.clone()).await;
        let (console, task) = Console::spawn(Vec::new());
        transport.fail_next_message(TransportError::Connection("reset".into()));

        let input: &[u8] = b"lost\nkept\nquit\n";
        chat_loop(&session, input, &console, "", &MemoryTranscript::new()).await.unwrap();

        assert_eq!(transport.sent_messages().len(), 2);
        let printed = output(console, task).await;
        assert!(printed.starts_with("[system] Message not delivered: message delivery failed"));
        assert!(printed.ends_with("[system] Closing chat...\n"));
    }

    #[tokio::test(start_paused = true)]
    async fn chat_before_handshake_reports_each_line() {
        let transport = MockTransport::new();
        let session = PeerSession::generate(
            MockEnv::new(),
            transport.clone(),
            61,
            53,
            SessionConfig::default(),
        )
        .unwrap();
        let (console, task) = Console::spawn(Vec::new());

        let input: &[u8] = b"a\nb\n";
        chat_loop(&session, input, &console, "", &MemoryTranscript::new()).await.unwrap();

        assert!(transport.sent_messages().is_empty());
        assert_eq!(output(console, task).await.lines().count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn prompt_precedes_each_read_and_sair_quits() {
        let transport = MockTransport::new();
        let session = established(transport.clone()).await;
        let (console, task) = Console::spawn(Vec::new());

        let input: &[u8] = b"Hi\nSair\nnever sent\n";
        let exit = chat_loop(&session, input, &console, "[Alice] ", &MemoryTranscript::new())
            .await
            .unwrap();

        assert_eq!(exit, ChatExit::UserQuit);
        assert_eq!(transport.sent_messages(), vec![MessagePayload(vec![72, 3589])]);
        assert_eq!(output(console, task).await, "[Alice] [Alice] [system] Closing chat...\n");
    }

    #[tokio::test]
    async fn prompt_is_not_line_terminated() {
        let (console, task) = Console::spawn(Vec::new());
        console.prompt("[Bob] ");
        console.line("[Alice] Hello");

        assert_eq!(output(console, task).await, "[Bob] [Alice] Hello\n");
    }
}
