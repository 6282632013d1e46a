//! Test doubles for the session's seams.
//!
//! Shared by unit tests, integration tests and fuzz targets. All doubles are
//! cheap to clone and clones share recorded state.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use duet_proto::{KeyPayload, MessagePayload};

use crate::{
    env::Environment,
    error::TransportError,
    transcript::{Transcript, TranscriptEntry},
    transport::Transport,
};

/// Environment backed by Tokio's clock that records every sleep.
///
/// Pair with `#[tokio::test(start_paused = true)]` so sleeps and timeouts
/// complete instantly.
#[derive(Debug, Clone, Default)]
pub struct MockEnv {
    sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl MockEnv {
    /// Create an environment with no recorded sleeps.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every duration passed to [`Environment::sleep`], in call order.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Environment for MockEnv {
    type Instant = tokio::time::Instant;

    fn now(&self) -> Self::Instant {
        tokio::time::Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap_or_else(PoisonError::into_inner).push(duration);
        tokio::time::sleep(duration).await;
    }
}

#[derive(Debug, Default)]
struct TransportLog {
    key_script: VecDeque<Result<(), TransportError>>,
    key_fallback: Option<TransportError>,
    message_script: VecDeque<Result<(), TransportError>>,
    sent_keys: Vec<KeyPayload>,
    sent_messages: Vec<MessagePayload>,
}

/// Transport with scripted outcomes.
///
/// Every call is recorded, successful or not. Scripted results are consumed
/// first; once exhausted, key sends fall back to the configured failure (or
/// success) and message sends succeed.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    log: Arc<Mutex<TransportLog>>,
}

impl MockTransport {
    /// Transport where every send succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue outcomes for the next key sends.
    pub fn script_key_results(
        &self,
        results: impl IntoIterator<Item = Result<(), TransportError>>,
    ) {
        self.with_log(|log| log.key_script.extend(results));
    }

    /// Fail every unscripted key send with `err`.
    pub fn fail_key_sends_with(&self, err: TransportError) {
        self.with_log(|log| log.key_fallback = Some(err));
    }

    /// Fail the next message send with `err`.
    pub fn fail_next_message(&self, err: TransportError) {
        self.with_log(|log| log.message_script.push_back(Err(err)));
    }

    /// Number of key sends attempted.
    pub fn key_attempts(&self) -> usize {
        self.with_log(|log| log.sent_keys.len())
    }

    /// Every key send attempted.
    pub fn sent_keys(&self) -> Vec<KeyPayload> {
        self.with_log(|log| log.sent_keys.clone())
    }

    /// Every message send attempted.
    pub fn sent_messages(&self) -> Vec<MessagePayload> {
        self.with_log(|log| log.sent_messages.clone())
    }

    fn with_log<R>(&self, f: impl FnOnce(&mut TransportLog) -> R) -> R {
        let mut log = self.log.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut log)
    }
}

impl Transport for MockTransport {
    async fn send_key(&self, key: &KeyPayload) -> Result<(), TransportError> {
        self.with_log(|log| {
            log.sent_keys.push(*key);
            match log.key_script.pop_front() {
                Some(result) => result,
                None => log.key_fallback.clone().map_or(Ok(()), Err),
            }
        })
    }

    async fn send_message(&self, message: &MessagePayload) -> Result<(), TransportError> {
        self.with_log(|log| {
            log.sent_messages.push(message.clone());
            log.message_script.pop_front().unwrap_or(Ok(()))
        })
    }
}

/// Transcript that keeps entries in memory.
#[derive(Debug, Default)]
pub struct MemoryTranscript {
    entries: Mutex<Vec<TranscriptEntry>>,
}

impl MemoryTranscript {
    /// Create an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries recorded so far, in order.
    pub fn entries(&self) -> Vec<TranscriptEntry> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Transcript for MemoryTranscript {
    fn record(&self, entry: TranscriptEntry) {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).push(entry);
    }
}
