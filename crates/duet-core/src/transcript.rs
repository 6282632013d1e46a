//! Audit trail of session events.
//!
//! The session reports what it sent, received and decided; where and how the
//! entries are persisted is up to the application. Recording is
//! fire-and-forget: a transcript that cannot write must not fail the
//! protocol.

/// Which way an event went.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Message sent to the peer
    Sent,
    /// Message received from the peer
    Received,
    /// Protocol or lifecycle event
    System,
}

/// One transcript line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    /// Event direction
    pub direction: Direction,
    /// Logical message (plaintext or event description)
    pub message: String,
    /// Transformed data (ciphertext, key payload, error)
    pub detail: Option<String>,
}

impl TranscriptEntry {
    /// Entry with no detail.
    pub fn new(direction: Direction, message: impl Into<String>) -> Self {
        Self { direction, message: message.into(), detail: None }
    }

    /// System event.
    pub fn system(message: impl Into<String>) -> Self {
        Self::new(Direction::System, message)
    }

    /// Attach transformed data.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Sink for transcript entries.
///
/// Called from both the listener and the foreground flow; implementations
/// serialise writes internally. Ordering between entries recorded
/// concurrently is unspecified.
pub trait Transcript: Send + Sync {
    /// Append an entry.
    fn record(&self, entry: TranscriptEntry);
}

/// Transcript that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTranscript;

impl Transcript for NullTranscript {
    fn record(&self, _entry: TranscriptEntry) {}
}
