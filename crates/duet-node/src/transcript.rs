//! Plain-text chat log on disk.

use std::{
    fs::File,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use duet_core::{Direction, Transcript, TranscriptEntry};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Append-only transcript file.
///
/// The file is truncated when created and starts with a header line. Every
/// entry becomes one line:
///
/// ```text
/// [2024-05-01 12:00:00] sent to Bob: Hi -> [72, 3589]
/// ```
///
/// Write failures are logged and otherwise ignored.
#[derive(Debug)]
pub struct FileTranscript {
    path: PathBuf,
    peer_name: String,
    file: Mutex<File>,
}

impl FileTranscript {
    /// Create (or truncate) the transcript at `path` for `name` chatting
    /// with `peer_name`.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be created or the header
    /// cannot be written.
    pub fn create(path: impl AsRef<Path>, name: &str, peer_name: &str) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = File::create(&path)?;
        writeln!(file, "--- Chat log for {name} ({}) ---", timestamp())?;

        Ok(Self { path, peer_name: peer_name.to_string(), file: Mutex::new(file) })
    }

    /// Location of the transcript file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn format_line(&self, entry: &TranscriptEntry, timestamp: &str) -> String {
        let label = match entry.direction {
            Direction::Sent => format!("sent to {}", self.peer_name),
            Direction::Received => format!("received from {}", self.peer_name),
            Direction::System => "[system]".to_string(),
        };

        match &entry.detail {
            Some(detail) => format!("[{timestamp}] {label}: {} -> {detail}", entry.message),
            None => format!("[{timestamp}] {label}: {}", entry.message),
        }
    }
}

impl Transcript for FileTranscript {
    fn record(&self, entry: TranscriptEntry) {
        let line = self.format_line(&entry, &timestamp());
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(file, "{line}") {
            tracing::warn!(path = %self.path.display(), error = %e, "transcript write failed");
        }
    }
}

fn timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}
