use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

/// Destination for the narrative lines of a handshake run
///
/// Roles call [`Transcript::say`] while holding the signal's lock, so the
/// order of lines in a transcript is the order in which the shared state was
/// observed.
pub trait Transcript: Send + Sync {
    fn say(&self, line: &str);
}

/// Writes each line to stdout
#[derive(Debug, Default)]
pub struct StdoutTranscript;

impl Transcript for StdoutTranscript {
    fn say(&self, line: &str) {
        let mut out = io::stdout().lock();
        // Nothing useful to do if stdout is gone (e.g. closed pipe).
        let _ = writeln!(out, "{}", line);
        let _ = out.flush();
    }
}

/// Keeps lines in memory, for inspecting a run after the fact
#[derive(Debug, Default)]
pub struct MemoryTranscript {
    lines: Mutex<Vec<String>>,
}

impl MemoryTranscript {
    pub fn new() -> MemoryTranscript {
        MemoryTranscript::default()
    }

    /// Snapshot of the lines recorded so far
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Transcript for MemoryTranscript {
    fn say(&self, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_string());
    }
}
