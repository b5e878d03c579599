//! Session transcript parsing
//!
//! Session files are appended to by Claude Code while we read them, so a trailing line
//! may be half-written and older files may mix schemas. Each line is classified on its
//! own and only lines that parse contribute to the summary; nothing short of an I/O
//! failure aborts a file.

use crate::models::{ModelFamily, SessionMessage, SessionSummary};
use crate::timestamp_parser::TimestampParser;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, trace};

/// Read buffer; lines longer than this are still read whole
const READ_BUFFER_SIZE: usize = 64 * 1024;

/// What a single transcript line contributes to its session
#[derive(Debug, Clone, PartialEq)]
pub enum LineKind {
    /// A prompt typed by the user
    Prompt { timestamp: Option<DateTime<Utc>> },
    /// An assistant response from a tracked model family
    Response {
        family: ModelFamily,
        timestamp: Option<DateTime<Utc>>,
    },
    /// Valid JSON that counts toward neither prompts nor responses
    Other { timestamp: Option<DateTime<Utc>> },
    /// Not a JSON object; skipped
    Malformed,
}

impl LineKind {
    pub fn classify(line: &[u8]) -> Self {
        let message: SessionMessage = match serde_json::from_slice(line) {
            Ok(message) => message,
            Err(_) => return LineKind::Malformed,
        };

        let timestamp = if message.timestamp.is_empty() {
            None
        } else {
            TimestampParser::parse(&message.timestamp).ok()
        };

        if message.is_user_prompt() {
            LineKind::Prompt { timestamp }
        } else if let Some(family) = message.response_model() {
            LineKind::Response { family, timestamp }
        } else {
            LineKind::Other { timestamp }
        }
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            LineKind::Prompt { timestamp }
            | LineKind::Response { timestamp, .. }
            | LineKind::Other { timestamp } => *timestamp,
            LineKind::Malformed => None,
        }
    }
}

/// Trait for custom JSONL processing
pub trait JsonlProcessor {
    type Output;

    fn process_line(&mut self, line: LineKind, line_number: usize);
    fn finalize(self) -> Self::Output;
}

/// Folds classified lines into a [`SessionSummary`]
pub struct SessionProcessor {
    summary: SessionSummary,
    malformed_lines: usize,
}

impl SessionProcessor {
    pub fn new(session_id: String, project: String) -> Self {
        Self {
            summary: SessionSummary::new(session_id, project),
            malformed_lines: 0,
        }
    }
}

impl JsonlProcessor for SessionProcessor {
    type Output = SessionSummary;

    fn process_line(&mut self, line: LineKind, line_number: usize) {
        if let Some(ts) = line.timestamp() {
            self.summary.observe_timestamp(ts);
        }

        match line {
            LineKind::Prompt { .. } => self.summary.prompt_count += 1,
            LineKind::Response { family, .. } => self.summary.record_response(family),
            LineKind::Other { .. } => {}
            LineKind::Malformed => {
                trace!(line_number, "Skipping malformed line");
                self.malformed_lines += 1;
            }
        }
    }

    fn finalize(mut self) -> SessionSummary {
        if self.malformed_lines > 0 {
            debug!(
                session_id = %self.summary.session_id,
                malformed_lines = self.malformed_lines,
                "Skipped malformed lines"
            );
        }
        self.summary.finalize();
        self.summary
    }
}

pub struct FileParser;

impl Default for FileParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FileParser {
    pub fn new() -> Self {
        Self
    }

    /// Summarize one session file. Fails only if the file cannot be opened or read.
    pub fn parse_session_file(&self, file_path: &Path) -> Result<SessionSummary> {
        let (session_id, project) = Self::extract_session_info(file_path);
        self.process_jsonl_file(file_path, SessionProcessor::new(session_id, project))
    }

    /// Generic method that accepts any processor
    pub fn process_jsonl_file<P: JsonlProcessor>(
        &self,
        file_path: &Path,
        mut processor: P,
    ) -> Result<P::Output> {
        let file = File::open(file_path)
            .with_context(|| format!("Failed to open session file: {}", file_path.display()))?;
        let mut reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);
        let mut buf = Vec::new();
        let mut line_number = 0;

        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .with_context(|| format!("Failed to read session file: {}", file_path.display()))?;
            if read == 0 {
                break;
            }
            line_number += 1;

            if buf.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            processor.process_line(LineKind::classify(&buf), line_number);
        }

        Ok(processor.finalize())
    }

    /// Session id is the file name; the project is the name of the parent directory.
    pub fn extract_session_info(file_path: &Path) -> (String, String) {
        let name_of = |path: Option<&Path>| {
            path.and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        };

        (name_of(Some(file_path)), name_of(file_path.parent()))
    }
}

/// Convenience wrapper around [`FileParser::parse_session_file`]
pub fn parse_session_file(file_path: &Path) -> Result<SessionSummary> {
    FileParser::new().parse_session_file(file_path)
}
