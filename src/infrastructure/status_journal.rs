//! Append-only status journal.
//!
//! One line per dispatched intervention:
//!
//! ```text
//! [2025-11-02 14:03:11] focus: monitoring engine | status: in progress | instruction: Fix the failing assertion in...
//! ```
//!
//! The journal is pruned to the most recent entries once it grows past the
//! configured cap. Header lines starting with `#` survive pruning and the
//! start-up cleanup pass that drops lines polluted by capture noise.

use std::fs;
use std::path::PathBuf;

use chrono::Utc;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{JournalConfig, MarkerConfig};

/// One parsed journal line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntry {
    pub timestamp: String,
    pub focus: String,
    pub status: String,
    pub instruction_prefix: String,
}

/// Keyword table mapping instruction/response wording to a feature focus.
const FOCUS_TABLE: &[(&str, &[&str])] = &[
    ("monitoring engine", &["monitor", "detect", "watch", "observe"]),
    ("automation controller", &["automation", "automate", "keystroke", "click"]),
    ("analysis module", &["analyze", "analysis", "review", "inspect"]),
    ("configuration", &["config", "setting", "option"]),
    ("logging", &["log", "journal", "record"]),
    ("testing", &["test", "verify", "validation", "assert"]),
    ("deployment", &["deploy", "release", "publish", "ship"]),
];

/// Keyword tables mapping response wording to a feature status.
const BLOCKED_TERMS: &[&str] = &["error", "failed", "failure", "exception", "traceback", "broken"];
const COMPLETED_TERMS: &[&str] = &["done", "finished", "completed", "success", "passing"];

/// Derive the feature focus from the instruction and observed response.
pub fn extract_focus(instruction: &str, response: &str) -> &'static str {
    let combined = format!("{} {}", instruction.to_lowercase(), response.to_lowercase());
    for (focus, keywords) in FOCUS_TABLE {
        if keywords.iter().any(|k| combined.contains(k)) {
            return focus;
        }
    }
    "general development"
}

/// Derive the feature status from the observed response.
pub fn extract_status(response: &str) -> &'static str {
    let lowered = response.to_lowercase();
    if BLOCKED_TERMS.iter().any(|t| lowered.contains(t)) {
        "blocked"
    } else if COMPLETED_TERMS.iter().any(|t| lowered.contains(t)) {
        "completed"
    } else {
        "in progress"
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    let flattened = text.replace(['\n', '\r'], " ");
    if flattened.chars().count() <= max_chars {
        flattened
    } else {
        let cut: String = flattened.chars().take(max_chars).collect();
        format!("{cut}...")
    }
}

/// Append-only journal with deterministic pruning.
#[derive(Debug, Clone)]
pub struct StatusJournal {
    path: PathBuf,
    max_entries: usize,
    trim_to: usize,
    invalid_markers: Vec<String>,
}

impl StatusJournal {
    pub fn new(config: &JournalConfig, markers: &MarkerConfig) -> Self {
        Self {
            path: PathBuf::from(&config.path),
            max_entries: config.max_entries,
            trim_to: config.trim_to,
            invalid_markers: markers.invalid.iter().map(|m| m.to_lowercase()).collect(),
        }
    }

    fn journal_error(&self, action: &str, err: &std::io::Error) -> DomainError {
        DomainError::Journal(format!("{action} {}: {err}", self.path.display()))
    }

    fn load_or_create(&self) -> DomainResult<String> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(content),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                if let Some(parent) = self.path.parent() {
                    fs::create_dir_all(parent)
                        .map_err(|err| self.journal_error("create directory for", &err))?;
                }
                let header = format!(
                    "# vigil status journal\n# created: {}\n",
                    Utc::now().format("%Y-%m-%d %H:%M:%S")
                );
                fs::write(&self.path, &header)
                    .map_err(|err| self.journal_error("create", &err))?;
                Ok(header)
            }
            Err(err) => Err(self.journal_error("read", &err)),
        }
    }

    /// Drop journal lines polluted by capture noise. Run once at start-up.
    pub fn cleanup(&self) -> DomainResult<()> {
        let content = self.load_or_create()?;
        let cleaned: Vec<&str> = content
            .lines()
            .filter(|line| {
                if line.starts_with('#') || line.trim().is_empty() {
                    return true;
                }
                let lowered = line.to_lowercase();
                !self
                    .invalid_markers
                    .iter()
                    .any(|marker| lowered.contains(marker.as_str()))
            })
            .collect();

        let rebuilt = format!("{}\n", cleaned.join("\n"));
        if rebuilt != content {
            fs::write(&self.path, rebuilt)
                .map_err(|err| self.journal_error("rewrite", &err))?;
        }
        Ok(())
    }

    /// Record one dispatched intervention.
    pub fn record(&self, instruction: &str, response: &str) -> DomainResult<()> {
        let content = self.load_or_create()?;
        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S");
        let entry = format!(
            "[{timestamp}] focus: {} | status: {} | instruction: {}",
            extract_focus(instruction, response),
            extract_status(response),
            truncate(instruction, 50),
        );

        let mut headers: Vec<&str> = Vec::new();
        let mut entries: Vec<&str> = Vec::new();
        for line in content.lines() {
            if line.starts_with('#') {
                headers.push(line);
            } else if !line.trim().is_empty() {
                entries.push(line);
            }
        }
        entries.push(&entry);
        if entries.len() > self.max_entries {
            let keep_from = entries.len() - self.trim_to;
            entries.drain(..keep_from);
        }

        let mut rebuilt = String::new();
        for line in headers.iter().chain(entries.iter()) {
            rebuilt.push_str(line);
            rebuilt.push('\n');
        }
        fs::write(&self.path, rebuilt)
            .map_err(|err| self.journal_error("write", &err))?;
        Ok(())
    }

    /// The most recent `limit` entries, oldest first.
    pub fn recent(&self, limit: usize) -> DomainResult<Vec<JournalEntry>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(self.journal_error("read", &err)),
        };

        let entries: Vec<JournalEntry> = content.lines().filter_map(parse_line).collect();
        let skip = entries.len().saturating_sub(limit);
        Ok(entries.into_iter().skip(skip).collect())
    }
}

fn parse_line(line: &str) -> Option<JournalEntry> {
    if line.starts_with('#') || line.trim().is_empty() {
        return None;
    }
    let (timestamp, rest) = line.strip_prefix('[')?.split_once("] ")?;
    let mut fields = rest.split(" | ");
    let focus = fields.next()?.strip_prefix("focus: ")?;
    let status = fields.next()?.strip_prefix("status: ")?;
    let instruction = fields.next()?.strip_prefix("instruction: ")?;
    Some(JournalEntry {
        timestamp: timestamp.to_string(),
        focus: focus.to_string(),
        status: status.to_string(),
        instruction_prefix: instruction.to_string(),
    })
}
