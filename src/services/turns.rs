//! Conversation turn management.
//!
//! Segments the snapshot stream into request/response turns so the
//! instruction generator sees what was asked and what came back, not just
//! the latest screenful.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use crate::domain::models::{ConversationTurn, LimitsConfig, MarkerConfig};

const CONTEXT_SNIPPET_CHARS: usize = 200;
const EMPTY_CONTEXT: &str = "no conversation history yet";

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{cut}...")
    }
}

/// Maintains the bounded turn history and the currently active turn.
#[derive(Debug)]
pub struct TurnManager {
    turns: VecDeque<ConversationTurn>,
    current: Option<ConversationTurn>,
    request_markers: Vec<String>,
    completion_markers: Vec<String>,
    cap: usize,
    trim_to: usize,
}

impl TurnManager {
    pub fn new(limits: &LimitsConfig, markers: &MarkerConfig) -> Self {
        Self {
            turns: VecDeque::new(),
            current: None,
            request_markers: markers.request.iter().map(|m| m.to_lowercase()).collect(),
            completion_markers: markers
                .completion
                .iter()
                .map(|m| m.to_lowercase())
                .collect(),
            cap: limits.turn_history_cap,
            trim_to: limits.turn_history_trim,
        }
    }

    /// Observe one distinct snapshot.
    ///
    /// A request-style snapshot while no busy signal is active closes the
    /// current turn (if any) into history and opens a new one. Any other
    /// snapshot is appended to the active turn's responses; a completion
    /// phrase closes that turn.
    pub fn observe(&mut self, text: &str, timestamp: DateTime<Utc>, busy: bool) {
        let lowered = text.to_lowercase();
        let is_request = self
            .request_markers
            .iter()
            .any(|m| lowered.contains(m.as_str()));
        let is_completion = self
            .completion_markers
            .iter()
            .any(|m| lowered.contains(m.as_str()));

        if is_request && !busy {
            if let Some(previous) = self.current.take() {
                self.archive(previous);
            }
            self.current = Some(ConversationTurn::open(text, timestamp));
            return;
        }

        if let Some(mut turn) = self.current.take() {
            if turn.is_active() {
                turn.record_response(text, timestamp);
                if is_completion {
                    turn.complete(timestamp);
                    self.archive(turn);
                    return;
                }
            }
            self.current = Some(turn);
        }
    }

    fn archive(&mut self, turn: ConversationTurn) {
        self.turns.push_back(turn);
        if self.turns.len() > self.cap {
            while self.turns.len() > self.trim_to {
                self.turns.pop_front();
            }
        }
    }

    /// Render the most recently completed turn plus the active turn for use
    /// as generation context. Never fails on empty history.
    pub fn latest_context(&self) -> String {
        let latest_completed = self.turns.iter().rev().find(|t| !t.is_active());
        let active = self.current.as_ref().filter(|t| t.is_active());

        if latest_completed.is_none() && active.is_none() {
            return EMPTY_CONTEXT.to_string();
        }

        let mut parts = Vec::new();

        if let Some(turn) = latest_completed {
            parts.push("previous turn:".to_string());
            parts.push(format!(
                "request: {}",
                truncate(&turn.user_request, CONTEXT_SNIPPET_CHARS)
            ));
            if let Some(response) = turn.latest_response() {
                parts.push(format!(
                    "response: {}",
                    truncate(&response.content, CONTEXT_SNIPPET_CHARS)
                ));
            }
        }

        if let Some(turn) = active {
            parts.push("current turn:".to_string());
            parts.push(format!(
                "request: {}",
                truncate(&turn.user_request, CONTEXT_SNIPPET_CHARS)
            ));
            if let Some(response) = turn.latest_response() {
                parts.push(format!(
                    "{} responses so far, latest: {}",
                    turn.responses.len(),
                    truncate(&response.content, CONTEXT_SNIPPET_CHARS)
                ));
            }
        }

        parts.join("\n")
    }

    pub fn history_len(&self) -> usize {
        self.turns.len()
    }

    pub fn has_active_turn(&self) -> bool {
        self.current.as_ref().is_some_and(ConversationTurn::is_active)
    }

    /// Drop all turn state.
    pub fn reset(&mut self) {
        self.turns.clear();
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> TurnManager {
        TurnManager::new(&LimitsConfig::default(), &MarkerConfig::default())
    }

    #[test]
    fn test_request_opens_a_turn() {
        let mut m = manager();
        m.observe("please implement a settings page", Utc::now(), false);
        assert!(m.has_active_turn());
        assert_eq!(m.history_len(), 0);
    }

    #[test]
    fn test_request_during_busy_does_not_open_a_turn() {
        let mut m = manager();
        m.observe("please implement a settings page", Utc::now(), true);
        assert!(!m.has_active_turn());
    }

    #[test]
    fn test_responses_append_to_active_turn() {
        let mut m = manager();
        m.observe("please implement a settings page", Utc::now(), false);
        m.observe("working through the layout now", Utc::now(), true);

        let context = m.latest_context();
        assert!(context.contains("current turn:"));
        assert!(context.contains("1 responses so far"));
    }

    #[test]
    fn test_completion_closes_the_turn() {
        let mut m = manager();
        m.observe("please implement a settings page", Utc::now(), false);
        m.observe("the settings page is finished", Utc::now(), false);

        assert!(!m.has_active_turn());
        assert_eq!(m.history_len(), 1);
        let context = m.latest_context();
        assert!(context.contains("previous turn:"));
        assert!(context.contains("settings page is finished"));
    }

    #[test]
    fn test_new_request_archives_previous_turn() {
        let mut m = manager();
        m.observe("please implement a settings page", Utc::now(), false);
        m.observe("please fix the broken navbar instead", Utc::now(), false);

        assert!(m.has_active_turn());
        assert_eq!(m.history_len(), 1);
    }

    #[test]
    fn test_empty_history_renders_placeholder() {
        let m = manager();
        assert_eq!(m.latest_context(), "no conversation history yet");
    }

    #[test]
    fn test_context_truncates_long_requests() {
        let mut m = manager();
        let long_request = format!("please implement {}", "a very long description ".repeat(30));
        m.observe(&long_request, Utc::now(), false);

        let context = m.latest_context();
        assert!(context.contains("..."));
        // Rendered request is bounded.
        let request_line = context
            .lines()
            .find(|l| l.starts_with("request:"))
            .unwrap();
        assert!(request_line.chars().count() < 220);
    }

    #[test]
    fn test_turn_history_is_bounded() {
        let mut m = manager();
        for i in 0..15 {
            m.observe(&format!("please build feature number {i}"), Utc::now(), false);
        }
        assert!(m.history_len() <= 10);
    }
}
