//! Conversation turns: one user-request-to-completion cycle within the
//! observed dialogue.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnStatus {
    /// The request is still being worked on.
    Active,
    /// A completion marker closed the turn.
    Completed,
}

/// One observed response within a turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnResponse {
    pub timestamp: DateTime<Utc>,
    pub content: String,
}

/// One user-request-to-completion cycle.
///
/// Created when a request-style snapshot arrives while no busy signal is
/// active; mutated by appending responses; closed when a completion marker
/// is seen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub id: Uuid,
    pub start_time: DateTime<Utc>,
    pub user_request: String,
    pub responses: Vec<TurnResponse>,
    pub status: TurnStatus,
    pub end_time: Option<DateTime<Utc>>,
}

impl ConversationTurn {
    /// Open a new active turn for the given request text.
    pub fn open(user_request: impl Into<String>, start_time: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            start_time,
            user_request: user_request.into(),
            responses: Vec::new(),
            status: TurnStatus::Active,
            end_time: None,
        }
    }

    /// Append an observed response.
    pub fn record_response(&mut self, content: impl Into<String>, timestamp: DateTime<Utc>) {
        self.responses.push(TurnResponse {
            timestamp,
            content: content.into(),
        });
    }

    /// Close the turn.
    pub fn complete(&mut self, end_time: DateTime<Utc>) {
        self.status = TurnStatus::Completed;
        self.end_time = Some(end_time);
    }

    pub fn is_active(&self) -> bool {
        self.status == TurnStatus::Active
    }

    /// The most recent response, if any.
    pub fn latest_response(&self) -> Option<&TurnResponse> {
        self.responses.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_turn_is_active() {
        let turn = ConversationTurn::open("please add a login page", Utc::now());
        assert!(turn.is_active());
        assert!(turn.responses.is_empty());
        assert!(turn.end_time.is_none());
    }

    #[test]
    fn test_complete_closes_turn() {
        let mut turn = ConversationTurn::open("fix the tests", Utc::now());
        turn.record_response("working on it", Utc::now());
        let end = Utc::now();
        turn.complete(end);

        assert!(!turn.is_active());
        assert_eq!(turn.status, TurnStatus::Completed);
        assert_eq!(turn.end_time, Some(end));
        assert_eq!(turn.latest_response().unwrap().content, "working on it");
    }
}
