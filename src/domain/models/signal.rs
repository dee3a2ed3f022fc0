//! Signal classification results.

use serde::{Deserialize, Serialize};

/// Raw classification of one snapshot: the three signals are detected
/// independently and resolved into a single label by [`SignalReport::label`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignalReport {
    /// The session is actively generating or working.
    pub busy: bool,
    /// The session finished a step and is waiting on the observer.
    pub completed: bool,
    /// The content has been unchanged past the stuck threshold.
    pub stuck: bool,
}

impl SignalReport {
    /// Resolve the mutually prioritized label: completed > busy > stuck > normal.
    ///
    /// A completed signal always pre-empts a busy reading even when progress
    /// wording is also present in the snapshot.
    pub fn label(&self) -> SignalLabel {
        if self.completed {
            SignalLabel::Completed
        } else if self.busy {
            SignalLabel::Busy
        } else if self.stuck {
            SignalLabel::Stuck
        } else {
            SignalLabel::Normal
        }
    }
}

/// Prioritized classification of the current snapshot's meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalLabel {
    Completed,
    Busy,
    Stuck,
    Normal,
}

impl SignalLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Busy => "busy",
            Self::Stuck => "stuck",
            Self::Normal => "normal",
        }
    }
}

/// Which family of completion wording matched, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionSignal {
    /// A "ready for review" family marker. Highest confidence.
    Review,
    /// An explicit done/finished/success phrase.
    Phrase,
    /// A question-style prompt asking the observer what to do next.
    Question,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_priority_completed_wins() {
        let report = SignalReport {
            busy: true,
            completed: true,
            stuck: true,
        };
        assert_eq!(report.label(), SignalLabel::Completed);
    }

    #[test]
    fn test_label_priority_busy_over_stuck() {
        let report = SignalReport {
            busy: true,
            completed: false,
            stuck: true,
        };
        assert_eq!(report.label(), SignalLabel::Busy);
    }

    #[test]
    fn test_label_normal_when_nothing_set() {
        assert_eq!(SignalReport::default().label(), SignalLabel::Normal);
    }
}
