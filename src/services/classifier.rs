//! Signal classification.
//!
//! Labels one snapshot as busy / completed / stuck from the configured
//! marker tables and the stability report. Priority is resolved by
//! [`SignalReport::label`]: completed > busy > stuck > normal.

use chrono::Duration;

use crate::domain::models::{CompletionSignal, MarkerConfig, SignalReport, TimingConfig};
use crate::services::stability::StabilityReport;

/// Table-driven classifier. All marker lists are lowercased at construction.
#[derive(Debug, Clone)]
pub struct SignalClassifier {
    busy_markers: Vec<String>,
    active_work_markers: Vec<String>,
    review_markers: Vec<String>,
    completion_markers: Vec<String>,
    question_markers: Vec<String>,
    stuck_threshold: Duration,
    busy_stuck_threshold: Duration,
}

fn lowered(markers: &[String]) -> Vec<String> {
    markers.iter().map(|m| m.to_lowercase()).collect()
}

fn contains_any(text: &str, markers: &[String]) -> bool {
    markers.iter().any(|m| text.contains(m.as_str()))
}

impl SignalClassifier {
    pub fn new(markers: &MarkerConfig, timing: &TimingConfig) -> Self {
        Self {
            busy_markers: lowered(&markers.busy),
            active_work_markers: lowered(&markers.active_work),
            review_markers: lowered(&markers.review),
            completion_markers: lowered(&markers.completion),
            question_markers: lowered(&markers.question),
            stuck_threshold: Duration::seconds(timing.stuck_threshold_secs as i64),
            busy_stuck_threshold: Duration::seconds(timing.busy_stuck_threshold_secs as i64),
        }
    }

    /// Whether the text carries a generation/in-progress marker or an
    /// ellipsis-style progress indicator. Used by the stability tracker
    /// before classification to recognize active generation.
    pub fn has_busy_marker(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        contains_any(&lowered, &self.busy_markers) || text.contains("...") || text.contains('…')
    }

    /// Which completion family matched, highest priority first.
    pub fn completion_signal(&self, text: &str) -> Option<CompletionSignal> {
        let lowered = text.to_lowercase();
        if contains_any(&lowered, &self.review_markers) {
            Some(CompletionSignal::Review)
        } else if contains_any(&lowered, &self.completion_markers) {
            Some(CompletionSignal::Phrase)
        } else if contains_any(&lowered, &self.question_markers) {
            Some(CompletionSignal::Question)
        } else {
            None
        }
    }

    /// Classify one validated snapshot.
    ///
    /// The stuck threshold is conditional on busy: an actively generating
    /// session gets 60s of grace before unchanged content counts as stuck,
    /// everything else gets 30s. Stuck is only possible when the snapshot
    /// did not change this tick.
    pub fn classify(&self, text: &str, stability: &StabilityReport) -> SignalReport {
        let lowered = text.to_lowercase();

        let busy = contains_any(&lowered, &self.busy_markers)
            || text.contains("...")
            || text.contains('…')
            || (stability.grew && contains_any(&lowered, &self.active_work_markers));

        let completed = self.completion_signal(text).is_some();

        let threshold = if busy {
            self.busy_stuck_threshold
        } else {
            self.stuck_threshold
        };
        let stuck = !stability.changed && stability.stable_duration > threshold;

        SignalReport {
            busy,
            completed,
            stuck,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::SignalLabel;

    fn classifier() -> SignalClassifier {
        SignalClassifier::new(&MarkerConfig::default(), &TimingConfig::default())
    }

    fn unchanged_for(secs: i64) -> StabilityReport {
        StabilityReport {
            changed: false,
            stable_duration: Duration::seconds(secs),
            grew: false,
        }
    }

    fn changed() -> StabilityReport {
        StabilityReport {
            changed: true,
            stable_duration: Duration::zero(),
            grew: false,
        }
    }

    #[test]
    fn test_busy_from_marker() {
        let c = classifier();
        let report = c.classify("Generating response", &changed());
        assert!(report.busy);
        assert_eq!(report.label(), SignalLabel::Busy);
    }

    #[test]
    fn test_busy_from_ellipsis() {
        let c = classifier();
        assert!(c.classify("Running the test suite...", &changed()).busy);
        assert!(c.classify("Running the test suite…", &changed()).busy);
    }

    #[test]
    fn test_busy_from_growth_with_active_work_term() {
        let c = classifier();
        let growth = StabilityReport {
            changed: true,
            stable_duration: Duration::zero(),
            grew: true,
        };
        assert!(c.classify("creating the new module layout", &growth).busy);
        assert!(!c.classify("a plain statement with no work term", &growth).busy);
    }

    #[test]
    fn test_completed_review_has_highest_priority() {
        let c = classifier();
        assert_eq!(c.completion_signal("Review Changes"), Some(CompletionSignal::Review));
        // Review wins over a completion phrase in the same text.
        assert_eq!(
            c.completion_signal("done - ready for review"),
            Some(CompletionSignal::Review)
        );
    }

    #[test]
    fn test_completed_preempts_busy() {
        let c = classifier();
        let report = c.classify("Generating... done, review changes", &changed());
        assert!(report.completed);
        assert!(report.busy);
        assert_eq!(report.label(), SignalLabel::Completed);
    }

    #[test]
    fn test_completed_from_question_prompt() {
        let c = classifier();
        let report = c.classify("What would you like me to work on?", &changed());
        assert!(report.completed);
    }

    #[test]
    fn test_stuck_threshold_without_busy() {
        let c = classifier();
        let text = "nothing is happening in this window";
        assert!(!c.classify(text, &unchanged_for(29)).stuck);
        assert!(c.classify(text, &unchanged_for(31)).stuck);
    }

    #[test]
    fn test_stuck_threshold_with_busy_marker() {
        let c = classifier();
        let text = "Generating response for the request";
        assert!(!c.classify(text, &unchanged_for(59)).stuck);
        assert!(c.classify(text, &unchanged_for(61)).stuck);
    }

    #[test]
    fn test_changed_content_is_never_stuck() {
        let c = classifier();
        let report = StabilityReport {
            changed: true,
            stable_duration: Duration::seconds(90),
            grew: false,
        };
        assert!(!c.classify("fresh content just arrived here", &report).stuck);
    }
}
