//! Duplicate and repetition suppression.
//!
//! The guard is the main reason Vigil does not spam the monitored session:
//! it recognizes content it already acted on, content repeating past the
//! cap, echoes of its own instructions, and cosmetic OCR drift.

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};

use crate::domain::models::{
    ContentFingerprint, InterventionState, LimitsConfig, SuppressReason, TimingConfig,
};

/// Positional character similarity between two strings.
///
/// Count of positionally-equal characters divided by the longer length.
/// A cheap proxy for text similarity, not an edit distance - it misfires on
/// shifted or inserted text, which is acceptable for the near-exact and
/// substantially-same thresholds it feeds.
pub fn positional_similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let equal = a.chars().zip(b.chars()).filter(|(x, y)| x == y).count();
    let max_len = a.chars().count().max(b.chars().count());
    equal as f64 / max_len as f64
}

/// Strip everything but alphanumeric characters (CJK included) and lowercase.
fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect()
}

/// Tracks what has already been acted on and decides suppression.
#[derive(Debug)]
pub struct DuplicateGuard {
    /// Fingerprints already acted upon, oldest first.
    processed: VecDeque<ContentFingerprint>,
    /// Raw-text occurrence counts, insertion order preserved for trimming.
    repetition: VecDeque<(String, u32)>,
    cooldown: Duration,
    max_same_content: u32,
    echo_min_chars: usize,
    near_exact_similarity: f64,
    substantial_similarity: f64,
    containment_min_chars: usize,
    processed_cap: usize,
    repetition_cap: usize,
    repetition_trim: usize,
}

impl DuplicateGuard {
    pub fn new(limits: &LimitsConfig, timing: &TimingConfig) -> Self {
        Self {
            processed: VecDeque::new(),
            repetition: VecDeque::new(),
            cooldown: Duration::seconds(timing.cooldown_secs as i64),
            max_same_content: limits.max_same_content,
            echo_min_chars: limits.echo_min_chars,
            near_exact_similarity: limits.near_exact_similarity,
            substantial_similarity: limits.substantial_similarity,
            containment_min_chars: limits.containment_min_chars,
            processed_cap: limits.processed_cap,
            repetition_cap: limits.repetition_cap,
            repetition_trim: limits.repetition_trim,
        }
    }

    /// Decide whether the current tick must be suppressed. First match wins.
    ///
    /// The repetition counter for `text` is incremented on every call,
    /// whatever the outcome of the earlier checks.
    ///
    /// `last_text` is the dialog text recorded before this tick's snapshot
    /// was folded in; the near-exact check compares against it only once at
    /// least one dispatch has been processed, so fresh content is never
    /// blocked by its own first appearance.
    pub fn should_suppress(
        &mut self,
        text: &str,
        now: DateTime<Utc>,
        state: &InterventionState,
        last_text: Option<&str>,
    ) -> Option<SuppressReason> {
        let count = self.bump_repetition(text);

        if state.in_flight {
            return Some(SuppressReason::DispatchInFlight);
        }

        if let Some(last) = state.last_intervention_time {
            let elapsed = now - last;
            if elapsed < self.cooldown {
                return Some(SuppressReason::CooldownActive {
                    remaining_secs: (self.cooldown - elapsed).num_seconds(),
                });
            }
        }

        let fingerprint = ContentFingerprint::of(text);
        if self.processed.contains(&fingerprint) {
            return Some(SuppressReason::AlreadyProcessed);
        }

        if count > self.max_same_content {
            return Some(SuppressReason::RepetitionCap { count });
        }

        if let Some(instruction) = state.last_sent_instruction.as_deref() {
            if instruction.chars().count() > self.echo_min_chars && text.contains(instruction) {
                return Some(SuppressReason::InstructionEcho);
            }
        }

        if state.last_sent_fingerprint.is_some() {
            if let Some(last) = last_text {
                let similarity = positional_similarity(text, last);
                if similarity > self.near_exact_similarity {
                    return Some(SuppressReason::NearExactMatch { similarity });
                }
            }
        }

        None
    }

    /// Whether `text` is substantially the same as the last recorded dialog
    /// text once cosmetic differences are stripped.
    ///
    /// Accepts exact equality after normalization, high similarity, or a
    /// containment relationship for sufficiently long strings. Routes the
    /// tick to the repeated-content backoff rather than outright suppression.
    pub fn is_substantially_same(&self, text: &str, last_text: Option<&str>) -> bool {
        let Some(last) = last_text else {
            return false;
        };
        if text.is_empty() || last.is_empty() {
            return false;
        }

        let current = normalize(text);
        let previous = normalize(last);

        if current == previous {
            return true;
        }

        if positional_similarity(&current, &previous) > self.substantial_similarity {
            return true;
        }

        let min_len = current.chars().count().min(previous.chars().count());
        min_len > self.containment_min_chars
            && (current.contains(&previous) || previous.contains(&current))
    }

    /// Record that an intervention was dispatched for this content.
    pub fn mark_processed(&mut self, text: &str) {
        let fingerprint = ContentFingerprint::of(text);
        if !self.processed.contains(&fingerprint) {
            self.processed.push_back(fingerprint);
        }
        if self.processed.len() > self.processed_cap {
            // Trim by half, oldest first.
            while self.processed.len() > self.processed_cap / 2 {
                self.processed.pop_front();
            }
        }
    }

    /// Forget all suppression state. Invoked by the escalation valve.
    pub fn clear(&mut self) {
        self.processed.clear();
        self.repetition.clear();
    }

    pub fn processed_len(&self) -> usize {
        self.processed.len()
    }

    fn bump_repetition(&mut self, text: &str) -> u32 {
        if let Some((_, count)) = self.repetition.iter_mut().find(|(t, _)| t == text) {
            *count += 1;
            return *count;
        }
        self.repetition.push_back((text.to_string(), 1));
        if self.repetition.len() > self.repetition_cap {
            // Keep the most recently inserted entries.
            while self.repetition.len() > self.repetition_trim {
                self.repetition.pop_front();
            }
        }
        1
    }
}
