//! Cooldown and dispatch-lock discipline.
//!
//! Wraps the dispatch critical section: the lock must be taken before any
//! collaborator call and released on every exit path, and a non-forced
//! dispatch may only start once the cooldown since the previous dispatch
//! has elapsed.

use chrono::{DateTime, Duration, Utc};

use crate::domain::models::{InterventionState, TimingConfig};

/// Thin service over [`InterventionState`]'s lock and spacing fields.
#[derive(Debug, Clone)]
pub struct CooldownLock {
    cooldown: Duration,
}

impl CooldownLock {
    pub fn new(timing: &TimingConfig) -> Self {
        Self {
            cooldown: Duration::seconds(timing.cooldown_secs as i64),
        }
    }

    /// Take the dispatch lock. Fails if a dispatch is already in flight -
    /// the caller must treat that as a skip-this-tick condition, never as a
    /// fatal fault.
    pub fn acquire(&self, state: &mut InterventionState) -> bool {
        if state.in_flight {
            return false;
        }
        state.in_flight = true;
        true
    }

    /// Release the dispatch lock. Safe to call on every exit path.
    pub fn release(&self, state: &mut InterventionState) {
        state.in_flight = false;
    }

    /// Whether the spacing since the last successful dispatch has elapsed.
    pub fn cooled_down(&self, state: &InterventionState, now: DateTime<Utc>) -> bool {
        match state.last_intervention_time {
            Some(last) => now - last >= self.cooldown,
            None => true,
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lock() -> CooldownLock {
        CooldownLock::new(&TimingConfig::default())
    }

    #[test]
    fn test_acquire_is_exclusive() {
        let l = lock();
        let mut state = InterventionState::default();

        assert!(l.acquire(&mut state));
        assert!(state.in_flight);
        // Second acquire while held fails.
        assert!(!l.acquire(&mut state));

        l.release(&mut state);
        assert!(!state.in_flight);
        assert!(l.acquire(&mut state));
    }

    #[test]
    fn test_cooldown_without_prior_dispatch() {
        let l = lock();
        let state = InterventionState::default();
        assert!(l.cooled_down(&state, Utc::now()));
    }

    #[test]
    fn test_cooldown_spacing() {
        let l = lock();
        let now = Utc::now();
        let mut state = InterventionState::default();
        state.last_intervention_time = Some(now);

        assert!(!l.cooled_down(&state, now + Duration::seconds(7)));
        assert!(l.cooled_down(&state, now + Duration::seconds(8)));
    }
}
