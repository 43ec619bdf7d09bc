//! Network quiescence tracking for the "mostly idle" load heuristic.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use super::engine::IdleSettings;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkEvent {
    Started(String),
    Finished(String),
    Failed(String),
}

/// Counts in-flight requests and remembers when the count last dropped to the threshold.
///
/// Time is passed in by the caller so the tracker stays deterministic under test.
#[derive(Debug)]
pub struct IdleTracker {
    inflight: HashSet<String>,
    max_inflight: usize,
    quiet_window: Duration,
    quiet_since: Option<Instant>,
}

impl IdleTracker {
    pub fn new(settings: &IdleSettings, now: Instant) -> Self {
        Self {
            inflight: HashSet::new(),
            max_inflight: settings.max_inflight,
            quiet_window: settings.quiet_window,
            quiet_since: Some(now),
        }
    }

    pub fn observe(&mut self, event: NetworkEvent, now: Instant) {
        match event {
            NetworkEvent::Started(id) => {
                self.inflight.insert(id);
            }
            NetworkEvent::Finished(id) | NetworkEvent::Failed(id) => {
                self.inflight.remove(&id);
            }
        }
        self.refresh(now);
    }

    /// Starts a fresh quiet window, e.g. once navigation has committed.
    pub fn restart(&mut self, now: Instant) {
        self.quiet_since = None;
        self.refresh(now);
    }

    pub fn inflight(&self) -> usize {
        self.inflight.len()
    }

    pub fn is_idle(&self, now: Instant) -> bool {
        self.quiet_since
            .map(|since| now.saturating_duration_since(since) >= self.quiet_window)
            .unwrap_or(false)
    }

    fn refresh(&mut self, now: Instant) {
        if self.inflight.len() <= self.max_inflight {
            self.quiet_since.get_or_insert(now);
        } else {
            self.quiet_since = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> IdleSettings {
        IdleSettings {
            max_inflight: 2,
            quiet_window: Duration::from_millis(500),
        }
    }

    fn started(id: &str) -> NetworkEvent {
        NetworkEvent::Started(id.to_string())
    }

    #[test]
    fn idle_after_quiet_window_with_no_traffic() {
        let t0 = Instant::now();
        let tracker = IdleTracker::new(&settings(), t0);
        assert!(!tracker.is_idle(t0 + Duration::from_millis(499)));
        assert!(tracker.is_idle(t0 + Duration::from_millis(500)));
    }

    #[test]
    fn two_inflight_requests_still_count_as_idle() {
        let t0 = Instant::now();
        let mut tracker = IdleTracker::new(&settings(), t0);
        tracker.observe(started("a"), t0);
        tracker.observe(started("b"), t0);
        assert_eq!(tracker.inflight(), 2);
        assert!(tracker.is_idle(t0 + Duration::from_millis(600)));
    }

    #[test]
    fn third_request_resets_the_window() {
        let t0 = Instant::now();
        let mut tracker = IdleTracker::new(&settings(), t0);
        for id in ["a", "b", "c"] {
            tracker.observe(started(id), t0 + Duration::from_millis(400));
        }
        assert!(!tracker.is_idle(t0 + Duration::from_secs(5)));

        let t1 = t0 + Duration::from_secs(1);
        tracker.observe(NetworkEvent::Finished("c".to_string()), t1);
        assert!(!tracker.is_idle(t1 + Duration::from_millis(499)));
        assert!(tracker.is_idle(t1 + Duration::from_millis(500)));
    }

    #[test]
    fn failed_requests_leave_the_inflight_set() {
        let t0 = Instant::now();
        let mut tracker = IdleTracker::new(
            &IdleSettings {
                max_inflight: 0,
                quiet_window: Duration::from_millis(100),
            },
            t0,
        );
        tracker.observe(started("a"), t0);
        assert!(!tracker.is_idle(t0 + Duration::from_secs(1)));
        tracker.observe(NetworkEvent::Failed("a".to_string()), t0 + Duration::from_secs(1));
        assert_eq!(tracker.inflight(), 0);
        assert!(tracker.is_idle(t0 + Duration::from_millis(1100)));
    }

    #[test]
    fn restart_moves_the_window_forward() {
        let t0 = Instant::now();
        let mut tracker = IdleTracker::new(&settings(), t0);
        let t1 = t0 + Duration::from_secs(2);
        tracker.restart(t1);
        assert!(!tracker.is_idle(t1 + Duration::from_millis(100)));
        assert!(tracker.is_idle(t1 + Duration::from_millis(500)));
    }
}
