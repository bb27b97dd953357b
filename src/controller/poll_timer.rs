use std::time::{Duration, Instant};

/// Interval of the capture poll
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Repeating deadline driven by the host event loop
///
/// The timer never sleeps or spawns anything. The host asks [`PollTimer::fire`]
/// from its own loop and disarming simply drops the deadline.
#[derive(Debug, Clone)]
pub struct PollTimer {
    interval: Duration,
    next_due: Option<Instant>,
}

impl Default for PollTimer {
    fn default() -> Self {
        Self::new(POLL_INTERVAL)
    }
}

impl PollTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    pub fn arm(&mut self, now: Instant) {
        self.next_due = Some(now + self.interval);
    }

    pub fn disarm(&mut self) {
        self.next_due = None;
    }

    /// Returns true once per elapsed interval and schedules the next deadline
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                self.next_due = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }

    /// Time left until the next deadline, `None` while disarmed
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.next_due.map(|due| due.saturating_duration_since(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_only_after_interval() {
        let start = Instant::now();
        let mut timer = PollTimer::default();
        assert!(!timer.fire(start));

        timer.arm(start);
        assert!(!timer.fire(start + Duration::from_millis(49)));
        assert!(timer.fire(start + POLL_INTERVAL));
        assert!(!timer.fire(start + POLL_INTERVAL));
        assert!(timer.fire(start + POLL_INTERVAL * 2));
    }

    #[test]
    fn disarm_stops_firing() {
        let start = Instant::now();
        let mut timer = PollTimer::default();
        timer.arm(start);
        timer.disarm();
        assert_eq!(timer.remaining(start), None);
        assert!(!timer.fire(start + POLL_INTERVAL * 10));
    }

    #[test]
    fn remaining_counts_down() {
        let start = Instant::now();
        let mut timer = PollTimer::default();
        timer.arm(start);
        assert_eq!(
            timer.remaining(start + Duration::from_millis(20)),
            Some(Duration::from_millis(30))
        );
        assert_eq!(
            timer.remaining(start + Duration::from_millis(80)),
            Some(Duration::ZERO)
        );
    }
}
