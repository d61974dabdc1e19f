use std::time::{Duration, Instant};

pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(150);

/// A pending regeneration, identified by the request that scheduled it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Debounces output regeneration.
///
/// Every request cancels the one still pending and restarts the quiet period.
/// At most one run is handed out per quiet period, and it is always for the
/// latest request.
#[derive(Debug, Clone)]
pub struct GenerationScheduler {
    quiet_period: Duration,
    pending: Option<(Ticket, Instant)>,
    next_id: u64,
}

impl GenerationScheduler {
    pub fn new(quiet_period: Duration) -> Self {
        GenerationScheduler {
            quiet_period,
            pending: None,
            next_id: 0,
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    /// Schedules a run `quiet_period` after `now`, superseding any pending one.
    pub fn request(&mut self, now: Instant) -> Ticket {
        self.next_id += 1;
        let ticket = Ticket(self.next_id);
        if let Some((old, _)) = self.pending.replace((ticket, now + self.quiet_period)) {
            log::trace!("Generation {:?} superseded by {:?}", old, ticket);
        }
        ticket
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Hands out the pending run once its quiet period has elapsed.
    pub fn take_due(&mut self, now: Instant) -> Option<Ticket> {
        match self.pending {
            Some((ticket, due)) if now >= due => {
                self.pending = None;
                Some(ticket)
            }
            _ => None,
        }
    }

    /// Time left until the pending run is due.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.pending
            .map(|(_, due)| due.saturating_duration_since(now))
    }
}

impl Default for GenerationScheduler {
    fn default() -> Self {
        GenerationScheduler::new(DEFAULT_QUIET_PERIOD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUIET: Duration = Duration::from_millis(150);

    #[test]
    fn nothing_is_due_before_the_quiet_period() {
        let start = Instant::now();
        let mut scheduler = GenerationScheduler::new(QUIET);
        scheduler.request(start);
        assert_eq!(scheduler.take_due(start + Duration::from_millis(149)), None);
        assert!(scheduler.is_pending());
    }

    #[test]
    fn due_run_is_handed_out_once() {
        let start = Instant::now();
        let mut scheduler = GenerationScheduler::new(QUIET);
        let ticket = scheduler.request(start);
        assert_eq!(scheduler.take_due(start + QUIET), Some(ticket));
        assert_eq!(scheduler.take_due(start + QUIET * 2), None);
        assert!(!scheduler.is_pending());
    }

    #[test]
    fn newer_request_supersedes_and_restarts_the_timer() {
        let start = Instant::now();
        let mut scheduler = GenerationScheduler::new(QUIET);
        let first = scheduler.request(start);
        let second = scheduler.request(start + Duration::from_millis(100));
        assert_ne!(first, second);

        // The first deadline passes without anything running.
        assert_eq!(scheduler.take_due(start + Duration::from_millis(200)), None);
        assert_eq!(
            scheduler.take_due(start + Duration::from_millis(250)),
            Some(second)
        );
    }

    #[test]
    fn cancel_drops_the_pending_run() {
        let start = Instant::now();
        let mut scheduler = GenerationScheduler::new(QUIET);
        scheduler.request(start);
        scheduler.cancel();
        assert_eq!(scheduler.take_due(start + QUIET), None);
        assert_eq!(scheduler.time_until_due(start), None);
    }

    #[test]
    fn time_until_due_counts_down() {
        let start = Instant::now();
        let mut scheduler = GenerationScheduler::new(QUIET);
        scheduler.request(start);
        assert_eq!(
            scheduler.time_until_due(start + Duration::from_millis(50)),
            Some(Duration::from_millis(100))
        );
        assert_eq!(
            scheduler.time_until_due(start + Duration::from_secs(1)),
            Some(Duration::ZERO)
        );
    }
}
