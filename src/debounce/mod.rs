/// Coalesces a burst of save requests into one delayed flush.
///
/// Explicit state machine instead of a cancellable timer: `schedule` moves to
/// (or stays in) `Pending` with a fresh deadline and the latest context;
/// `take_due` fires once the deadline has passed and returns to `Idle`.
/// Whoever drives the clock (a browser timeout, a test) just calls `take_due`
/// at or after `deadline()`; calling it early is harmless.
#[derive(Clone, Debug, PartialEq)]
pub enum Debouncer<C> {
    Idle,
    Pending { context: C, deadline_ms: i64 },
}

impl<C> Default for Debouncer<C> {
    fn default() -> Self {
        Debouncer::Idle
    }
}

impl<C> Debouncer<C> {
    pub fn new() -> Self {
        Debouncer::Idle
    }

    /// Restarts the quiet interval. Any earlier context in the burst is dropped.
    /// Returns the new deadline.
    pub fn schedule(&mut self, context: C, now_ms: i64, quiet_ms: i64) -> i64 {
        let deadline_ms = now_ms + quiet_ms;
        *self = Debouncer::Pending {
            context,
            deadline_ms,
        };
        deadline_ms
    }

    pub fn deadline(&self) -> Option<i64> {
        match self {
            Debouncer::Idle => None,
            Debouncer::Pending { deadline_ms, .. } => Some(*deadline_ms),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Debouncer::Pending { .. })
    }

    /// Fires if the deadline has elapsed, yielding the captured context.
    pub fn take_due(&mut self, now_ms: i64) -> Option<C> {
        let due = matches!(self, Debouncer::Pending { deadline_ms, .. } if now_ms >= *deadline_ms);
        if !due {
            return None;
        }
        match std::mem::take(self) {
            Debouncer::Pending { context, .. } => Some(context),
            Debouncer::Idle => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_fires_once_with_last_context() {
        let mut d = Debouncer::new();
        for i in 0..5 {
            d.schedule(i, 100 * i as i64, 800);
        }
        // last call at t=400, so nothing before t=1200
        assert_eq!(d.take_due(1_199), None);
        assert_eq!(d.take_due(1_200), Some(4));
        assert_eq!(d.take_due(5_000), None);
        assert!(!d.is_pending());
    }

    #[test]
    fn test_schedule_resets_deadline() {
        let mut d = Debouncer::new();
        assert_eq!(d.schedule("a", 0, 800), 800);
        assert_eq!(d.schedule("b", 700, 800), 1_500);
        assert_eq!(d.deadline(), Some(1_500));
        assert_eq!(d.take_due(800), None);
        assert_eq!(d.take_due(1_500), Some("b"));
    }

    #[test]
    fn test_idle_never_fires() {
        let mut d: Debouncer<()> = Debouncer::default();
        assert_eq!(d.deadline(), None);
        assert_eq!(d.take_due(i64::MAX), None);
    }

    #[test]
    fn test_schedule_after_fire_starts_new_burst() {
        let mut d = Debouncer::new();
        d.schedule(1, 0, 800);
        assert_eq!(d.take_due(800), Some(1));
        d.schedule(2, 900, 800);
        assert_eq!(d.take_due(1_699), None);
        assert_eq!(d.take_due(1_700), Some(2));
    }
}
