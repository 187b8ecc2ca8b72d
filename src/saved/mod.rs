use crate::models::ListKey;
use std::collections::HashMap;

/// Per-item "just saved" badges.
///
/// Purely cosmetic: entries are written after a successful push and read at
/// render time. Nothing here gates persistence. Expired entries are dropped
/// lazily on the next write instead of by a timer.
#[derive(Clone, Debug)]
pub struct SaveStatusTracker {
    window_ms: i64,
    saved_at: HashMap<(ListKey, usize), i64>,
}

impl SaveStatusTracker {
    pub fn new(window_ms: i64) -> Self {
        Self {
            window_ms,
            saved_at: HashMap::new(),
        }
    }

    pub fn mark_saved(&mut self, list: ListKey, index: usize, now_ms: i64) {
        self.prune(now_ms);
        self.saved_at.insert((list, index), now_ms);
    }

    pub fn is_recently_saved(&self, list: ListKey, index: usize, now_ms: i64) -> bool {
        self.saved_at
            .get(&(list, index))
            .is_some_and(|ts| now_ms - ts < self.window_ms)
    }

    pub fn prune(&mut self, now_ms: i64) {
        let window = self.window_ms;
        self.saved_at.retain(|_, ts| now_ms - *ts < window);
    }

    pub fn len(&self) -> usize {
        self.saved_at.len()
    }

    pub fn is_empty(&self) -> bool {
        self.saved_at.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveStatus {
    Saved,
    Failed,
}

impl SaveStatus {
    pub fn label(self) -> &'static str {
        match self {
            SaveStatus::Saved => "Saved",
            SaveStatus::Failed => "Save failed",
        }
    }
}

/// The admin status line. Shows the outcome of the latest push attempt until
/// its timeout passes or the next attempt overwrites it.
#[derive(Clone, Debug, Default)]
pub struct StatusIndicator {
    current: Option<(SaveStatus, i64)>,
}

impl StatusIndicator {
    pub fn record(&mut self, status: SaveStatus, now_ms: i64, visible_ms: i64) {
        self.current = Some((status, now_ms + visible_ms));
    }

    pub fn current(&self, now_ms: i64) -> Option<SaveStatus> {
        self.current
            .filter(|(_, until)| now_ms < *until)
            .map(|(status, _)| status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saved_badge_expires_after_window() {
        let mut t = SaveStatusTracker::new(2_400);
        t.mark_saved(ListKey::Skills, 1, 10_000);
        assert!(t.is_recently_saved(ListKey::Skills, 1, 10_000));
        assert!(t.is_recently_saved(ListKey::Skills, 1, 12_399));
        assert!(!t.is_recently_saved(ListKey::Skills, 1, 12_400));
        assert!(!t.is_recently_saved(ListKey::Skills, 0, 10_000));
        assert!(!t.is_recently_saved(ListKey::Projects, 1, 10_000));
    }

    #[test]
    fn test_expired_entries_are_pruned_on_write() {
        let mut t = SaveStatusTracker::new(2_400);
        t.mark_saved(ListKey::Snaps, 0, 0);
        t.mark_saved(ListKey::Snaps, 1, 1_000);
        assert_eq!(t.len(), 2);
        t.mark_saved(ListKey::Events, 0, 3_000);
        // snaps/0 expired at 2_400, snaps/1 still live until 3_400
        assert_eq!(t.len(), 2);
        t.prune(10_000);
        assert!(t.is_empty());
    }

    #[test]
    fn test_remark_refreshes_timestamp() {
        let mut t = SaveStatusTracker::new(2_400);
        t.mark_saved(ListKey::Skills, 0, 0);
        t.mark_saved(ListKey::Skills, 0, 2_000);
        assert!(t.is_recently_saved(ListKey::Skills, 0, 4_000));
    }

    #[test]
    fn test_indicator_is_overwritten_by_next_attempt() {
        let mut s = StatusIndicator::default();
        assert_eq!(s.current(0), None);
        s.record(SaveStatus::Failed, 0, 4_200);
        assert_eq!(s.current(4_199), Some(SaveStatus::Failed));
        s.record(SaveStatus::Saved, 1_000, 2_400);
        assert_eq!(s.current(1_000), Some(SaveStatus::Saved));
        assert_eq!(s.current(3_400), None);
        assert_eq!(SaveStatus::Failed.label(), "Save failed");
    }
}
