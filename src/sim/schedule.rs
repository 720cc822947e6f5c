//! Deferred, cancelable timers driven by tick time
//!
//! The clock only moves when the session is ticked, so a paused host or a
//! test harness controls exactly when deferred work fires.

/// Handle to a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone)]
struct Pending<K> {
    handle: TimerHandle,
    purpose: K,
    due_ms: f64,
}

/// At most one pending timer per purpose
#[derive(Debug, Clone)]
pub struct Scheduler<K> {
    now_ms: f64,
    next_handle: u64,
    pending: Vec<Pending<K>>,
}

impl<K> Default for Scheduler<K> {
    fn default() -> Self {
        Self {
            now_ms: 0.0,
            next_handle: 1,
            pending: Vec::new(),
        }
    }
}

impl<K: Copy + PartialEq> Scheduler<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Milliseconds of tick time seen so far
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Schedule `purpose` after `delay_ms`, replacing any pending timer for it
    pub fn schedule(&mut self, purpose: K, delay_ms: f64) -> TimerHandle {
        self.cancel_purpose(purpose);
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        self.pending.push(Pending {
            handle,
            purpose,
            due_ms: self.now_ms + delay_ms.max(0.0),
        });
        handle
    }

    /// Returns true if the timer was still pending
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.handle != handle);
        self.pending.len() != before
    }

    pub fn cancel_purpose(&mut self, purpose: K) {
        self.pending.retain(|p| p.purpose != purpose);
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    pub fn is_pending(&self, purpose: K) -> bool {
        self.pending.iter().any(|p| p.purpose == purpose)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Advance the clock and return every timer that came due, earliest first
    pub fn advance(&mut self, dt_ms: f64) -> Vec<(TimerHandle, K)> {
        self.now_ms += dt_ms.max(0.0);
        let now = self.now_ms;

        let mut due: Vec<Pending<K>> = Vec::new();
        self.pending.retain(|p| {
            if p.due_ms <= now {
                due.push(p.clone());
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms));
        due.into_iter().map(|p| (p.handle, p.purpose)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Purpose {
        Reset,
        Other,
    }

    #[test]
    fn test_fires_after_delay() {
        let mut scheduler = Scheduler::new();
        let handle = scheduler.schedule(Purpose::Reset, 500.0);
        assert!(scheduler.advance(499.0).is_empty());
        assert_eq!(scheduler.advance(1.0), vec![(handle, Purpose::Reset)]);
        assert!(!scheduler.is_pending(Purpose::Reset));
    }

    #[test]
    fn test_reschedule_replaces_pending() {
        let mut scheduler = Scheduler::new();
        let first = scheduler.schedule(Purpose::Reset, 100.0);
        let second = scheduler.schedule(Purpose::Reset, 300.0);
        assert_ne!(first, second);
        assert_eq!(scheduler.pending_count(), 1);
        assert!(scheduler.advance(200.0).is_empty());
        assert_eq!(scheduler.advance(100.0), vec![(second, Purpose::Reset)]);
    }

    #[test]
    fn test_cancel() {
        let mut scheduler = Scheduler::new();
        let handle = scheduler.schedule(Purpose::Reset, 10.0);
        scheduler.schedule(Purpose::Other, 10.0);
        assert!(scheduler.cancel(handle));
        assert!(!scheduler.cancel(handle));
        assert_eq!(scheduler.advance(20.0).len(), 1);

        scheduler.schedule(Purpose::Reset, 10.0);
        scheduler.schedule(Purpose::Other, 10.0);
        scheduler.cancel_all();
        assert!(scheduler.advance(20.0).is_empty());
    }

    #[test]
    fn test_due_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(Purpose::Other, 50.0);
        scheduler.schedule(Purpose::Reset, 10.0);
        let fired: Vec<Purpose> = scheduler.advance(100.0).into_iter().map(|(_, p)| p).collect();
        assert_eq!(fired, vec![Purpose::Reset, Purpose::Other]);
    }
}
